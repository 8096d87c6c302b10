use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::availability;
use crate::state::AppState;

// GET /api/availability?date=YYYY-MM-DD
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

#[derive(Serialize)]
pub struct SlotResponse {
    time_slot: String,
    start_time: String,
    available: bool,
    booking_count: i64,
    spots_remaining: i64,
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<SlotResponse>>, AppError> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {}", query.date)))?;
    let now = state.config.business_now();

    let result = {
        let db = state.db.lock().unwrap();
        availability::check_availability(&db, date, now)
    };

    // A broken store must not take the booking page down with it; show the
    // open calendar and let the booking write be the gate
    let slots = match result {
        Ok(slots) => slots,
        Err(e) => {
            tracing::warn!(error = %e, date = %query.date, "availability check failed, failing open");
            availability::fail_open(date, now)
        }
    };

    let response = slots
        .into_iter()
        .map(|s| SlotResponse {
            time_slot: s.label,
            start_time: s.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            available: s.available,
            booking_count: s.booking_count,
            spots_remaining: s.spots_remaining,
        })
        .collect();

    Ok(Json(response))
}
