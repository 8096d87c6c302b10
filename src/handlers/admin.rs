use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::bookings::AppointmentResponse;
use crate::models::AppointmentStatus;
use crate::services::{events, notify, slots};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// Status strings round-trip through parse; anything else is a typo, not
/// an implicit "pending".
fn parse_status(s: &str) -> Result<AppointmentStatus, AppError> {
    let status = AppointmentStatus::parse(s);
    if status.as_str() != s {
        return Err(AppError::Validation(format!("unknown status: {s}")));
    }
    Ok(status)
}

fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {s}")))
}

// GET /api/admin/status
#[derive(Serialize)]
pub struct StatusResponse {
    upcoming_count: i64,
    completed_count: i64,
    blocked_count: i64,
    deposits_collected_cents: i64,
    outstanding_balance_cents: i64,
}

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let today = state.config.business_now().date();
    let stats = {
        let db = state.db.lock().unwrap();
        queries::get_dashboard_stats(&db, today)?
    };

    Ok(Json(StatusResponse {
        upcoming_count: stats.upcoming_count,
        completed_count: stats.completed_count,
        blocked_count: stats.blocked_count,
        deposits_collected_cents: stats.deposits_collected_cents,
        outstanding_balance_cents: stats.outstanding_balance_cents,
    }))
}

// GET /api/admin/appointments
#[derive(Deserialize)]
pub struct AppointmentsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn get_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if let Some(status) = query.status.as_deref() {
        parse_status(status)?;
    }
    let limit = query.limit.unwrap_or(50);

    let appointments = {
        let db = state.db.lock().unwrap();
        queries::get_all_appointments(&db, query.status.as_deref(), limit)?
    };

    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

// POST /api/admin/appointments/:id/status
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let next = parse_status(&body.status)?;

    let (appointment, previous) = {
        let db = state.db.lock().unwrap();
        let appt = queries::get_appointment_by_id(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;

        if !appt.status.can_transition_to(next) {
            return Err(AppError::Validation(format!(
                "cannot change status from {} to {}",
                appt.status.as_str(),
                next.as_str()
            )));
        }

        queries::update_appointment_status(&db, &id, next)?;

        let previous = appt.status;
        let mut updated = appt;
        updated.status = next;
        updated.updated_at = chrono::Utc::now().naive_utc();
        (updated, previous)
    };

    tracing::info!(
        appointment_id = %appointment.id,
        from = previous.as_str(),
        to = appointment.status.as_str(),
        "appointment status changed"
    );

    events::record_booking_event(
        &state,
        &appointment.id,
        "status_changed",
        &serde_json::json!({
            "from": previous.as_str(),
            "to": appointment.status.as_str(),
        }),
    );
    notify::dispatch_status_change(state.notifier.as_ref(), &appointment, previous).await;

    Ok(Json(appointment.into()))
}

// GET /api/admin/blocked
#[derive(Deserialize)]
pub struct BlockedQuery {
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct BlockedSlotResponse {
    date: String,
    time_slot: String,
    reason: Option<String>,
    created_at: String,
}

pub async fn get_blocked(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BlockedQuery>,
) -> Result<Json<Vec<BlockedSlotResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let date = match query.date.as_deref() {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };

    let blocked = {
        let db = state.db.lock().unwrap();
        queries::list_blocked_slots(&db, date)?
    };

    let response = blocked
        .into_iter()
        .map(|b| BlockedSlotResponse {
            date: b.date,
            time_slot: b.time_slot,
            reason: b.reason,
            created_at: b.created_at,
        })
        .collect();

    Ok(Json(response))
}

// POST /api/admin/block
#[derive(Deserialize)]
pub struct BlockRequest {
    pub date: String,
    pub time_slot: String,
    pub reason: Option<String>,
}

pub async fn block_slot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<BlockRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let date = parse_date(&body.date)?;
    if !slots::is_valid_label(&body.time_slot) {
        return Err(AppError::Validation(format!(
            "unknown time slot: {}",
            body.time_slot
        )));
    }

    {
        let db = state.db.lock().unwrap();
        queries::insert_blocked_slot(&db, date, &body.time_slot, body.reason.as_deref())?;
    }

    tracing::info!(date = %body.date, slot = %body.time_slot, "slot blocked");
    Ok(Json(serde_json::json!({"ok": true})))
}

// POST /api/admin/unblock
#[derive(Deserialize)]
pub struct UnblockRequest {
    pub date: String,
    pub time_slot: String,
}

pub async fn unblock_slot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UnblockRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let date = parse_date(&body.date)?;
    let removed = {
        let db = state.db.lock().unwrap();
        queries::delete_blocked_slot(&db, date, &body.time_slot)?
    };

    if removed {
        Ok(Json(serde_json::json!({"ok": true})))
    } else {
        Err(AppError::NotFound(format!(
            "no block on {} at {}",
            body.date, body.time_slot
        )))
    }
}
