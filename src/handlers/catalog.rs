use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{catalog, CatalogEntry, ServiceSelection, VehicleType, CATALOG};
use crate::services::pricing;
use crate::state::AppState;

// GET /api/services
pub async fn list_services() -> Json<&'static [CatalogEntry]> {
    Json(CATALOG)
}

// POST /api/quote
#[derive(Deserialize)]
pub struct QuoteRequest {
    pub service_ids: Vec<String>,
    pub vehicle_type: VehicleType,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    services: Vec<ServiceSelection>,
    total_cents: i64,
    deposit_cents: i64,
    remaining_cents: i64,
    currency: String,
}

pub async fn quote(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    if body.service_ids.is_empty() {
        return Err(AppError::Validation(
            "at least one service must be selected".to_string(),
        ));
    }

    let mut entries = Vec::with_capacity(body.service_ids.len());
    for id in &body.service_ids {
        let entry = catalog::find(id)
            .ok_or_else(|| AppError::Validation(format!("unknown service: {id}")))?;
        entries.push(entry);
    }

    let total = pricing::price_for(&entries, body.vehicle_type);
    let (deposit, remaining) = pricing::deposit_split(total);
    let services = entries
        .iter()
        .map(|e| ServiceSelection::from_entry(e, body.vehicle_type))
        .collect();

    Ok(Json(QuoteResponse {
        services,
        total_cents: total,
        deposit_cents: deposit,
        remaining_cents: remaining,
        currency: state.config.currency.clone(),
    }))
}
