use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{catalog, VehicleType};
use crate::services::pricing;
use crate::state::AppState;

// POST /api/payments/intent
//
// The deposit amount is derived server-side from the selected services;
// a client-supplied amount is never trusted.
#[derive(Deserialize)]
pub struct IntentRequest {
    pub service_ids: Vec<String>,
    pub vehicle_type: VehicleType,
}

#[derive(Serialize)]
pub struct IntentResponse {
    payment_intent_id: String,
    client_secret: String,
    deposit_cents: i64,
    total_cents: i64,
    currency: String,
}

pub async fn create_intent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IntentRequest>,
) -> Result<Json<IntentResponse>, AppError> {
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
    let (deposit, _) = pricing::deposit_split(total);

    let names: Vec<&str> = entries.iter().map(|e| e.name).collect();
    let description = format!("Detailing deposit: {}", names.join(", "));

    let intent = state
        .payments
        .create_deposit_intent(deposit, &state.config.currency, &description)
        .await
        .map_err(|e| AppError::Payment(format!("could not create payment intent: {e}")))?;

    Ok(Json(IntentResponse {
        payment_intent_id: intent.id,
        client_secret: intent.client_secret,
        deposit_cents: deposit,
        total_cents: total,
        currency: state.config.currency.clone(),
    }))
}
