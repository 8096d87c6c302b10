use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    Address, Appointment, BookingDraft, Customer, PaymentRecord, ServiceSelection, VehicleType,
};
use crate::services::booking;
use crate::state::AppState;

/// Wire form of an appointment, shared by the public booking endpoints and
/// the admin list. Dates and timestamps go out as strings.
#[derive(Serialize)]
pub struct AppointmentResponse {
    id: String,
    customer: Customer,
    services: Vec<ServiceSelection>,
    vehicle_type: VehicleType,
    date: String,
    time_slot: String,
    address: Address,
    estimated_price_cents: i64,
    final_price_cents: i64,
    deposit_cents: i64,
    remaining_cents: i64,
    payment: PaymentRecord,
    status: String,
    created_at: String,
    updated_at: String,
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        AppointmentResponse {
            id: a.id,
            customer: a.customer,
            services: a.services,
            vehicle_type: a.vehicle_type,
            date: a.date.format("%Y-%m-%d").to_string(),
            time_slot: a.time_slot,
            address: a.address,
            estimated_price_cents: a.estimated_price_cents,
            final_price_cents: a.final_price_cents,
            deposit_cents: a.deposit_cents,
            remaining_cents: a.remaining_cents,
            payment: a.payment,
            status: a.status.as_str().to_string(),
            created_at: a.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: a.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<BookingDraft>,
) -> Result<(StatusCode, Json<AppointmentResponse>), AppError> {
    let appointment = booking::create_booking(&state, draft).await?;
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let appointment = {
        let db = state.db.lock().unwrap();
        queries::get_appointment_by_id(&db, &id)?
    };

    appointment
        .map(|a| Json(a.into()))
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))
}
