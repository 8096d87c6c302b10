use std::sync::Arc;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    catalog, Appointment, AppointmentStatus, BookingDraft, PaymentRecord, ServiceSelection,
};
use crate::services::{availability, events, notify, pricing, slots};
use crate::state::AppState;

/// Create an appointment from a submitted draft.
///
/// Ordering matters here: validation runs before the payment check, the
/// payment check runs before the store is touched, and the capacity check
/// and insert share one transaction so two racing requests for the last
/// spot cannot both land. The payment id doubles as an idempotency key; a
/// replay returns the appointment it already created.
pub async fn create_booking(
    state: &Arc<AppState>,
    draft: BookingDraft,
) -> Result<Appointment, AppError> {
    let ready = draft.into_ready().map_err(AppError::Validation)?;

    if !slots::is_valid_label(&ready.time_slot) {
        return Err(AppError::Validation(format!(
            "unknown time slot: {}",
            ready.time_slot
        )));
    }
    let start = match slots::time_for_label(&ready.time_slot) {
        Some(time) => ready.date.and_time(time),
        None => {
            return Err(AppError::Validation(format!(
                "unknown time slot: {}",
                ready.time_slot
            )))
        }
    };
    if start <= state.config.business_now() {
        return Err(AppError::Validation(
            "that time slot has already passed".to_string(),
        ));
    }

    let mut entries = Vec::with_capacity(ready.service_ids.len());
    for id in &ready.service_ids {
        let entry = catalog::find(id)
            .ok_or_else(|| AppError::Validation(format!("unknown service: {id}")))?;
        entries.push(entry);
    }

    let total = pricing::price_for(&entries, ready.vehicle_type);
    let (deposit, remaining) = pricing::deposit_split(total);

    // Confirm the deposit with the processor before taking the db lock
    let verification = state
        .payments
        .verify_deposit(&ready.payment.id, deposit)
        .await
        .map_err(|e| AppError::Payment(format!("could not verify deposit: {e}")))?;
    if !verification.paid {
        return Err(AppError::Payment(format!(
            "deposit not paid (status: {})",
            verification.status
        )));
    }

    let services: Vec<ServiceSelection> = entries
        .iter()
        .map(|e| ServiceSelection::from_entry(e, ready.vehicle_type))
        .collect();

    let appointment = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;

        // Same payment id means the same booking attempt retried
        if let Some(existing) = queries::get_appointment_by_payment_id(&tx, &ready.payment.id)? {
            tracing::info!(
                appointment_id = %existing.id,
                payment_id = %ready.payment.id,
                "replayed booking request, returning existing appointment"
            );
            return Ok(existing);
        }

        if queries::is_slot_blocked(&tx, ready.date, &ready.time_slot)? {
            return Err(AppError::SlotUnavailable(
                "that time slot is unavailable".to_string(),
            ));
        }
        let count = queries::count_appointments_for_slot(&tx, ready.date, &ready.time_slot)?;
        if count >= availability::MAX_BOOKINGS_PER_SLOT {
            return Err(AppError::SlotUnavailable(
                "that time slot is fully booked".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let appointment = Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            customer: ready.customer,
            services,
            vehicle_type: ready.vehicle_type,
            date: ready.date,
            time_slot: ready.time_slot,
            address: ready.address,
            estimated_price_cents: total,
            final_price_cents: total,
            deposit_cents: deposit,
            remaining_cents: remaining,
            payment: PaymentRecord {
                id: ready.payment.id,
                method: ready.payment.method,
                status: verification.status,
            },
            // A verified deposit is approval enough; admins step in only
            // to cancel or complete
            status: AppointmentStatus::Approved,
            created_at: now,
            updated_at: now,
        };
        queries::insert_appointment(&tx, &appointment)?;
        tx.commit()?;
        appointment
    };

    tracing::info!(
        appointment_id = %appointment.id,
        date = %appointment.date,
        slot = %appointment.time_slot,
        total_cents = appointment.final_price_cents,
        "appointment booked"
    );

    events::record_booking_event(
        state,
        &appointment.id,
        "created",
        &serde_json::json!({
            "date": appointment.date.format("%Y-%m-%d").to_string(),
            "time_slot": appointment.time_slot,
            "final_price_cents": appointment.final_price_cents,
        }),
    );
    notify::dispatch_created(state.notifier.as_ref(), &appointment).await;

    Ok(appointment)
}
