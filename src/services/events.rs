use std::sync::Arc;

use crate::db::queries;
use crate::models::BookingEvent;
use crate::state::AppState;

/// Append an event to the booking feed and push it to live SSE subscribers.
/// Feed writes are best-effort: a failed insert is logged, never surfaced.
pub fn record_booking_event(
    state: &Arc<AppState>,
    appointment_id: &str,
    kind: &str,
    data: &serde_json::Value,
) {
    let payload = data.to_string();
    let event_id = {
        let db = state.db.lock().unwrap();
        queries::insert_booking_event(&db, appointment_id, kind, &payload)
    };

    match event_id {
        Ok(id) => {
            let event = BookingEvent {
                id,
                appointment_id: appointment_id.to_string(),
                kind: kind.to_string(),
                data: payload,
                created_at: chrono::Utc::now()
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            };
            // Broadcast to SSE subscribers; ignore if no receivers
            let _ = state.events_tx.send(event);
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to record booking event");
        }
    }
}
