use serde::{Deserialize, Serialize};

/// A row in the booking event feed. Events are appended whenever an
/// appointment is created or changes state and fan out to admin dashboards
/// over SSE; `data` carries a JSON payload that varies by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    pub id: i64,
    pub appointment_id: String,
    pub kind: String,
    pub data: String,
    pub created_at: String,
}
