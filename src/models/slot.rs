use chrono::NaiveDateTime;
use serde::Serialize;

/// One bookable time on a given date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Slot {
    pub start_time: NaiveDateTime,
    pub label: String,
}

/// A slot annotated with its booking load for one date. `spots_remaining`
/// follows the capacity formula even for legacy overbooked data, so it can
/// be negative while `available` is already false.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotAvailability {
    pub label: String,
    pub start_time: NaiveDateTime,
    pub available: bool,
    pub booking_count: i64,
    pub spots_remaining: i64,
}
