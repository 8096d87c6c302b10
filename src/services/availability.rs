use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::SlotAvailability;
use crate::services::slots;

/// How many crews can work the same slot. Two vans, two jobs.
pub const MAX_BOOKINGS_PER_SLOT: i64 = 2;

/// Availability for every future slot on `date`: the generated slot list
/// overlaid with booking tallies and admin blocks. Cancelled and rejected
/// appointments do not count toward capacity.
pub fn check_availability(
    conn: &Connection,
    date: NaiveDate,
    now: NaiveDateTime,
) -> anyhow::Result<Vec<SlotAvailability>> {
    let slots = slots::generate_slots(date, now);
    if slots.is_empty() {
        return Ok(Vec::new());
    }

    let counts: HashMap<String, i64> = queries::count_appointments_by_slot(conn, date)?
        .into_iter()
        .collect();
    let blocked: HashSet<String> = queries::blocked_labels_for_date(conn, date)?
        .into_iter()
        .collect();

    Ok(slots
        .into_iter()
        .map(|slot| {
            let count = counts.get(&slot.label).copied().unwrap_or(0);
            let is_blocked = blocked.contains(&slot.label);
            SlotAvailability {
                available: !is_blocked && count < MAX_BOOKINGS_PER_SLOT,
                booking_count: count,
                spots_remaining: MAX_BOOKINGS_PER_SLOT - count,
                start_time: slot.start_time,
                label: slot.label,
            }
        })
        .collect())
}

/// Fallback when the store is unreachable: every future slot reads as open.
/// Showing a bookable slot beats showing a dead calendar; the booking write
/// itself still enforces capacity.
pub fn fail_open(date: NaiveDate, now: NaiveDateTime) -> Vec<SlotAvailability> {
    slots::generate_slots(date, now)
        .into_iter()
        .map(|slot| SlotAvailability {
            available: true,
            booking_count: 0,
            spots_remaining: MAX_BOOKINGS_PER_SLOT,
            start_time: slot.start_time,
            label: slot.label,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{
        Address, Appointment, AppointmentStatus, Customer, PaymentRecord, ServiceSelection,
        VehicleType,
    };

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seed_appointment(conn: &Connection, d: NaiveDate, slot: &str, status: AppointmentStatus) {
        let now = chrono::Utc::now().naive_utc();
        let appt = Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            customer: Customer::Guest {
                name: "Dana".to_string(),
                email: "dana@example.com".to_string(),
                phone: "+15550001111".to_string(),
            },
            services: vec![ServiceSelection {
                id: "exterior-wash-wax".to_string(),
                name: "Exterior Wash & Wax".to_string(),
                category: crate::models::ServiceCategory::Exterior,
                price_cents: 8_500,
            }],
            vehicle_type: VehicleType::Suv,
            date: d,
            time_slot: slot.to_string(),
            address: Address {
                street: "12 Elm St".into(),
                city: "Springfield".into(),
                state: "IL".into(),
                zip_code: "62704".into(),
            },
            estimated_price_cents: 8_500,
            final_price_cents: 8_500,
            deposit_cents: 5_000,
            remaining_cents: 3_500,
            payment: PaymentRecord {
                id: uuid::Uuid::new_v4().to_string(),
                method: "card".to_string(),
                status: "succeeded".to_string(),
            },
            status,
            created_at: now,
            updated_at: now,
        };
        queries::insert_appointment(conn, &appt).unwrap();
    }

    #[test]
    fn test_empty_day_all_open() {
        let conn = setup_db();
        let result =
            check_availability(&conn, date("2030-06-10"), dt("2026-09-01 08:00")).unwrap();
        assert_eq!(result.len(), 5);
        for slot in &result {
            assert!(slot.available);
            assert_eq!(slot.booking_count, 0);
            assert_eq!(slot.spots_remaining, 2);
        }
    }

    #[test]
    fn test_full_slot_reads_unavailable() {
        let conn = setup_db();
        let d = date("2030-06-10");
        seed_appointment(&conn, d, "10:00 AM", AppointmentStatus::Approved);
        seed_appointment(&conn, d, "10:00 AM", AppointmentStatus::Pending);

        let result = check_availability(&conn, d, dt("2026-09-01 08:00")).unwrap();
        let ten = result.iter().find(|s| s.label == "10:00 AM").unwrap();
        assert!(!ten.available);
        assert_eq!(ten.booking_count, 2);
        assert_eq!(ten.spots_remaining, 0);
        // Other slots are untouched
        let one = result.iter().find(|s| s.label == "1:00 PM").unwrap();
        assert!(one.available);
    }

    #[test]
    fn test_cancelled_does_not_count() {
        let conn = setup_db();
        let d = date("2030-06-10");
        seed_appointment(&conn, d, "1:00 PM", AppointmentStatus::Approved);
        seed_appointment(&conn, d, "1:00 PM", AppointmentStatus::Cancelled);

        let result = check_availability(&conn, d, dt("2026-09-01 08:00")).unwrap();
        let one = result.iter().find(|s| s.label == "1:00 PM").unwrap();
        assert!(one.available);
        assert_eq!(one.booking_count, 1);
        assert_eq!(one.spots_remaining, 1);
    }

    #[test]
    fn test_rejected_does_not_count() {
        let conn = setup_db();
        let d = date("2030-06-10");
        seed_appointment(&conn, d, "3:00 PM", AppointmentStatus::Rejected);

        let result = check_availability(&conn, d, dt("2026-09-01 08:00")).unwrap();
        let three = result.iter().find(|s| s.label == "3:00 PM").unwrap();
        assert_eq!(three.booking_count, 0);
    }

    #[test]
    fn test_blocked_slot_reads_unavailable() {
        let conn = setup_db();
        let d = date("2030-06-10");
        queries::insert_blocked_slot(&conn, d, "7:30 AM", Some("crew holiday")).unwrap();

        let result = check_availability(&conn, d, dt("2026-09-01 08:00")).unwrap();
        let first = result.iter().find(|s| s.label == "7:30 AM").unwrap();
        assert!(!first.available);
        assert_eq!(first.booking_count, 0);
    }

    #[test]
    fn test_past_date_has_no_slots() {
        let conn = setup_db();
        let result =
            check_availability(&conn, date("2026-09-10"), dt("2026-09-12 08:00")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_check_is_read_only() {
        let conn = setup_db();
        let d = date("2030-06-10");
        seed_appointment(&conn, d, "10:00 AM", AppointmentStatus::Approved);

        let first = check_availability(&conn, d, dt("2026-09-01 08:00")).unwrap();
        let second = check_availability(&conn, d, dt("2026-09-01 08:00")).unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.booking_count, b.booking_count);
            assert_eq!(a.available, b.available);
        }
    }

    #[test]
    fn test_fail_open_offers_everything() {
        let result = fail_open(date("2030-06-10"), dt("2026-09-01 08:00"));
        assert_eq!(result.len(), 5);
        assert!(result.iter().all(|s| s.available && s.spots_remaining == 2));
    }
}
