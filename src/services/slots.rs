use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::models::Slot;

/// Start times offered every day of the week, in (hour, minute) 24-hour form.
/// The mobile crews run five jobs a day regardless of weekday.
pub const DAILY_SLOT_TIMES: [(u32, u32); 5] = [(7, 30), (10, 0), (13, 0), (15, 0), (17, 0)];

/// Slots for `date` that still lie in the future relative to `now`. For a
/// past date this is empty; for today it shrinks as the day goes on. Slots
/// come back in chronological order.
pub fn generate_slots(date: NaiveDate, now: NaiveDateTime) -> Vec<Slot> {
    DAILY_SLOT_TIMES
        .iter()
        .filter_map(|&(hour, minute)| {
            let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
            let start = date.and_time(time);
            if start > now {
                Some(Slot {
                    start_time: start,
                    label: label_for(time),
                })
            } else {
                None
            }
        })
        .collect()
}

/// 12-hour display label with no leading zero, e.g. "7:30 AM" / "1:00 PM".
/// These strings are the slot identity everywhere: stored on appointments,
/// keyed in blocked_slots, matched on booking.
pub fn label_for(time: NaiveTime) -> String {
    let hour24 = time.hour();
    let (hour12, meridiem) = match hour24 {
        0 => (12, "AM"),
        1..=11 => (hour24, "AM"),
        12 => (12, "PM"),
        _ => (hour24 - 12, "PM"),
    };
    format!("{}:{:02} {}", hour12, time.minute(), meridiem)
}

/// Whether `label` names one of the daily slots.
pub fn is_valid_label(label: &str) -> bool {
    DAILY_SLOT_TIMES
        .iter()
        .filter_map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .any(|t| label_for(t) == label)
}

/// Start time for a slot label, if it names one of the daily slots.
pub fn time_for_label(label: &str) -> Option<NaiveTime> {
    DAILY_SLOT_TIMES
        .iter()
        .filter_map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .find(|&t| label_for(t) == label)
}
