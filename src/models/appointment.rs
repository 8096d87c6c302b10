use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::catalog::ServiceSelection;
use super::VehicleType;

/// Who booked. The storage layer keeps the original `is_guest` discriminator;
/// in the API the variant tag replaces flag-plus-nullable-fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Customer {
    Registered {
        user_id: String,
        #[serde(default)]
        phone: String,
    },
    Guest {
        #[serde(default)]
        name: String,
        #[serde(default)]
        email: String,
        #[serde(default)]
        phone: String,
    },
}

impl Customer {
    pub fn phone(&self) -> &str {
        match self {
            Customer::Registered { phone, .. } => phone,
            Customer::Guest { phone, .. } => phone,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Customer::Guest { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

impl Address {
    /// First missing required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.street.trim().is_empty() {
            Some("street")
        } else if self.city.trim().is_empty() {
            Some("city")
        } else if self.state.trim().is_empty() {
            Some("state")
        } else if self.zip_code.trim().is_empty() {
            Some("zip code")
        } else {
            None
        }
    }
}

/// The deposit payment attached to an appointment. `status` starts at the
/// verified value from booking time and may later change via the payment
/// webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub id: String,
    pub method: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Completed,
    Cancelled,
    Rejected,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Approved => "approved",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => AppointmentStatus::Approved,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            "rejected" => AppointmentStatus::Rejected,
            _ => AppointmentStatus::Pending,
        }
    }

    /// Cancelled and rejected appointments release their slot; everything
    /// else holds capacity, including pending ones awaiting review.
    pub fn counts_toward_capacity(&self) -> bool {
        !matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Rejected
        )
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Pending, Cancelled)
                | (Approved, Completed)
                | (Approved, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub customer: Customer,
    pub services: Vec<ServiceSelection>,
    pub vehicle_type: VehicleType,
    pub date: NaiveDate,
    pub time_slot: String,
    pub address: Address,
    pub estimated_price_cents: i64,
    pub final_price_cents: i64,
    pub deposit_cents: i64,
    pub remaining_cents: i64,
    pub payment: PaymentRecord,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Approved,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Rejected,
        ] {
            assert_eq!(AppointmentStatus::parse(status.as_str()), status);
        }
        assert_eq!(
            AppointmentStatus::parse("garbage"),
            AppointmentStatus::Pending
        );
    }

    #[test]
    fn test_capacity_policy() {
        assert!(AppointmentStatus::Pending.counts_toward_capacity());
        assert!(AppointmentStatus::Approved.counts_toward_capacity());
        assert!(AppointmentStatus::Completed.counts_toward_capacity());
        assert!(!AppointmentStatus::Cancelled.counts_toward_capacity());
        assert!(!AppointmentStatus::Rejected.counts_toward_capacity());
    }

    #[test]
    fn test_transition_table() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Completed));
        assert!(Approved.can_transition_to(Cancelled));

        assert!(!Approved.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Approved));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn test_guest_customer_serde_tagging() {
        let guest: Customer = serde_json::from_str(
            r#"{"kind":"guest","name":"Dana","email":"dana@example.com","phone":"+15550001111"}"#,
        )
        .unwrap();
        assert!(guest.is_guest());
        assert_eq!(guest.phone(), "+15550001111");

        // Missing optional-at-parse fields default to empty and are caught by
        // draft validation, not by deserialization.
        let sparse: Customer =
            serde_json::from_str(r#"{"kind":"guest","name":"Dana"}"#).unwrap();
        assert_eq!(sparse.phone(), "");
    }

    #[test]
    fn test_address_missing_field_order() {
        let mut addr = Address {
            street: "".into(),
            city: "".into(),
            state: "".into(),
            zip_code: "".into(),
        };
        assert_eq!(addr.missing_field(), Some("street"));
        addr.street = "12 Elm St".into();
        assert_eq!(addr.missing_field(), Some("city"));
        addr.city = "Springfield".into();
        addr.state = "IL".into();
        assert_eq!(addr.missing_field(), Some("zip code"));
        addr.zip_code = "62704".into();
        assert_eq!(addr.missing_field(), None);
    }
}
