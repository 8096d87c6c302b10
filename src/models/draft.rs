use chrono::NaiveDate;
use serde::Deserialize;

use super::appointment::{Address, Customer};
use super::VehicleType;

/// Everything a client submits to create a booking. Unlike the sprawling
/// mutable wizard state it replaces, the draft is immutable once received;
/// `stage()` reports how far through the wizard it got, and `first_gap()`
/// names the requirement blocking the next stage.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingDraft {
    #[serde(default)]
    pub service_ids: Vec<String>,
    #[serde(default)]
    pub vehicle_type: Option<VehicleType>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub payment: Option<PaymentResult>,
}

/// The client-side payment outcome attached to a draft. The id is verified
/// against the processor before anything is written.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub method: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftStage {
    SelectingServices,
    SelectingVehicle,
    EnteringContact,
    SelectingSlot,
    EnteringAddress,
    Paying,
    Ready,
}

/// A draft that cleared every wizard gate, with the optionals peeled off.
#[derive(Debug, Clone)]
pub struct ReadyDraft {
    pub service_ids: Vec<String>,
    pub vehicle_type: VehicleType,
    pub customer: Customer,
    pub date: NaiveDate,
    pub time_slot: String,
    pub address: Address,
    pub payment: PaymentResult,
}

impl BookingDraft {
    /// First wizard stage whose requirements are not met. Stages gate in
    /// order: a draft with an address but no vehicle type is still stuck at
    /// `SelectingVehicle`.
    pub fn stage(&self) -> DraftStage {
        if self.service_ids.is_empty() {
            return DraftStage::SelectingServices;
        }
        if self.vehicle_type.is_none() {
            return DraftStage::SelectingVehicle;
        }
        if self.contact_gap().is_some() {
            return DraftStage::EnteringContact;
        }
        if self.slot_gap().is_some() {
            return DraftStage::SelectingSlot;
        }
        if self.address_gap().is_some() {
            return DraftStage::EnteringAddress;
        }
        if self.payment_gap().is_some() {
            return DraftStage::Paying;
        }
        DraftStage::Ready
    }

    /// The specific requirement blocking `stage()`, as a user-facing message.
    /// `None` means the draft is ready to book.
    pub fn first_gap(&self) -> Option<String> {
        match self.stage() {
            DraftStage::SelectingServices => {
                Some("at least one service must be selected".to_string())
            }
            DraftStage::SelectingVehicle => Some("a vehicle type must be chosen".to_string()),
            DraftStage::EnteringContact => self.contact_gap(),
            DraftStage::SelectingSlot => self.slot_gap(),
            DraftStage::EnteringAddress => self.address_gap(),
            DraftStage::Paying => self.payment_gap(),
            DraftStage::Ready => None,
        }
    }

    /// Peel off the optionals, or report the first gap as an error message.
    pub fn into_ready(self) -> Result<ReadyDraft, String> {
        if let Some(gap) = self.first_gap() {
            return Err(gap);
        }
        match (
            self.vehicle_type,
            self.customer,
            self.date,
            self.time_slot,
            self.address,
            self.payment,
        ) {
            (
                Some(vehicle_type),
                Some(customer),
                Some(date),
                Some(time_slot),
                Some(address),
                Some(payment),
            ) => Ok(ReadyDraft {
                service_ids: self.service_ids,
                vehicle_type,
                customer,
                date,
                time_slot,
                address,
                payment,
            }),
            _ => Err("booking draft is incomplete".to_string()),
        }
    }

    fn contact_gap(&self) -> Option<String> {
        let customer = match &self.customer {
            Some(c) => c,
            None => return Some("customer contact details are required".to_string()),
        };
        match customer {
            Customer::Registered { user_id, phone } => {
                if user_id.trim().is_empty() {
                    Some("a user id is required for registered bookings".to_string())
                } else if phone.trim().is_empty() {
                    Some("a contact phone number is required".to_string())
                } else {
                    None
                }
            }
            Customer::Guest { name, email, phone } => {
                if name.trim().is_empty() {
                    Some("guest name is required".to_string())
                } else if email.trim().is_empty() || !email.contains('@') {
                    Some("a valid guest email is required".to_string())
                } else if phone.trim().is_empty() {
                    Some("a contact phone number is required".to_string())
                } else {
                    None
                }
            }
        }
    }

    fn slot_gap(&self) -> Option<String> {
        if self.date.is_none() {
            return Some("a booking date is required".to_string());
        }
        match self.time_slot.as_deref() {
            None => Some("a time slot is required".to_string()),
            Some(s) if s.trim().is_empty() => Some("a time slot is required".to_string()),
            Some(_) => None,
        }
    }

    fn address_gap(&self) -> Option<String> {
        match &self.address {
            None => Some("a service address is required".to_string()),
            Some(addr) => addr
                .missing_field()
                .map(|field| format!("address {field} is required")),
        }
    }

    fn payment_gap(&self) -> Option<String> {
        match &self.payment {
            None => Some("a completed deposit payment is required".to_string()),
            Some(p) if p.id.trim().is_empty() => {
                Some("a completed deposit payment is required".to_string())
            }
            Some(p) if p.method.trim().is_empty() => {
                Some("a payment method is required".to_string())
            }
            Some(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(name: &str, email: &str, phone: &str) -> Customer {
        Customer::Guest {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    fn complete_draft() -> BookingDraft {
        BookingDraft {
            service_ids: vec!["exterior-wash-wax".to_string()],
            vehicle_type: Some(VehicleType::Suv),
            customer: Some(guest("Dana", "dana@example.com", "+15550001111")),
            date: Some(NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()),
            time_slot: Some("10:00 AM".to_string()),
            address: Some(Address {
                street: "12 Elm St".into(),
                city: "Springfield".into(),
                state: "IL".into(),
                zip_code: "62704".into(),
            }),
            payment: Some(PaymentResult {
                id: "pi_123".into(),
                method: "card".into(),
            }),
        }
    }

    #[test]
    fn test_stages_gate_in_order() {
        let mut draft = BookingDraft {
            service_ids: vec![],
            vehicle_type: None,
            customer: None,
            date: None,
            time_slot: None,
            address: None,
            payment: None,
        };
        assert_eq!(draft.stage(), DraftStage::SelectingServices);

        draft.service_ids = vec!["full-detail".to_string()];
        assert_eq!(draft.stage(), DraftStage::SelectingVehicle);

        draft.vehicle_type = Some(VehicleType::Small);
        assert_eq!(draft.stage(), DraftStage::EnteringContact);

        draft.customer = Some(guest("Dana", "dana@example.com", "+15550001111"));
        assert_eq!(draft.stage(), DraftStage::SelectingSlot);

        draft.date = Some(NaiveDate::from_ymd_opt(2026, 9, 12).unwrap());
        draft.time_slot = Some("1:00 PM".to_string());
        assert_eq!(draft.stage(), DraftStage::EnteringAddress);

        draft.address = Some(Address {
            street: "12 Elm St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip_code: "62704".into(),
        });
        assert_eq!(draft.stage(), DraftStage::Paying);

        draft.payment = Some(PaymentResult {
            id: "pi_123".into(),
            method: "card".into(),
        });
        assert_eq!(draft.stage(), DraftStage::Ready);
        assert_eq!(draft.first_gap(), None);
    }

    #[test]
    fn test_earlier_stage_wins_over_later_fields() {
        let mut draft = complete_draft();
        draft.vehicle_type = None;
        assert_eq!(draft.stage(), DraftStage::SelectingVehicle);
    }

    #[test]
    fn test_guest_missing_phone_reports_phone() {
        let mut draft = complete_draft();
        draft.customer = Some(guest("Dana", "dana@example.com", ""));
        assert_eq!(draft.stage(), DraftStage::EnteringContact);
        let gap = draft.first_gap().unwrap();
        assert!(gap.contains("phone"), "unexpected gap: {gap}");
    }

    #[test]
    fn test_guest_bad_email_rejected() {
        let mut draft = complete_draft();
        draft.customer = Some(guest("Dana", "not-an-email", "+15550001111"));
        let gap = draft.first_gap().unwrap();
        assert!(gap.contains("email"), "unexpected gap: {gap}");
    }

    #[test]
    fn test_incomplete_address_names_field() {
        let mut draft = complete_draft();
        draft.address = Some(Address {
            street: "12 Elm St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip_code: "".into(),
        });
        assert_eq!(draft.first_gap().unwrap(), "address zip code is required");
    }

    #[test]
    fn test_blank_payment_id_blocks_at_paying() {
        let mut draft = complete_draft();
        draft.payment = Some(PaymentResult {
            id: "  ".into(),
            method: "card".into(),
        });
        assert_eq!(draft.stage(), DraftStage::Paying);
    }

    #[test]
    fn test_into_ready_round_trip() {
        let ready = complete_draft().into_ready().unwrap();
        assert_eq!(ready.time_slot, "10:00 AM");
        assert_eq!(ready.vehicle_type, VehicleType::Suv);

        let mut incomplete = complete_draft();
        incomplete.date = None;
        assert_eq!(
            incomplete.into_ready().unwrap_err(),
            "a booking date is required"
        );
    }
}
