pub mod appointment;
pub mod catalog;
pub mod draft;
pub mod event;
pub mod slot;
pub mod vehicle;

pub use appointment::{Address, Appointment, AppointmentStatus, Customer, PaymentRecord};
pub use catalog::{CatalogEntry, ServiceCategory, ServiceSelection, VehiclePrices, CATALOG};
pub use draft::{BookingDraft, DraftStage, PaymentResult, ReadyDraft};
pub use event::BookingEvent;
pub use slot::{Slot, SlotAvailability};
pub use vehicle::VehicleType;
