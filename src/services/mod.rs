pub mod availability;
pub mod booking;
pub mod events;
pub mod notify;
pub mod payments;
pub mod pricing;
pub mod slots;
