use crate::models::{CatalogEntry, VehicleType};

/// Flat deposit collected at booking, in cents. The remainder is due on
/// site after the job.
pub const DEPOSIT_CENTS: i64 = 5_000;

/// Total price in cents for a set of catalog entries on a given vehicle.
/// Purely additive; there are no bundle discounts.
pub fn price_for(entries: &[&'static CatalogEntry], vehicle: VehicleType) -> i64 {
    entries.iter().map(|e| e.price_cents_for(vehicle)).sum()
}

/// Split a total into (deposit, remaining). The deposit never exceeds the
/// total, so a cheap add-on-only booking is simply paid in full up front.
pub fn deposit_split(total_cents: i64) -> (i64, i64) {
    let deposit = total_cents.min(DEPOSIT_CENTS);
    (deposit, total_cents - deposit)
}
