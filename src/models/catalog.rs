use serde::{Deserialize, Serialize};

use super::VehicleType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Exterior,
    Interior,
    Packages,
    AddOns,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Exterior => "exterior",
            ServiceCategory::Interior => "interior",
            ServiceCategory::Packages => "packages",
            ServiceCategory::AddOns => "add_ons",
        }
    }
}

/// Price tiers by vehicle size. When an entry carries one of these, it is
/// authoritative over the flat price once a vehicle type is chosen.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VehiclePrices {
    pub small: i64,
    pub suv: i64,
    #[serde(rename = "threeRow")]
    pub three_row: i64,
}

impl VehiclePrices {
    pub fn for_vehicle(&self, vehicle: VehicleType) -> i64 {
        match vehicle {
            VehicleType::Small => self.small,
            VehicleType::Suv => self.suv,
            VehicleType::ThreeRow => self.three_row,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ServiceCategory,
    pub price_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_prices: Option<VehiclePrices>,
}

impl CatalogEntry {
    pub fn price_cents_for(&self, vehicle: VehicleType) -> i64 {
        match &self.vehicle_prices {
            Some(prices) => prices.for_vehicle(vehicle),
            None => self.price_cents,
        }
    }
}

/// The service menu is code-defined: prices change with deployments, not at
/// runtime. Entries are addressed by stable id everywhere (API, stored
/// snapshots), never by display name.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "full-detail",
        name: "Full Detail",
        category: ServiceCategory::Packages,
        price_cents: 15_000,
        vehicle_prices: Some(VehiclePrices {
            small: 15_000,
            suv: 17_500,
            three_row: 19_500,
        }),
    },
    CatalogEntry {
        id: "exterior-wash-wax",
        name: "Exterior Wash & Wax",
        category: ServiceCategory::Exterior,
        price_cents: 7_500,
        vehicle_prices: Some(VehiclePrices {
            small: 7_500,
            suv: 8_500,
            three_row: 9_500,
        }),
    },
    CatalogEntry {
        id: "interior-deep-clean",
        name: "Interior Deep Clean",
        category: ServiceCategory::Interior,
        price_cents: 9_500,
        vehicle_prices: Some(VehiclePrices {
            small: 9_500,
            suv: 11_000,
            three_row: 12_500,
        }),
    },
    CatalogEntry {
        id: "ceramic-coating",
        name: "Ceramic Coating",
        category: ServiceCategory::Exterior,
        price_cents: 55_000,
        vehicle_prices: Some(VehiclePrices {
            small: 55_000,
            suv: 62_500,
            three_row: 69_500,
        }),
    },
    CatalogEntry {
        id: "odor-elimination",
        name: "Odor Elimination",
        category: ServiceCategory::Interior,
        price_cents: 8_000,
        vehicle_prices: None,
    },
    CatalogEntry {
        id: "engine-bay-cleaning",
        name: "Engine Bay Cleaning",
        category: ServiceCategory::AddOns,
        price_cents: 6_000,
        vehicle_prices: None,
    },
    CatalogEntry {
        id: "headlight-restoration",
        name: "Headlight Restoration",
        category: ServiceCategory::AddOns,
        price_cents: 4_500,
        vehicle_prices: None,
    },
    CatalogEntry {
        id: "pet-hair-removal",
        name: "Pet Hair Removal",
        category: ServiceCategory::AddOns,
        price_cents: 3_500,
        vehicle_prices: None,
    },
];

pub fn find(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.id == id)
}

/// A service as captured on an appointment: the catalog entry resolved
/// against the chosen vehicle at booking time, so later catalog edits don't
/// rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceSelection {
    pub id: String,
    pub name: String,
    pub category: ServiceCategory,
    pub price_cents: i64,
}

impl ServiceSelection {
    pub fn from_entry(entry: &CatalogEntry, vehicle: VehicleType) -> Self {
        ServiceSelection {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            category: entry.category,
            price_cents: entry.price_cents_for(vehicle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_stable_id() {
        let entry = find("exterior-wash-wax").unwrap();
        assert_eq!(entry.name, "Exterior Wash & Wax");
        assert!(find("Exterior Wash & Wax").is_none());
    }

    #[test]
    fn test_vehicle_map_overrides_flat_price() {
        let entry = find("exterior-wash-wax").unwrap();
        assert_eq!(entry.price_cents_for(VehicleType::Small), 7_500);
        assert_eq!(entry.price_cents_for(VehicleType::Suv), 8_500);
        assert_eq!(entry.price_cents_for(VehicleType::ThreeRow), 9_500);
    }

    #[test]
    fn test_flat_price_fallback_without_vehicle_map() {
        let entry = find("headlight-restoration").unwrap();
        for vt in [VehicleType::Small, VehicleType::Suv, VehicleType::ThreeRow] {
            assert_eq!(entry.price_cents_for(vt), 4_500);
        }
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_selection_snapshots_vehicle_price() {
        let entry = find("full-detail").unwrap();
        let sel = ServiceSelection::from_entry(entry, VehicleType::ThreeRow);
        assert_eq!(sel.price_cents, 19_500);
        assert_eq!(sel.category, ServiceCategory::Packages);
    }
}
