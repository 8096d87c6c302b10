use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VehicleType {
    Small,
    Suv,
    ThreeRow,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Small => "small",
            VehicleType::Suv => "suv",
            VehicleType::ThreeRow => "threeRow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "small" => Some(VehicleType::Small),
            "suv" => Some(VehicleType::Suv),
            "threeRow" => Some(VehicleType::ThreeRow),
            _ => None,
        }
    }
}
