//! LocationClass - Where the emergency is happening

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LocationClass {
    Residence,
    PublicRoad,
}

impl LocationClass {
    pub const ALL: [LocationClass; 2] = [LocationClass::Residence, LocationClass::PublicRoad];

    pub fn emoji(&self) -> &'static str {
        match self {
            LocationClass::Residence => "🏠",
            LocationClass::PublicRoad => "🛣️",
        }
    }
}

impl std::fmt::Display for LocationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationClass::Residence => write!(f, "residence"),
            LocationClass::PublicRoad => write!(f, "public_road"),
        }
    }
}

impl std::str::FromStr for LocationClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "residence" | "domicilio" => Ok(LocationClass::Residence),
            "public_road" | "via_publica" => Ok(LocationClass::PublicRoad),
            _ => Err(format!("Unknown location class: {}", s)),
        }
    }
}
