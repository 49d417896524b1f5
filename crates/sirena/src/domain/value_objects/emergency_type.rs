//! EmergencyType - Kind of emergency reported by the caller

use serde::{Deserialize, Serialize};

/// Emergency type selected by the operator at intake
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyType {
    Medical,
    Fire,
    Security,
    CivilDefense,
    Other,
}

impl EmergencyType {
    pub const ALL: [EmergencyType; 5] = [
        EmergencyType::Medical,
        EmergencyType::Fire,
        EmergencyType::Security,
        EmergencyType::CivilDefense,
        EmergencyType::Other,
    ];

    pub fn is_medical(&self) -> bool {
        matches!(self, EmergencyType::Medical)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            EmergencyType::Medical => "🏥",
            EmergencyType::Fire => "🚒",
            EmergencyType::Security => "🚔",
            EmergencyType::CivilDefense => "🌪️",
            EmergencyType::Other => "📞",
        }
    }
}

impl std::fmt::Display for EmergencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmergencyType::Medical => write!(f, "medical"),
            EmergencyType::Fire => write!(f, "fire"),
            EmergencyType::Security => write!(f, "security"),
            EmergencyType::CivilDefense => write!(f, "civil_defense"),
            EmergencyType::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for EmergencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "medical" | "medica" => Ok(EmergencyType::Medical),
            "fire" | "bomberos" => Ok(EmergencyType::Fire),
            "security" | "seguridad" => Ok(EmergencyType::Security),
            "civil_defense" | "defensa" => Ok(EmergencyType::CivilDefense),
            "other" | "otros" => Ok(EmergencyType::Other),
            _ => Err(format!("Unknown emergency type: {}", s)),
        }
    }
}
