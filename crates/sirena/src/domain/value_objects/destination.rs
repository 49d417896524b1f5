//! DestinationService - Responding unit a call is routed to

use serde::{Deserialize, Serialize};

/// Responding service that receives the dispatch notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DestinationService {
    /// Home emergency ambulance service
    Demva,
    Telemedicine,
    /// Emergency coordination center for public-road incidents
    Cec,
    FireDept,
    SecurityDept,
    CivilDefenseDept,
    OtherDept,
    /// Shift supervisor, copied on every call
    Supervisor,
}

impl DestinationService {
    pub const ALL: [DestinationService; 8] = [
        DestinationService::Demva,
        DestinationService::Telemedicine,
        DestinationService::Cec,
        DestinationService::FireDept,
        DestinationService::SecurityDept,
        DestinationService::CivilDefenseDept,
        DestinationService::OtherDept,
        DestinationService::Supervisor,
    ];

    /// Configuration key holding this destination's address
    pub fn config_key(&self) -> &'static str {
        match self {
            DestinationService::Demva => "PHONE_DEMVA",
            DestinationService::Telemedicine => "PHONE_TELEMEDICINE",
            DestinationService::Cec => "PHONE_CEC",
            DestinationService::FireDept => "PHONE_FIRE_DEPT",
            DestinationService::SecurityDept => "PHONE_SECURITY_DEPT",
            DestinationService::CivilDefenseDept => "PHONE_CIVIL_DEFENSE_DEPT",
            DestinationService::OtherDept => "PHONE_OTHER_DEPT",
            DestinationService::Supervisor => "PHONE_SUPERVISOR",
        }
    }
}

impl std::fmt::Display for DestinationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DestinationService::Demva => write!(f, "demva"),
            DestinationService::Telemedicine => write!(f, "telemedicine"),
            DestinationService::Cec => write!(f, "cec"),
            DestinationService::FireDept => write!(f, "fire_dept"),
            DestinationService::SecurityDept => write!(f, "security_dept"),
            DestinationService::CivilDefenseDept => write!(f, "civil_defense_dept"),
            DestinationService::OtherDept => write!(f, "other_dept"),
            DestinationService::Supervisor => write!(f, "supervisor"),
        }
    }
}

impl std::str::FromStr for DestinationService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "demva" => Ok(DestinationService::Demva),
            "telemedicine" => Ok(DestinationService::Telemedicine),
            "cec" => Ok(DestinationService::Cec),
            "fire_dept" => Ok(DestinationService::FireDept),
            "security_dept" => Ok(DestinationService::SecurityDept),
            "civil_defense_dept" => Ok(DestinationService::CivilDefenseDept),
            "other_dept" => Ok(DestinationService::OtherDept),
            "supervisor" => Ok(DestinationService::Supervisor),
            _ => Err(format!("Unknown destination service: {}", s)),
        }
    }
}
