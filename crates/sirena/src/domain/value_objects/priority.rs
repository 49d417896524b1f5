//! Priority - Urgency tier assigned to a call

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Call priority
///
/// Ordered by urgency, so `Red` is the maximum of any set of priorities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Red,
    Yellow,
    Green,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Red, Priority::Yellow, Priority::Green];

    /// Urgency rank (higher is more urgent)
    pub fn urgency(&self) -> u8 {
        match self {
            Priority::Red => 3,
            Priority::Yellow => 2,
            Priority::Green => 1,
        }
    }

    /// Raise this priority to `other` if it is more urgent. Never lowers.
    pub fn escalate(self, other: Priority) -> Priority {
        self.max(other)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Priority::Red => "🔴",
            Priority::Yellow => "🟡",
            Priority::Green => "🟢",
        }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.urgency().cmp(&other.urgency())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Red => write!(f, "red"),
            Priority::Yellow => write!(f, "yellow"),
            Priority::Green => write!(f, "green"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" | "rojo" => Ok(Priority::Red),
            "yellow" | "amarillo" => Ok(Priority::Yellow),
            "green" | "verde" => Ok(Priority::Green),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_red_is_maximum() {
        let max = [Priority::Green, Priority::Red, Priority::Yellow]
            .into_iter()
            .max();
        assert_eq!(max, Some(Priority::Red));
    }

    #[test]
    fn test_escalate_never_lowers() {
        assert_eq!(Priority::Red.escalate(Priority::Green), Priority::Red);
        assert_eq!(Priority::Green.escalate(Priority::Yellow), Priority::Yellow);
        assert_eq!(Priority::Yellow.escalate(Priority::Yellow), Priority::Yellow);
    }

    #[test]
    fn test_parse_accepts_intake_form_values() {
        assert_eq!("rojo".parse::<Priority>(), Ok(Priority::Red));
        assert_eq!("Amarillo".parse::<Priority>(), Ok(Priority::Yellow));
        assert_eq!("green".parse::<Priority>(), Ok(Priority::Green));
        assert!("blue".parse::<Priority>().is_err());
    }
}
