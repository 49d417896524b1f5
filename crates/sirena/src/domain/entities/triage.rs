//! TriageAnswers - Fixed medical question set answered at intake

use serde::{Deserialize, Serialize};

/// Answers to the five triage questions of a medical call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TriageAnswers {
    pub conscious: bool,
    pub breathing: bool,
    pub severe_bleeding: bool,
    pub serious_base_pathology: bool,
    pub disability: bool,
}

/// A finding that makes a medical call critical
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CriticalSignal {
    Unconscious,
    NotBreathing,
    SevereBleeding,
    SeriousBasePathology,
    Disability,
}

impl TriageAnswers {
    /// Conscious, breathing, and no other finding
    pub fn all_clear() -> Self {
        Self {
            conscious: true,
            breathing: true,
            severe_bleeding: false,
            serious_base_pathology: false,
            disability: false,
        }
    }

    /// Critical findings present in these answers, in question order
    pub fn critical_signals(&self) -> Vec<CriticalSignal> {
        let checks = [
            (!self.conscious, CriticalSignal::Unconscious),
            (!self.breathing, CriticalSignal::NotBreathing),
            (self.severe_bleeding, CriticalSignal::SevereBleeding),
            (self.serious_base_pathology, CriticalSignal::SeriousBasePathology),
            (self.disability, CriticalSignal::Disability),
        ];

        checks
            .into_iter()
            .filter_map(|(present, signal)| present.then_some(signal))
            .collect()
    }
}

impl CriticalSignal {
    pub fn label(&self) -> &'static str {
        match self {
            CriticalSignal::Unconscious => "NOT CONSCIOUS",
            CriticalSignal::NotBreathing => "NOT BREATHING",
            CriticalSignal::SevereBleeding => "SEVERE BLEEDING",
            CriticalSignal::SeriousBasePathology => "SERIOUS BASE PATHOLOGY",
            CriticalSignal::Disability => "DISABILITY",
        }
    }
}

impl std::fmt::Display for CriticalSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
