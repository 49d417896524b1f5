//! Triage Evaluator - Medical answers to priority
//!
//! Any critical finding makes the call RED. No current rule yields
//! YELLOW; it stays reachable only through operator escalation.

use crate::domain::entities::TriageAnswers;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::Priority;

/// Baseline priority for every non-medical call
pub const NON_MEDICAL_PRIORITY: Priority = Priority::Green;

#[derive(Debug, Clone, Copy, Default)]
pub struct TriageEvaluator;

impl TriageEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, answers: &TriageAnswers) -> Priority {
        if answers.critical_signals().is_empty() {
            Priority::Green
        } else {
            Priority::Red
        }
    }

    /// Evaluate the answers of a medical call, which must be present
    pub fn evaluate_required(&self, answers: Option<&TriageAnswers>) -> Result<Priority, DomainError> {
        answers
            .map(|a| self.evaluate(a))
            .ok_or_else(|| DomainError::invalid_input("medical calls require triage answers"))
    }
}
