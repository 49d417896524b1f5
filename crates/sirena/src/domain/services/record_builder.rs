//! Dispatch Record Builder - Operator input to CallRecord
//!
//! Validates the input, classifies, routes, and stamps id and time.
//! Pure construction: no network or storage I/O.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use super::{RoutingResolver, TriageEvaluator, NON_MEDICAL_PRIORITY};
use crate::domain::entities::{CallId, CallInput, CallRecord};
use crate::domain::errors::DomainError;

/// Monotonic call id source, shared by every builder of a process
#[derive(Debug, Default)]
pub struct CallSequence {
    last: AtomicI64,
}

impl CallSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after an id already used by the store
    pub fn starting_after(last: Option<CallId>) -> Self {
        Self {
            last: AtomicI64::new(last.map(|id| id.0).unwrap_or(0)),
        }
    }

    pub fn next_id(&self) -> CallId {
        CallId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

pub struct DispatchRecordBuilder {
    evaluator: TriageEvaluator,
    resolver: RoutingResolver,
    sequence: Arc<CallSequence>,
}

impl DispatchRecordBuilder {
    pub fn new(resolver: RoutingResolver, sequence: Arc<CallSequence>) -> Self {
        Self {
            evaluator: TriageEvaluator::new(),
            resolver,
            sequence,
        }
    }

    pub fn build(&self, input: CallInput) -> Result<CallRecord, DomainError> {
        if input.address.street.trim().is_empty() {
            return Err(DomainError::invalid_input("address street is required"));
        }

        let triage_answers = if input.emergency_type.is_medical() {
            input.triage_answers
        } else {
            if input.triage_answers.is_some() {
                tracing::debug!(
                    "Discarding triage answers on {} call",
                    input.emergency_type
                );
            }
            None
        };

        let computed = if input.emergency_type.is_medical() {
            self.evaluator.evaluate_required(triage_answers.as_ref())?
        } else {
            NON_MEDICAL_PRIORITY
        };

        let priority = match input.declared_priority {
            Some(declared) => computed.escalate(declared),
            None => computed,
        };

        let route = self
            .resolver
            .resolve(input.emergency_type, input.location_class, priority)?;

        Ok(CallRecord {
            id: self.sequence.next_id(),
            timestamp: Utc::now(),
            emergency_type: input.emergency_type,
            location_class: input.location_class,
            triage_answers,
            priority,
            primary_destination: route.primary,
            caller: input.caller,
            address: input.address,
            observations: input.observations,
            operator: input.operator,
            notification_outcomes: Vec::new(),
        })
    }
}
