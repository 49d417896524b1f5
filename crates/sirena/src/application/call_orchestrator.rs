//! Call Orchestrator - One call, end to end
//!
//! build -> persist -> dispatch, recording each attempt as it is made.
//! Only invalid input and a failed save are errors; everything after the
//! save degrades to warnings on the outcome.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::NotificationDispatcher;
use crate::domain::entities::{CallId, CallInput, CallRecord};
use crate::domain::errors::{CallWarning, DomainError};
use crate::domain::services::DispatchRecordBuilder;
use crate::domain::value_objects::CallState;
use crate::ports::{CallRecordRepository, Messenger};

/// Result of handling one call
#[derive(Debug, Clone, Serialize)]
pub struct CallOutcome {
    pub record: CallRecord,
    pub state: CallState,
    pub warnings: Vec<CallWarning>,
}

pub struct CallOrchestrator<R: CallRecordRepository, M: Messenger + 'static> {
    builder: DispatchRecordBuilder,
    repo: Arc<R>,
    dispatcher: NotificationDispatcher<M>,
}

impl<R: CallRecordRepository, M: Messenger + 'static> CallOrchestrator<R, M> {
    pub fn new(
        builder: DispatchRecordBuilder,
        repo: Arc<R>,
        dispatcher: NotificationDispatcher<M>,
    ) -> Self {
        Self {
            builder,
            repo,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher<M> {
        &self.dispatcher
    }

    pub async fn handle_call(&self, input: CallInput) -> Result<CallOutcome, DomainError> {
        let mut state = CallState::Received;

        let record = self.builder.build(input)?;
        advance(&mut state, CallState::Classified);
        advance(&mut state, CallState::Routed);
        tracing::info!(
            call_id = %record.id,
            emergency_type = %record.emergency_type,
            priority = %record.priority,
            primary = %record.primary_destination,
            "Call classified and routed"
        );

        let id = self.repo.save(&record).await?;
        advance(&mut state, CallState::Persisted);

        // Attempts are stored as they happen, so a call cancelled mid-dispatch
        // keeps every attempt already made
        let (report, mut reported) = mpsc::unbounded_channel();
        let record_attempts = async {
            let mut warnings = Vec::new();
            while let Some(attempt) = reported.recv().await {
                if let Err(e) = self.repo.append_delivery_attempt(id, &attempt).await {
                    tracing::error!(
                        call_id = %id,
                        destination = %attempt.destination,
                        attempt = attempt.attempt_number,
                        "Failed to record delivery attempt: {}",
                        e
                    );
                    warnings.push(CallWarning::DeliveryNotRecorded {
                        destination: attempt.destination,
                        attempt_number: attempt.attempt_number,
                        reason: e.to_string(),
                    });
                }
            }
            warnings
        };
        let (record, mut warnings) = tokio::join!(
            self.dispatcher.dispatch_reporting(record, report),
            record_attempts
        );

        let failed = record.failed_destinations();
        if !failed.is_empty() {
            let warning = if failed.len() == record.destinations().len() {
                CallWarning::NotificationFailure { failed }
            } else {
                CallWarning::PartialNotificationFailure { failed }
            };
            tracing::warn!(call_id = %id, "{}", warning);
            warnings.push(warning);
        }

        let terminal = if warnings.is_empty() {
            CallState::Notified
        } else {
            CallState::NotifiedWithWarnings
        };
        advance(&mut state, terminal);
        tracing::info!(call_id = %id, %state, "📟 Call handled");

        Ok(CallOutcome {
            record,
            state,
            warnings,
        })
    }

    pub async fn find_call(&self, id: CallId) -> Result<CallRecord, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("CallRecord", id))
    }
}

fn advance(state: &mut CallState, next: CallState) {
    debug_assert!(state.can_advance_to(next), "{} -> {}", state, next);
    *state = next;
}
