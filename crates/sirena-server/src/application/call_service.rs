//! Call Application Service
//!
//! Intake, lookup and listing of calls, plus dispatch readiness.

use std::sync::Arc;

use sirena::{
    CallId, CallInput, CallOrchestrator, CallOutcome, CallRecord, CallRecordFilter, CallRecordRepository,
    CallState, DestinationService, DomainError, Messenger,
};

use crate::models::{DestinationStatus, DispatchStatusResponse};

/// Application service for call operations
pub struct CallService<R: CallRecordRepository, M: Messenger + 'static> {
    orchestrator: CallOrchestrator<R, M>,
    repo: Arc<R>,
    messenger: Arc<M>,
}

impl<R: CallRecordRepository, M: Messenger + 'static> CallService<R, M> {
    pub fn new(orchestrator: CallOrchestrator<R, M>, repo: Arc<R>, messenger: Arc<M>) -> Self {
        Self {
            orchestrator,
            repo,
            messenger,
        }
    }

    /// Handle a new call end to end
    pub async fn handle_call(&self, input: CallInput) -> Result<CallOutcome, DomainError> {
        let outcome = self.orchestrator.handle_call(input).await?;

        if outcome.state == CallState::NotifiedWithWarnings {
            tracing::warn!(
                call_id = %outcome.record.id,
                warnings = outcome.warnings.len(),
                "Call notified with warnings"
            );
        }

        Ok(outcome)
    }

    pub async fn get_call(&self, id: CallId) -> Result<CallRecord, DomainError> {
        self.orchestrator.find_call(id).await
    }

    /// Most recent calls first
    pub async fn list_calls(&self, filter: &CallRecordFilter) -> Result<Vec<CallRecord>, DomainError> {
        self.repo.find_recent(filter).await
    }

    pub async fn dispatch_status(&self) -> Result<DispatchStatusResponse, DomainError> {
        let config = self.orchestrator.dispatcher().config();
        let endpoint_ready = self.messenger.health_check().await?;

        let destinations = DestinationService::ALL
            .into_iter()
            .map(|destination| DestinationStatus {
                destination: destination.to_string(),
                config_key: destination.config_key().to_string(),
                configured: config.directory.is_configured(destination),
            })
            .collect();

        Ok(DispatchStatusResponse {
            endpoint: self.messenger.name().to_string(),
            endpoint_ready,
            destinations,
            max_attempts: config.retry.max_attempts,
            attempt_timeout_ms: duration_ms(config.retry.attempt_timeout),
            dispatch_deadline_ms: duration_ms(config.dispatch_deadline),
        })
    }
}

fn duration_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
