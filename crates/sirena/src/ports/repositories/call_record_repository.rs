//! CallRecord Repository Port
//!
//! Abstract interface for the persistent call record store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{CallId, CallRecord, DeliveryAttempt};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{EmergencyType, Priority};

/// Filter for listing recent calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecordFilter {
    pub emergency_type: Option<EmergencyType>,
    pub priority: Option<Priority>,
    pub limit: u32,
}

impl Default for CallRecordFilter {
    fn default() -> Self {
        Self {
            emergency_type: None,
            priority: None,
            limit: 50,
        }
    }
}

impl CallRecordFilter {
    pub fn matches(&self, record: &CallRecord) -> bool {
        self.emergency_type
            .map_or(true, |t| record.emergency_type == t)
            && self.priority.map_or(true, |p| record.priority == p)
    }
}

/// Repository interface for CallRecord entities
///
/// Implementations must be durable and atomic per call.
#[async_trait]
pub trait CallRecordRepository: Send + Sync {
    /// Persist a new call record, including any attempts it already carries
    async fn save(&self, record: &CallRecord) -> Result<CallId, DomainError>;

    /// Append one delivery attempt to a stored record
    async fn append_delivery_attempt(
        &self,
        id: CallId,
        attempt: &DeliveryAttempt,
    ) -> Result<(), DomainError>;

    /// Find a call record by ID, with its delivery attempts
    async fn find_by_id(&self, id: CallId) -> Result<Option<CallRecord>, DomainError>;

    /// Most recent calls first
    async fn find_recent(&self, filter: &CallRecordFilter) -> Result<Vec<CallRecord>, DomainError>;

    /// Highest id in the store, used to seed the call sequence
    async fn last_id(&self) -> Result<Option<CallId>, DomainError>;
}
