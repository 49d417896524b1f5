//! Test doubles shared by the engine's unit tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{
    Address, CallId, CallInput, CallRecord, CallSequence, CallerInfo, DeliveryAttempt,
    DestinationService, DispatchRecordBuilder, DomainError, EmergencyType, LocationClass,
    NotificationMessage, RoutingResolver, TriageAnswers,
};
use crate::ports::{CallRecordFilter, CallRecordRepository, DestinationDirectory, Messenger};

pub const DEMVA_PHONE: &str = "3515550001";
pub const TELEMEDICINE_PHONE: &str = "3515550002";
pub const CEC_PHONE: &str = "3515550003";
pub const FIRE_PHONE: &str = "3515550004";
pub const SUPERVISOR_PHONE: &str = "3515559999";

pub fn full_directory() -> DestinationDirectory {
    DestinationDirectory::new()
        .with_address(DestinationService::Demva, DEMVA_PHONE)
        .with_address(DestinationService::Telemedicine, TELEMEDICINE_PHONE)
        .with_address(DestinationService::Cec, CEC_PHONE)
        .with_address(DestinationService::FireDept, FIRE_PHONE)
        .with_address(DestinationService::Supervisor, SUPERVISOR_PHONE)
}

/// Valid input; medical calls get all-clear answers
pub fn call_input(emergency_type: EmergencyType, location_class: LocationClass) -> CallInput {
    CallInput {
        emergency_type,
        location_class,
        triage_answers: emergency_type
            .is_medical()
            .then(TriageAnswers::all_clear),
        declared_priority: None,
        caller: CallerInfo {
            name: "Ana".to_string(),
            surname: "Gómez".to_string(),
            phone: "3515123456".to_string(),
            national_id: None,
        },
        address: Address {
            street: "Av. Goycoechea".to_string(),
            number: Some("1200".to_string()),
            between_streets: None,
            neighborhood: Some("Centro".to_string()),
        },
        observations: Some("Caller is a neighbor".to_string()),
        operator: Some("operator-1".to_string()),
    }
}

pub fn build_record(emergency_type: EmergencyType, location_class: LocationClass) -> CallRecord {
    DispatchRecordBuilder::new(RoutingResolver::default(), Arc::new(CallSequence::new()))
        .build(call_input(emergency_type, location_class))
        .expect("valid test input")
}

pub enum Step {
    Deliver,
    Fail(&'static str),
    Hang,
    Panic,
}

/// Messenger that plays a per-address script; unscripted sends succeed
#[derive(Default)]
pub struct ScriptedMessenger {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    sent: Mutex<Vec<String>>,
    keys: Mutex<Vec<String>>,
    unconfigured: bool,
}

impl ScriptedMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails with a configuration error
    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Self::default()
        }
    }

    pub fn script(self, address: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(address.to_string(), steps.into());
        self
    }

    /// Addresses of every send, in call order
    pub fn sent_to(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Delivery keys of every send, in call order
    pub fn delivery_keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for ScriptedMessenger {
    async fn send(&self, address: &str, message: &NotificationMessage) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(address.to_string());
        self.keys.lock().unwrap().push(message.delivery_key.clone());
        if self.unconfigured {
            return Err(DomainError::Configuration(
                "messaging endpoint not configured".to_string(),
            ));
        }

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(address)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Step::Deliver);

        match step {
            Step::Deliver => Ok(()),
            Step::Fail(reason) => Err(DomainError::ExternalService(reason.to_string())),
            Step::Hang => std::future::pending().await,
            Step::Panic => panic!("messenger crashed sending to {}", address),
        }
    }

    async fn send_text(&self, address: &str, _text: &str) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(address.to_string());
        if self.unconfigured {
            return Err(DomainError::Configuration(
                "messaging endpoint not configured".to_string(),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(!self.unconfigured)
    }
}

/// In-memory store with switchable failures
#[derive(Default)]
pub struct InMemoryRepository {
    records: Mutex<HashMap<CallId, CallRecord>>,
    saves: AtomicUsize,
    pub fail_saves: AtomicBool,
    pub fail_appends: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self, id: CallId) -> Option<CallRecord> {
        self.records.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl CallRecordRepository for InMemoryRepository {
    async fn save(&self, record: &CallRecord) -> Result<CallId, DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("disk full".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(record.id)
    }

    async fn append_delivery_attempt(
        &self,
        id: CallId,
        attempt: &DeliveryAttempt,
    ) -> Result<(), DomainError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("connection reset".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("CallRecord", id))?;
        record.append_attempt(attempt.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CallId) -> Result<Option<CallRecord>, DomainError> {
        Ok(self.stored(id))
    }

    async fn find_recent(&self, filter: &CallRecordFilter) -> Result<Vec<CallRecord>, DomainError> {
        let mut records: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.id.cmp(&a.id));
        records.truncate(filter.limit as usize);
        Ok(records)
    }

    async fn last_id(&self) -> Result<Option<CallId>, DomainError> {
        Ok(self.records.lock().unwrap().keys().max().copied())
    }
}
