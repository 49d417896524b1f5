//! Notification Dispatcher
//!
//! Delivers a call's notification to its primary service and the
//! supervisor. Each destination runs in its own task with sequential,
//! backed-off retries; the task group is joined against an overall
//! deadline.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{self, JoinSet};
use tokio::time::Instant;

use crate::domain::entities::{
    CallRecord, DeliveryAttempt, NotificationMessage, DELIVERY_TASK_FAILED, TIMEOUT,
    UNCONFIGURED_DESTINATION,
};
use crate::domain::value_objects::DestinationService;
use crate::ports::{DispatchConfig, Messenger, RetryPolicy};

/// Wall-clock time anchored at dispatch start, advanced by the monotonic clock
#[derive(Debug, Clone, Copy)]
struct DispatchClock {
    wall: DateTime<Utc>,
    started: Instant,
}

impl DispatchClock {
    fn start() -> Self {
        Self {
            wall: Utc::now(),
            started: Instant::now(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.wall + elapsed
    }
}

/// Everything one destination task owns
struct DeliveryJob<M> {
    messenger: Arc<M>,
    policy: RetryPolicy,
    destination: DestinationService,
    address: String,
    message: NotificationMessage,
    clock: DispatchClock,
    attempts: mpsc::UnboundedSender<DeliveryAttempt>,
}

/// Attempts gathered during one dispatch, grouped by destination
struct AttemptLog {
    by_destination: HashMap<DestinationService, Vec<DeliveryAttempt>>,
    report: mpsc::UnboundedSender<DeliveryAttempt>,
}

impl AttemptLog {
    fn new(report: mpsc::UnboundedSender<DeliveryAttempt>) -> Self {
        Self {
            by_destination: HashMap::new(),
            report,
        }
    }

    fn push(&mut self, attempt: DeliveryAttempt) {
        // Nobody listening is fine
        let _ = self.report.send(attempt.clone());
        self.by_destination
            .entry(attempt.destination)
            .or_default()
            .push(attempt);
    }

    /// Record the FAILURE that ends a destination nobody finished
    fn close(&mut self, destination: DestinationService, at: DateTime<Utc>, detail: &str) {
        let made = self
            .by_destination
            .get(&destination)
            .map_or(0, Vec::len);
        self.push(DeliveryAttempt::failure(
            destination,
            made as u32 + 1,
            at,
            detail,
        ));
    }

    fn take(&mut self, destination: DestinationService) -> Vec<DeliveryAttempt> {
        self.by_destination.remove(&destination).unwrap_or_default()
    }
}

/// How the delivery tasks of one dispatch ended
#[derive(Default)]
struct JoinReport {
    /// Tasks that panicked
    crashed: Vec<DestinationService>,
    /// Tasks aborted when the deadline passed
    timed_out: Vec<DestinationService>,
}

pub struct NotificationDispatcher<M: Messenger + 'static> {
    messenger: Arc<M>,
    config: Arc<DispatchConfig>,
}

impl<M: Messenger + 'static> NotificationDispatcher<M> {
    pub fn new(messenger: Arc<M>, config: Arc<DispatchConfig>) -> Self {
        Self { messenger, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Notify every destination of the record and append the attempts
    ///
    /// Never fails: exhausted retries, timeouts and missing addresses
    /// are recorded as FAILURE attempts.
    pub async fn dispatch(&self, record: CallRecord) -> CallRecord {
        let (report, _) = mpsc::unbounded_channel();
        self.dispatch_reporting(record, report).await
    }

    /// Same as [`dispatch`](Self::dispatch), also sending every attempt to
    /// `report` as soon as it is made
    ///
    /// Dropping the returned future aborts the deliveries still running;
    /// attempts already reported stay reported.
    pub async fn dispatch_reporting(
        &self,
        mut record: CallRecord,
        report: mpsc::UnboundedSender<DeliveryAttempt>,
    ) -> CallRecord {
        let clock = DispatchClock::start();
        let message = NotificationMessage::from_record(&record);
        let destinations = record.destinations();

        let mut log = AttemptLog::new(report);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();
        let mut running = HashMap::new();

        for destination in destinations.iter().copied() {
            let Some(address) = self.config.directory.address_for(destination) else {
                tracing::warn!(
                    call_id = %record.id,
                    %destination,
                    "No address configured, destination not notified"
                );
                log.push(DeliveryAttempt::failure(
                    destination,
                    1,
                    clock.now(),
                    UNCONFIGURED_DESTINATION,
                ));
                continue;
            };

            let handle = tasks.spawn(deliver_with_retry(DeliveryJob {
                messenger: Arc::clone(&self.messenger),
                policy: self.config.retry,
                destination,
                address: address.to_string(),
                message: message.for_destination(destination),
                clock,
                attempts: tx.clone(),
            }));
            running.insert(handle.id(), destination);
        }
        drop(tx);

        let ended = self
            .join_until_deadline(&mut tasks, running, &mut rx, &mut log)
            .await;

        for destination in destinations.iter().copied() {
            let detail = if ended.crashed.contains(&destination) {
                DELIVERY_TASK_FAILED
            } else if ended.timed_out.contains(&destination) {
                TIMEOUT
            } else {
                continue;
            };
            tracing::warn!(
                call_id = %record.id,
                %destination,
                detail,
                "Destination still pending when dispatch ended"
            );
            log.close(destination, clock.now(), detail);
        }

        for destination in destinations {
            for attempt in log.take(destination) {
                record.append_attempt(attempt);
            }
        }

        record
    }

    /// Collect attempts and join delivery tasks until every task has
    /// ended or the deadline has passed and the rest are aborted
    async fn join_until_deadline(
        &self,
        tasks: &mut JoinSet<DestinationService>,
        mut running: HashMap<task::Id, DestinationService>,
        attempts: &mut mpsc::UnboundedReceiver<DeliveryAttempt>,
        log: &mut AttemptLog,
    ) -> JoinReport {
        let deadline = tokio::time::sleep(self.config.dispatch_deadline);
        tokio::pin!(deadline);
        let mut report = JoinReport::default();
        let mut aborted = false;

        // Senders live inside the tasks, so the channel closes once all have ended
        loop {
            tokio::select! {
                Some(attempt) = attempts.recv() => log.push(attempt),
                Some(joined) = tasks.join_next_with_id() => match joined {
                    Ok((id, _)) => {
                        running.remove(&id);
                    }
                    Err(e) if e.is_panic() => {
                        if let Some(destination) = running.remove(&e.id()) {
                            tracing::error!(%destination, "Delivery task failed: {}", e);
                            report.crashed.push(destination);
                        }
                    }
                    // Aborted; stays in `running`
                    Err(_) => {}
                },
                _ = &mut deadline, if !aborted && !tasks.is_empty() => {
                    tracing::warn!(
                        "Dispatch deadline of {:?} reached, aborting {} pending deliveries",
                        self.config.dispatch_deadline,
                        tasks.len()
                    );
                    tasks.abort_all();
                    aborted = true;
                }
                else => break,
            }
        }

        report.timed_out = running.into_values().collect();
        report
    }
}

/// Deliver to one destination, retrying with exponential backoff.
/// This task is the only writer of its destination's attempts.
async fn deliver_with_retry<M: Messenger + 'static>(job: DeliveryJob<M>) -> DestinationService {
    let DeliveryJob {
        messenger,
        policy,
        destination,
        address,
        message,
        clock,
        attempts,
    } = job;

    for attempt_number in 1..=policy.max_attempts {
        if attempt_number > 1 {
            let delay = policy.backoff_for(attempt_number - 1);
            tracing::debug!(%destination, attempt = attempt_number, "Backing off for {:?}", delay);
            tokio::time::sleep(delay).await;
        }

        let attempted_at = clock.now();
        let result =
            tokio::time::timeout(policy.attempt_timeout, messenger.send(&address, &message)).await;

        let (attempt, retryable) = match result {
            Ok(Ok(())) => (
                DeliveryAttempt::success(destination, attempt_number, attempted_at),
                false,
            ),
            Ok(Err(e)) => (
                DeliveryAttempt::failure(destination, attempt_number, attempted_at, e.to_string()),
                e.is_retryable(),
            ),
            Err(_) => (
                DeliveryAttempt::failure(destination, attempt_number, attempted_at, TIMEOUT),
                true,
            ),
        };
        let delivered = attempt.is_success();

        if attempts.send(attempt).is_err() {
            // Dispatcher is gone (call cancelled)
            return destination;
        }

        if delivered {
            tracing::info!(
                call_id = %message.call_id,
                %destination,
                attempt = attempt_number,
                "Notification delivered via {}",
                messenger.name()
            );
            return destination;
        }

        if !retryable {
            tracing::error!(
                call_id = %message.call_id,
                %destination,
                attempt = attempt_number,
                "Notification failed permanently, not retrying"
            );
            return destination;
        }

        tracing::warn!(
            call_id = %message.call_id,
            %destination,
            attempt = attempt_number,
            max_attempts = policy.max_attempts,
            "Notification attempt failed"
        );
    }

    tracing::error!(
        call_id = %message.call_id,
        %destination,
        "Notification retries exhausted"
    );
    destination
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DeliveryOutcome;
    use crate::domain::value_objects::{EmergencyType, LocationClass};
    use crate::ports::DestinationDirectory;
    use crate::testing::{build_record, full_directory, ScriptedMessenger, Step, CEC_PHONE, SUPERVISOR_PHONE};
    use std::time::Duration;

    fn details(record: &CallRecord, destination: DestinationService) -> Vec<Option<String>> {
        record
            .attempts_for(destination)
            .map(|a| a.error_detail.clone())
            .collect()
    }

    fn dispatcher(
        messenger: ScriptedMessenger,
        config: DispatchConfig,
    ) -> (NotificationDispatcher<ScriptedMessenger>, Arc<ScriptedMessenger>) {
        let messenger = Arc::new(messenger);
        (
            NotificationDispatcher::new(Arc::clone(&messenger), Arc::new(config)),
            messenger,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_destination_fails_once_without_retry() {
        let directory = DestinationDirectory::new().with_address(DestinationService::Supervisor, SUPERVISOR_PHONE);
        let (dispatcher, messenger) = dispatcher(ScriptedMessenger::new(), DispatchConfig::new(directory));

        let record = build_record(EmergencyType::Medical, LocationClass::PublicRoad);
        let record = dispatcher.dispatch(record).await;

        let cec: Vec<_> = record.attempts_for(DestinationService::Cec).collect();
        assert_eq!(cec.len(), 1);
        assert_eq!(cec[0].outcome, DeliveryOutcome::Failure);
        assert_eq!(cec[0].error_detail.as_deref(), Some(UNCONFIGURED_DESTINATION));
        assert_eq!(messenger.sent_to(), vec![SUPERVISOR_PHONE.to_string()]);
        assert!(record.delivered_to(DestinationService::Supervisor));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_twice_then_succeed_respects_backoff() {
        let messenger = ScriptedMessenger::new().script(
            CEC_PHONE,
            vec![Step::Fail("busy"), Step::Fail("busy"), Step::Deliver],
        );
        let (dispatcher, _) = dispatcher(messenger, DispatchConfig::new(full_directory()));

        let record = build_record(EmergencyType::Medical, LocationClass::PublicRoad);
        let record = dispatcher.dispatch(record).await;

        let cec: Vec<_> = record.attempts_for(DestinationService::Cec).collect();
        let outcomes: Vec<_> = cec.iter().map(|a| a.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                DeliveryOutcome::Failure,
                DeliveryOutcome::Failure,
                DeliveryOutcome::Success
            ]
        );
        assert_eq!(
            cec.iter().map(|a| a.attempt_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(cec[1].timestamp - cec[0].timestamp >= chrono::Duration::seconds(1));
        assert!(cec[2].timestamp - cec[1].timestamp >= chrono::Duration::seconds(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_are_recorded_not_raised() {
        let messenger = ScriptedMessenger::new().script(
            CEC_PHONE,
            vec![Step::Fail("down"), Step::Fail("down"), Step::Fail("down"), Step::Deliver],
        );
        let (dispatcher, _) = dispatcher(messenger, DispatchConfig::new(full_directory()));

        let record = dispatcher
            .dispatch(build_record(EmergencyType::Medical, LocationClass::PublicRoad))
            .await;

        assert_eq!(record.attempts_for(DestinationService::Cec).count(), 3);
        assert_eq!(record.failed_destinations(), vec![DestinationService::Cec]);
        let detail = record.notification_outcomes[0].error_detail.clone().unwrap();
        assert!(detail.contains("down"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_endpoint_times_out_each_attempt() {
        let messenger = ScriptedMessenger::new()
            .script(CEC_PHONE, vec![Step::Hang, Step::Hang, Step::Hang]);
        let (dispatcher, _) = dispatcher(messenger, DispatchConfig::new(full_directory()));

        let record = dispatcher
            .dispatch(build_record(EmergencyType::Medical, LocationClass::PublicRoad))
            .await;

        let cec: Vec<_> = record.attempts_for(DestinationService::Cec).collect();
        assert_eq!(cec.len(), 3);
        assert!(cec
            .iter()
            .all(|a| a.error_detail.as_deref() == Some(TIMEOUT)));
        assert!(record.delivered_to(DestinationService::Supervisor));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_converts_pending_destination_to_timeout() {
        let messenger = ScriptedMessenger::new().script(CEC_PHONE, vec![Step::Hang]);
        let config = DispatchConfig {
            dispatch_deadline: Duration::from_secs(3),
            ..DispatchConfig::new(full_directory())
        };
        let (dispatcher, _) = dispatcher(messenger, config);

        let record = dispatcher
            .dispatch(build_record(EmergencyType::Medical, LocationClass::PublicRoad))
            .await;

        let cec: Vec<_> = record.attempts_for(DestinationService::Cec).collect();
        assert_eq!(cec.len(), 1);
        assert_eq!(cec[0].attempt_number, 1);
        assert_eq!(cec[0].error_detail.as_deref(), Some(TIMEOUT));
        assert!(record.delivered_to(DestinationService::Supervisor));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_ordered_primary_then_supervisor() {
        let messenger = ScriptedMessenger::new()
            .script(CEC_PHONE, vec![Step::Fail("busy"), Step::Deliver]);
        let (dispatcher, _) = dispatcher(messenger, DispatchConfig::new(full_directory()));

        let record = dispatcher
            .dispatch(build_record(EmergencyType::Medical, LocationClass::PublicRoad))
            .await;

        let order: Vec<_> = record
            .notification_outcomes
            .iter()
            .map(|a| (a.destination, a.attempt_number))
            .collect();
        assert_eq!(
            order,
            vec![
                (DestinationService::Cec, 1),
                (DestinationService::Cec, 2),
                (DestinationService::Supervisor, 1),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_messenger_fails_once_per_destination() {
        let (dispatcher, messenger) =
            dispatcher(ScriptedMessenger::unconfigured(), DispatchConfig::new(full_directory()));
        let started = Instant::now();

        let record = dispatcher
            .dispatch(build_record(EmergencyType::Medical, LocationClass::PublicRoad))
            .await;

        assert_eq!(record.notification_outcomes.len(), 2);
        assert!(record
            .notification_outcomes
            .iter()
            .all(|a| a.attempt_number == 1 && !a.is_success()));
        let detail = record.notification_outcomes[0].error_detail.clone().unwrap();
        assert!(detail.contains("not configured"));
        assert_eq!(messenger.sent_to().len(), 2);
        // No backoff was slept
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicked_task_is_recorded_as_task_failure() {
        let messenger = ScriptedMessenger::new().script(CEC_PHONE, vec![Step::Fail("busy"), Step::Panic]);
        let (dispatcher, _) = dispatcher(messenger, DispatchConfig::new(full_directory()));

        let record = dispatcher
            .dispatch(build_record(EmergencyType::Medical, LocationClass::PublicRoad))
            .await;

        let cec: Vec<_> = record.attempts_for(DestinationService::Cec).collect();
        assert_eq!(cec.len(), 2);
        assert_eq!(cec[0].error_detail.as_deref(), Some("External service error: busy"));
        assert_eq!(cec[1].attempt_number, 2);
        assert_eq!(cec[1].error_detail.as_deref(), Some(DELIVERY_TASK_FAILED));
        assert!(record.delivered_to(DestinationService::Supervisor));
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_panicking_before_deadline_is_not_a_timeout() {
        let messenger = ScriptedMessenger::new()
            .script(CEC_PHONE, vec![Step::Panic])
            .script(SUPERVISOR_PHONE, vec![Step::Hang]);
        let config = DispatchConfig {
            dispatch_deadline: Duration::from_secs(3),
            ..DispatchConfig::new(full_directory())
        };
        let (dispatcher, _) = dispatcher(messenger, config);

        let record = dispatcher
            .dispatch(build_record(EmergencyType::Medical, LocationClass::PublicRoad))
            .await;

        assert_eq!(
            details(&record, DestinationService::Cec),
            vec![Some(DELIVERY_TASK_FAILED.to_string())]
        );
        assert_eq!(
            details(&record, DestinationService::Supervisor),
            vec![Some(TIMEOUT.to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_are_reported_as_they_are_made() {
        let directory = DestinationDirectory::new().with_address(DestinationService::Supervisor, SUPERVISOR_PHONE);
        let messenger = ScriptedMessenger::new().script(SUPERVISOR_PHONE, vec![Step::Fail("busy")]);
        let (dispatcher, _) = dispatcher(messenger, DispatchConfig::new(directory));
        let (report, mut reported) = mpsc::unbounded_channel();

        let record = dispatcher
            .dispatch_reporting(build_record(EmergencyType::Medical, LocationClass::PublicRoad), report)
            .await;

        let mut seen = Vec::new();
        while let Some(attempt) = reported.recv().await {
            seen.push(attempt);
        }
        assert_eq!(seen.len(), record.notification_outcomes.len());
        assert!(seen.iter().all(|a| record.notification_outcomes.contains(a)));
        assert_eq!(seen[0].error_detail.as_deref(), Some(UNCONFIGURED_DESTINATION));
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_destination_gets_its_own_delivery_key() {
        let messenger = ScriptedMessenger::new().script(CEC_PHONE, vec![Step::Fail("busy"), Step::Deliver]);
        let (dispatcher, messenger) = dispatcher(messenger, DispatchConfig::new(full_directory()));

        dispatcher
            .dispatch(build_record(EmergencyType::Medical, LocationClass::PublicRoad))
            .await;

        let sends: Vec<_> = messenger
            .sent_to()
            .into_iter()
            .zip(messenger.delivery_keys())
            .collect();
        let key_for = |phone: &str| -> Vec<String> {
            sends
                .iter()
                .filter(|(to, _)| to == phone)
                .map(|(_, key)| key.clone())
                .collect()
        };

        let cec = key_for(CEC_PHONE);
        let supervisor = key_for(SUPERVISOR_PHONE);
        assert_eq!(cec.len(), 2);
        assert_eq!(cec[0], cec[1]);
        assert_eq!(supervisor.len(), 1);
        assert_ne!(cec[0], supervisor[0]);
    }
}
