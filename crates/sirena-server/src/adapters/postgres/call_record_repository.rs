//! PostgreSQL implementation of CallRecordRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::str::FromStr;

use sirena::{
    Address, CallId, CallRecord, CallRecordFilter, CallRecordRepository, CallerInfo,
    DeliveryAttempt, DomainError, TriageAnswers,
};

/// PostgreSQL implementation of CallRecordRepository
pub struct PgCallRecordRepository {
    pool: PgPool,
}

impl PgCallRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_attempt(
        tx: &mut Transaction<'_, Postgres>,
        id: CallId,
        attempt: &DeliveryAttempt,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO delivery_attempts
                (call_id, destination, attempt_number, attempted_at, outcome, error_detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id.0)
        .bind(attempt.destination.to_string())
        .bind(attempt.attempt_number as i32)
        .bind(attempt.timestamp)
        .bind(attempt.outcome.to_string())
        .bind(&attempt.error_detail)
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    /// Attempts for the given calls, grouped by call, in insertion order
    async fn attempts_for(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, Vec<DeliveryAttempt>>, DomainError> {
        let rows = sqlx::query_as::<_, DeliveryAttemptRow>(
            r#"
            SELECT call_id, destination, attempt_number, attempted_at, outcome, error_detail
            FROM delivery_attempts
            WHERE call_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        let mut grouped: HashMap<i64, Vec<DeliveryAttempt>> = HashMap::new();
        for row in rows {
            let call_id = row.call_id;
            grouped.entry(call_id).or_default().push(row.try_into()?);
        }
        Ok(grouped)
    }

    async fn with_attempts(&self, rows: Vec<CallRecordRow>) -> Result<Vec<CallRecord>, DomainError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut attempts = self.attempts_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let mut record = CallRecord::try_from(row)?;
                record.notification_outcomes = attempts.remove(&record.id.0).unwrap_or_default();
                Ok(record)
            })
            .collect()
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct CallRecordRow {
    id: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    emergency_type: String,
    location_class: String,
    triage_answers: Option<serde_json::Value>,
    priority: String,
    primary_destination: String,
    caller: serde_json::Value,
    address: serde_json::Value,
    observations: Option<String>,
    operator: Option<String>,
}

#[derive(sqlx::FromRow)]
struct DeliveryAttemptRow {
    call_id: i64,
    destination: String,
    attempt_number: i32,
    attempted_at: chrono::DateTime<chrono::Utc>,
    outcome: String,
    error_detail: Option<String>,
}

fn parse_column<T: FromStr<Err = String>>(value: &str) -> Result<T, DomainError> {
    value.parse().map_err(DomainError::Repository)
}

fn json_column<T: serde::de::DeserializeOwned>(
    column: &str,
    value: serde_json::Value,
) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Repository(format!("Invalid {} JSON: {}", column, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::Repository(e.to_string()))
}

impl TryFrom<CallRecordRow> for CallRecord {
    type Error = DomainError;

    fn try_from(row: CallRecordRow) -> Result<Self, Self::Error> {
        let triage_answers: Option<TriageAnswers> = row
            .triage_answers
            .map(|value| json_column("triage_answers", value))
            .transpose()?;
        let caller: CallerInfo = json_column("caller", row.caller)?;
        let address: Address = json_column("address", row.address)?;

        Ok(Self {
            id: CallId(row.id),
            timestamp: row.created_at,
            emergency_type: parse_column(&row.emergency_type)?,
            location_class: parse_column(&row.location_class)?,
            triage_answers,
            priority: parse_column(&row.priority)?,
            primary_destination: parse_column(&row.primary_destination)?,
            caller,
            address,
            observations: row.observations,
            operator: row.operator,
            notification_outcomes: Vec::new(),
        })
    }
}

impl TryFrom<DeliveryAttemptRow> for DeliveryAttempt {
    type Error = DomainError;

    fn try_from(row: DeliveryAttemptRow) -> Result<Self, Self::Error> {
        Ok(Self {
            destination: parse_column(&row.destination)?,
            attempt_number: u32::try_from(row.attempt_number)
                .map_err(|e| DomainError::Repository(e.to_string()))?,
            timestamp: row.attempted_at,
            outcome: parse_column(&row.outcome)?,
            error_detail: row.error_detail,
        })
    }
}

#[async_trait]
impl CallRecordRepository for PgCallRecordRepository {
    async fn save(&self, record: &CallRecord) -> Result<CallId, DomainError> {
        let triage_answers = record.triage_answers.as_ref().map(to_json).transpose()?;
        let caller = to_json(&record.caller)?;
        let address = to_json(&record.address)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO call_records
                (id, created_at, emergency_type, location_class, triage_answers, priority,
                 primary_destination, caller, address, observations, operator)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id.0)
        .bind(record.timestamp)
        .bind(record.emergency_type.to_string())
        .bind(record.location_class.to_string())
        .bind(triage_answers)
        .bind(record.priority.to_string())
        .bind(record.primary_destination.to_string())
        .bind(caller)
        .bind(address)
        .bind(&record.observations)
        .bind(&record.operator)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        for attempt in &record.notification_outcomes {
            Self::insert_attempt(&mut tx, record.id, attempt).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(record.id)
    }

    async fn append_delivery_attempt(
        &self,
        id: CallId,
        attempt: &DeliveryAttempt,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Self::insert_attempt(&mut tx, id, attempt).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))
    }

    async fn find_by_id(&self, id: CallId) -> Result<Option<CallRecord>, DomainError> {
        let row = sqlx::query_as::<_, CallRecordRow>("SELECT * FROM call_records WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        match row {
            Some(row) => Ok(self.with_attempts(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_recent(&self, filter: &CallRecordFilter) -> Result<Vec<CallRecord>, DomainError> {
        let rows = sqlx::query_as::<_, CallRecordRow>(
            r#"
            SELECT * FROM call_records
            WHERE ($1::TEXT IS NULL OR emergency_type = $1)
              AND ($2::TEXT IS NULL OR priority = $2)
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(filter.emergency_type.map(|t| t.to_string()))
        .bind(filter.priority.map(|p| p.to_string()))
        .bind(i64::from(filter.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        self.with_attempts(rows).await
    }

    async fn last_id(&self) -> Result<Option<CallId>, DomainError> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(id) FROM call_records")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(max.map(CallId))
    }
}
