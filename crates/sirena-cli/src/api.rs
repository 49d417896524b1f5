//! Sirena API Client

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// API Client for Sirena
pub struct SirenaClient {
    client: Client,
    base_url: String,
    api_key: String,
}

// ============================================
// API Request / Response Types
// ============================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Triage {
    pub conscious: bool,
    pub breathing: bool,
    pub severe_bleeding: bool,
    pub serious_base_pathology: bool,
    pub disability: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub national_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: Option<String>,
    pub between_streets: Option<String>,
    pub neighborhood: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCallRequest {
    pub emergency_type: String,
    pub location_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triage: Option<Triage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_priority: Option<String>,
    pub caller: Caller,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryAttemptResponse {
    pub destination: String,
    pub attempt_number: u32,
    pub timestamp: DateTime<Utc>,
    pub outcome: String,
    pub error_detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallResponse {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub emergency_type: String,
    pub location_class: String,
    pub priority: String,
    pub primary_destination: String,
    pub triage: Option<Triage>,
    pub caller: Caller,
    pub address_text: String,
    pub observations: Option<String>,
    pub operator: Option<String>,
    pub attempts: Vec<DeliveryAttemptResponse>,
}

#[derive(Debug, Deserialize)]
pub struct WarningResponse {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct HandleCallResponse {
    pub state: String,
    pub call: CallResponse,
    pub warnings: Vec<WarningResponse>,
}

#[derive(Debug, Deserialize)]
pub struct DestinationStatus {
    pub destination: String,
    pub config_key: String,
    pub configured: bool,
}

#[derive(Debug, Deserialize)]
pub struct DispatchStatusResponse {
    pub endpoint: String,
    pub endpoint_ready: bool,
    pub destinations: Vec<DestinationStatus>,
    pub max_attempts: u32,
    pub attempt_timeout_ms: u64,
    pub dispatch_deadline_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ManualMessageRequest {
    pub phone: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageSentResponse {
    pub endpoint: String,
    pub to: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Query string for the call list endpoint
pub fn list_query(emergency_type: Option<&str>, priority: Option<&str>, limit: u32) -> String {
    let mut params = vec![format!("limit={}", limit)];
    if let Some(t) = emergency_type {
        params.push(format!("emergency_type={}", urlencoding::encode(t)));
    }
    if let Some(p) = priority {
        params.push(format!("priority={}", urlencoding::encode(p)));
    }
    params.join("&")
}

impl SirenaClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("API error ({}): {}", status, body);
        }

        resp.json().await.context("Failed to parse response")
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Ok(resp.status().is_success())
    }

    /// Submit a new call; notification problems come back as warnings
    pub async fn create_call(&self, request: &CreateCallRequest) -> Result<HandleCallResponse> {
        let url = format!("{}/sirena/calls", self.base_url);
        tracing::debug!(%url, "Submitting call");

        let resp = self
            .authorized(self.client.post(&url))
            .json(request)
            .send()
            .await
            .context("Failed to connect to Sirena API")?;

        Self::parse(resp).await
    }

    pub async fn get_call(&self, id: i64) -> Result<CallResponse> {
        let url = format!("{}/sirena/calls/{}", self.base_url, id);
        let resp = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .context("Failed to connect to Sirena API")?;

        Self::parse(resp).await
    }

    pub async fn list_calls(
        &self,
        emergency_type: Option<&str>,
        priority: Option<&str>,
        limit: u32,
    ) -> Result<Vec<CallResponse>> {
        let url = format!(
            "{}/sirena/calls?{}",
            self.base_url,
            list_query(emergency_type, priority, limit)
        );
        let resp = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .context("Failed to connect to Sirena API")?;

        Self::parse(resp).await
    }

    pub async fn dispatch_status(&self) -> Result<DispatchStatusResponse> {
        let url = format!("{}/sirena/dispatch/status", self.base_url);
        let resp = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .context("Failed to connect to Sirena API")?;

        Self::parse(resp).await
    }

    pub async fn send_test_message(&self) -> Result<MessageSentResponse> {
        let url = format!("{}/sirena/dispatch/test", self.base_url);
        let resp = self
            .authorized(self.client.post(&url))
            .send()
            .await
            .context("Failed to connect to Sirena API")?;

        Self::parse(resp).await
    }

    pub async fn send_manual_message(
        &self,
        request: &ManualMessageRequest,
    ) -> Result<MessageSentResponse> {
        let url = format!("{}/sirena/dispatch/manual", self.base_url);
        let resp = self
            .authorized(self.client.post(&url))
            .json(request)
            .send()
            .await
            .context("Failed to connect to Sirena API")?;

        Self::parse(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_encodes_filters() {
        assert_eq!(list_query(None, None, 20), "limit=20");
        assert_eq!(
            list_query(Some("civil defense"), Some("red"), 5),
            "limit=5&emergency_type=civil%20defense&priority=red"
        );
    }
}
