//! WhatsApp Messenger (waboxapp)
//!
//! Sends dispatch notifications as WhatsApp chat messages through the
//! waboxapp HTTP API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use sirena::{DomainError, Messenger, NotificationMessage};

use super::formatters::format_as_whatsapp_text;

pub const WABOXAPP_CHAT_URL: &str = "https://www.waboxapp.com/api/send/chat";

/// Account credentials issued by waboxapp
#[derive(Debug, Clone)]
struct Credentials {
    token: String,
    /// Sending WhatsApp account (phone number)
    uid: String,
}

/// waboxapp reply; only `sent` matters
#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    sent: bool,
}

/// HTTP implementation of Messenger
pub struct WhatsAppMessenger {
    client: Client,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl WhatsAppMessenger {
    /// Build a messenger; blank or missing credentials leave it unconfigured
    pub fn new(token: Option<String>, uid: Option<String>) -> Result<Self, DomainError> {
        let credentials = match (non_blank(token), non_blank(uid)) {
            (Some(token), Some(uid)) => Some(Credentials { token, uid }),
            _ => None,
        };

        // Per-attempt bounds come from the dispatcher; this is a backstop
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("sirena/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::ExternalService(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: WABOXAPP_CHAT_URL.to_string(),
            credentials,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize a phone number to the Argentine international format
///
/// Non-digits are stripped. 10-digit national numbers get the `54`
/// country code, a leading `0` trunk prefix is replaced by it, and a
/// 12-digit `54` number gets the mobile `9`. Anything else is returned
/// as digits only.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 => format!("54{}", digits),
        11 if digits.starts_with('0') => format!("54{}", &digits[1..]),
        12 if digits.starts_with("54") => format!("549{}", &digits[2..]),
        _ => digits,
    }
}

impl WhatsAppMessenger {
    fn credentials(&self) -> Result<&Credentials, DomainError> {
        self.credentials.as_ref().ok_or_else(|| {
            DomainError::Configuration("messaging endpoint not configured".to_string())
        })
    }

    /// POST one chat message; Ok only when waboxapp reports it sent
    async fn post_chat(
        &self,
        address: &str,
        custom_uid: &str,
        text: &str,
    ) -> Result<String, DomainError> {
        let credentials = self.credentials()?;

        let to = normalize_phone(address);
        if to.is_empty() {
            return Err(DomainError::invalid_input(format!(
                "invalid phone number: {}",
                address
            )));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("token", credentials.token.as_str()),
                ("uid", credentials.uid.as_str()),
                ("to", to.as_str()),
                ("custom_uid", custom_uid),
                ("text", text),
            ])
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::ExternalService(format!(
                "waboxapp returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let reply: ChatReply = response
            .json()
            .await
            .map_err(|e| DomainError::ExternalService(format!("Invalid waboxapp reply: {}", e)))?;

        if !reply.sent {
            return Err(DomainError::ExternalService(
                "waboxapp did not accept the message".to_string(),
            ));
        }

        Ok(to)
    }
}

#[async_trait]
impl Messenger for WhatsAppMessenger {
    async fn send(&self, address: &str, message: &NotificationMessage) -> Result<(), DomainError> {
        let text = format_as_whatsapp_text(message);
        let to = self.post_chat(address, &message.delivery_key, &text).await?;

        tracing::info!(call_id = %message.call_id, to = %to, "💬 WhatsApp sent");
        Ok(())
    }

    async fn send_text(&self, address: &str, text: &str) -> Result<(), DomainError> {
        let custom_uid = format!("sirena_{}", Utc::now().format("%Y%m%d_%H%M%S%3f"));
        let to = self.post_chat(address, &custom_uid, text).await?;

        tracing::info!(to = %to, "💬 WhatsApp text sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "whatsapp"
    }

    fn own_address(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.uid.as_str())
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(self.is_configured())
    }
}
