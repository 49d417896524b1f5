//! Messaging Application Service
//!
//! Operator-initiated texts outside of call dispatch: manual messages to
//! any phone and connection tests to the endpoint's own account.

use chrono::Utc;
use std::sync::Arc;

use sirena::{DomainError, Messenger};

use crate::adapters::formatters::{format_connection_test, format_manual_text};
use crate::models::{ManualMessageRequest, MessageSentResponse};

const DEFAULT_KIND: &str = "manual";

pub struct MessagingService<M: Messenger> {
    messenger: Arc<M>,
}

impl<M: Messenger> MessagingService<M> {
    pub fn new(messenger: Arc<M>) -> Self {
        Self { messenger }
    }

    async fn ensure_ready(&self) -> Result<(), DomainError> {
        if self.messenger.health_check().await? {
            Ok(())
        } else {
            Err(DomainError::Configuration(format!(
                "{} is not configured",
                self.messenger.name()
            )))
        }
    }

    async fn deliver(&self, to: &str, text: String) -> Result<MessageSentResponse, DomainError> {
        self.messenger.send_text(to, &text).await?;

        Ok(MessageSentResponse {
            endpoint: self.messenger.name().to_string(),
            to: to.to_string(),
            text,
            sent_at: Utc::now(),
        })
    }

    /// Send an operator's message to any phone, once
    pub async fn send_manual(
        &self,
        request: &ManualMessageRequest,
    ) -> Result<MessageSentResponse, DomainError> {
        let phone = request.phone.trim();
        if phone.is_empty() {
            return Err(DomainError::invalid_input("phone is required"));
        }
        if request.message.trim().is_empty() {
            return Err(DomainError::invalid_input("message is required"));
        }
        self.ensure_ready().await?;

        let kind = request
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_KIND);
        let text = format_manual_text(&request.message, kind, Utc::now());

        let sent = self.deliver(phone, text).await?;
        tracing::info!(to = %sent.to, kind, "📱 Manual message sent");
        Ok(sent)
    }

    /// Send a timestamped test message to the endpoint's own account
    pub async fn send_connection_test(&self) -> Result<MessageSentResponse, DomainError> {
        self.ensure_ready().await?;
        let own = self.messenger.own_address().map(str::to_string).ok_or_else(|| {
            DomainError::Configuration(format!(
                "{} has no sending address to test against",
                self.messenger.name()
            ))
        })?;

        let sent = self.deliver(&own, format_connection_test(Utc::now())).await?;
        tracing::info!(to = %sent.to, "🧪 Connection test sent");
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sirena::NotificationMessage;
    use std::sync::Mutex;

    const ACCOUNT: &str = "5493515550000";

    #[derive(Default)]
    struct RecordingMessenger {
        configured: bool,
        fail: bool,
        texts: Mutex<Vec<(String, String)>>,
    }

    impl RecordingMessenger {
        fn ready() -> Self {
            Self {
                configured: true,
                ..Self::default()
            }
        }

        fn texts(&self) -> Vec<(String, String)> {
            self.texts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send(&self, _address: &str, _message: &NotificationMessage) -> Result<(), DomainError> {
            Ok(())
        }

        async fn send_text(&self, address: &str, text: &str) -> Result<(), DomainError> {
            if self.fail {
                return Err(DomainError::ExternalService("waboxapp returned 502".to_string()));
            }
            self.texts
                .lock()
                .unwrap()
                .push((address.to_string(), text.to_string()));
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }

        fn own_address(&self) -> Option<&str> {
            self.configured.then_some(ACCOUNT)
        }

        async fn health_check(&self) -> Result<bool, DomainError> {
            Ok(self.configured)
        }
    }

    fn manual(phone: &str, message: &str, kind: Option<&str>) -> ManualMessageRequest {
        ManualMessageRequest {
            phone: phone.to_string(),
            message: message.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_manual_message_is_formatted_and_sent_once() {
        let messenger = Arc::new(RecordingMessenger::ready());
        let service = MessagingService::new(messenger.clone());

        let sent = service
            .send_manual(&manual(" 3515551234 ", "Road closed", None))
            .await
            .unwrap();

        assert_eq!(sent.to, "3515551234");
        assert_eq!(sent.endpoint, "recording");
        assert!(sent.text.starts_with("📱 MANUAL MESSAGE\n\nRoad closed"));
        assert!(sent.text.ends_with("📨 TYPE: MANUAL"));
        assert_eq!(messenger.texts(), vec![("3515551234".to_string(), sent.text)]);
    }

    #[tokio::test]
    async fn test_manual_message_kind() {
        let service = MessagingService::new(Arc::new(RecordingMessenger::ready()));

        let sent = service
            .send_manual(&manual("3515551234", "Shift change", Some("notice")))
            .await
            .unwrap();
        assert!(sent.text.ends_with("📨 TYPE: NOTICE"));
    }

    #[tokio::test]
    async fn test_manual_message_requires_phone_and_text() {
        let messenger = Arc::new(RecordingMessenger::ready());
        let service = MessagingService::new(messenger.clone());

        let err = service.send_manual(&manual("  ", "hello", None)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        let err = service.send_manual(&manual("3515551234", "\n", None)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(messenger.texts().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_endpoint_sends_nothing() {
        let messenger = Arc::new(RecordingMessenger::default());
        let service = MessagingService::new(messenger.clone());

        let err = service
            .send_manual(&manual("3515551234", "hello", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));

        let err = service.send_connection_test().await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
        assert!(messenger.texts().is_empty());
    }

    #[tokio::test]
    async fn test_connection_test_goes_to_own_account() {
        let messenger = Arc::new(RecordingMessenger::ready());
        let service = MessagingService::new(messenger.clone());

        let sent = service.send_connection_test().await.unwrap();

        assert_eq!(sent.to, ACCOUNT);
        assert!(sent.text.starts_with("🧪 Connection test - "));
        assert_eq!(messenger.texts().len(), 1);
    }

    #[tokio::test]
    async fn test_send_failure_is_an_error() {
        let messenger = Arc::new(RecordingMessenger {
            fail: true,
            ..RecordingMessenger::ready()
        });
        let service = MessagingService::new(messenger);

        let err = service
            .send_manual(&manual("3515551234", "hello", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ExternalService(_)));
    }
}
