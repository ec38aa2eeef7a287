//! Chat gateway client
//!
//! The assistant model runs behind an HTTP gateway. This client posts the
//! ordered history with the visitor's language and maps every failure to a
//! [`CollaboratorFailure`] the API reports as retryable.

use async_trait::async_trait;
use mcn_common::chat::{ChatAssistant, ChatMessage};
use mcn_common::config::ChatConfig;
use mcn_common::{CollaboratorFailure, Language};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("mcn-guide/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    messages: &'a [ChatMessage],
    language: Language,
}

/// Gateway reply; either a bare `reply` or a chat-completion `choices` list
#[derive(Debug, Default, Deserialize)]
struct GatewayReply {
    reply: Option<String>,
    choices: Option<Vec<GatewayChoice>>,
}

#[derive(Debug, Deserialize)]
struct GatewayChoice {
    message: GatewayChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct GatewayChoiceMessage {
    content: String,
}

/// HTTP client for the chat gateway
pub struct GatewayChatClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GatewayChatClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CollaboratorFailure> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CollaboratorFailure::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Client for the configured gateway, or `None` when chat is not configured
    pub fn from_config(config: &ChatConfig) -> Result<Option<Self>, CollaboratorFailure> {
        let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.trim().is_empty()) else {
            return Ok(None);
        };
        if config.api_key().is_none() {
            warn!(
                "Chat gateway configured without an API key ({} is unset)",
                config.api_key_env
            );
        }
        Self::new(
            endpoint,
            config.api_key(),
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatAssistant for GatewayChatClient {
    async fn reply(
        &self,
        history: &[ChatMessage],
        language: Language,
    ) -> Result<String, CollaboratorFailure> {
        debug!(turns = history.len(), language = %language, "Sending chat turn to gateway");

        let mut request = self.http_client.post(&self.endpoint).json(&GatewayRequest {
            messages: history,
            language,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CollaboratorFailure::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Chat gateway returned an error");
            return Err(map_status(status));
        }

        let body: GatewayReply = response
            .json()
            .await
            .map_err(|e| CollaboratorFailure::MalformedReply(e.to_string()))?;

        extract_reply(body)
    }
}

/// Failure for a non-success gateway status
fn map_status(status: StatusCode) -> CollaboratorFailure {
    match status {
        StatusCode::TOO_MANY_REQUESTS => CollaboratorFailure::RateLimited,
        StatusCode::PAYMENT_REQUIRED => CollaboratorFailure::PaymentRequired,
        other => CollaboratorFailure::Upstream(other.as_u16()),
    }
}

fn extract_reply(body: GatewayReply) -> Result<String, CollaboratorFailure> {
    let text = body.reply.or_else(|| {
        body.choices
            .and_then(|choices| choices.into_iter().next())
            .map(|choice| choice.message.content)
    });

    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(CollaboratorFailure::MalformedReply(
            "gateway reply carried no text".to_string(),
        )),
    }
}

/// Stand-in when no gateway is configured; every call fails retryably
#[derive(Debug, Default)]
pub struct UnavailableAssistant;

#[async_trait]
impl ChatAssistant for UnavailableAssistant {
    async fn reply(
        &self,
        _history: &[ChatMessage],
        _language: Language,
    ) -> Result<String, CollaboratorFailure> {
        Err(CollaboratorFailure::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            map_status(StatusCode::TOO_MANY_REQUESTS),
            CollaboratorFailure::RateLimited
        );
        assert_eq!(
            map_status(StatusCode::PAYMENT_REQUIRED),
            CollaboratorFailure::PaymentRequired
        );
        assert_eq!(
            map_status(StatusCode::BAD_GATEWAY),
            CollaboratorFailure::Upstream(502)
        );
    }

    #[test]
    fn test_extract_plain_reply() {
        let body: GatewayReply = serde_json::from_str(r#"{"reply": "Bonjour"}"#).unwrap();
        assert_eq!(extract_reply(body).unwrap(), "Bonjour");
    }

    #[test]
    fn test_extract_choices_reply() {
        let body: GatewayReply = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "Dalal ak jàmm"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_reply(body).unwrap(), "Dalal ak jàmm");
    }

    #[test]
    fn test_empty_reply_is_malformed() {
        assert!(matches!(
            extract_reply(GatewayReply::default()),
            Err(CollaboratorFailure::MalformedReply(_))
        ));
        let body: GatewayReply = serde_json::from_str(r#"{"reply": "  "}"#).unwrap();
        assert!(matches!(
            extract_reply(body),
            Err(CollaboratorFailure::MalformedReply(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let history = vec![ChatMessage::user("Hello")];
        let json = serde_json::to_value(GatewayRequest {
            messages: &history,
            language: Language::Wo,
        })
        .unwrap();
        assert_eq!(json["language"], "wo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hello");
    }

    #[test]
    fn test_unconfigured_chat_has_no_client() {
        let config = ChatConfig::default();
        assert!(GatewayChatClient::from_config(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_assistant_fails() {
        let result = UnavailableAssistant.reply(&[], Language::Fr).await;
        assert_eq!(result, Err(CollaboratorFailure::Unavailable));
    }
}
