//! OpenAiCompatGateway -- [`CompletionGateway`] over an OpenAI-compatible API.
//!
//! Sends non-streaming requests to `/v1/chat/completions` with bearer
//! authentication. The synthesized directive travels as a leading
//! system-role message ahead of the transcript window.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use luxchat_core::gateway::CompletionGateway;
use luxchat_types::llm::{GatewayError, TurnMessage};

/// Default per-request timeout. A timed-out call is indistinguishable from
/// any other gateway failure to callers: no transcript mutation happens.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI-compatible completion gateway.
///
/// Works against any provider exposing the chat-completions wire format
/// (OpenAI, local inference servers, proxies).
// No Debug derive: the API key must never reach log output.
pub struct OpenAiCompatGateway {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl OpenAiCompatGateway {
    /// Create a new gateway.
    ///
    /// # Arguments
    ///
    /// * `api_key` - provider API key wrapped in SecretString
    /// * `base_url` - provider base URL (e.g., "https://api.openai.com")
    /// * `model` - model identifier (e.g., "gpt-4o-mini")
    pub fn new(api_key: SecretString, base_url: String, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create reqwest client");
        self
    }

    /// The model this gateway sends completions to.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn to_wire_request<'a>(
        &'a self,
        directive: &'a str,
        messages: &'a [TurnMessage],
    ) -> ChatCompletionRequest<'a> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(WireMessage {
            role: "system",
            content: directive,
        });
        for m in messages {
            wire.push(WireMessage {
                role: match m.role {
                    luxchat_types::llm::MessageRole::System => "system",
                    luxchat_types::llm::MessageRole::User => "user",
                    luxchat_types::llm::MessageRole::Assistant => "assistant",
                },
                content: &m.content,
            });
        }
        ChatCompletionRequest {
            model: &self.model,
            messages: wire,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionGateway for OpenAiCompatGateway {
    fn name(&self) -> &str {
        "openai_compatible"
    }

    async fn complete(
        &self,
        directive: &str,
        messages: &[TurnMessage],
    ) -> Result<String, GatewayError> {
        let body = self.to_wire_request(directive, messages);

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Provider {
                        message: format!("HTTP request failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => GatewayError::AuthenticationFailed,
                429 => GatewayError::RateLimited {
                    retry_after_ms: None,
                },
                400 => GatewayError::InvalidRequest(error_body),
                _ => GatewayError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Deserialization(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                GatewayError::Deserialization("response contained no completion".to_string())
            })
    }
}
