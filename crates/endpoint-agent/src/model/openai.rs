//! OpenAI-compatible chat completions backend

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{CompletionRequest, LanguageModel};
use crate::error::{AgentError, AgentResult};
use crate::settings::Settings;

/// Chat completions client speaking the OpenAI wire format
pub struct OpenAiChatModel {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiChatModel {
    /// Create a client for `model` at `api_base` (e.g. "https://api.openai.com/v1")
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::ModelError(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Create a client from settings, requiring an API key
    pub fn from_settings(settings: &Settings) -> AgentResult<Self> {
        Self::with_key(settings, settings.effective_api_key())
    }

    fn with_key(settings: &Settings, api_key: Option<String>) -> AgentResult<Self> {
        let api_key = api_key.ok_or(AgentError::MissingApiKey)?;
        Self::new(
            settings.api_base.clone(),
            api_key,
            settings.model.clone(),
            std::time::Duration::from_secs(settings.timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn complete(&self, request: CompletionRequest) -> AgentResult<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!("Sending completion request to {} ({})", self.endpoint(), self.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ModelError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::ModelError(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            error!("Completion request failed with status {}: {}", status, text);
            return Err(AgentError::ModelError(format!("HTTP {} - {}", status, text)));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| AgentError::InvalidResponse(format!("Unexpected completion payload: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AgentError::InvalidResponse("Completion has no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "Answer in JSON".to_string(),
            prompt: "Pick one".to_string(),
        }
    }

    fn model(server: &MockServer) -> OpenAiChatModel {
        OpenAiChatModel::new(
            format!("{}/v1/", server.uri()),
            "sk-test",
            "gpt-4o-mini",
            std::time::Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "Answer in JSON"},
                    {"role": "user", "content": "Pick one"}
                ],
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"path\": \"/forecast\"}"}}]
            })))
            .mount(&server)
            .await;

        let content = model(&server).complete(request()).await.unwrap();
        assert_eq!(content, "{\"path\": \"/forecast\"}");
    }

    #[tokio::test]
    async fn test_complete_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = model(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, AgentError::ModelError(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_complete_without_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = model(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidResponse(_)));
    }

    #[test]
    fn test_settings_without_key_rejected() {
        let settings = Settings {
            api_key: None,
            ..Settings::new()
        };
        assert!(matches!(
            OpenAiChatModel::with_key(&settings, settings.api_key_or(None)),
            Err(AgentError::MissingApiKey)
        ));
    }

    #[test]
    fn test_settings_key_used() {
        let settings = Settings {
            api_key: Some("sk-configured".to_string()),
            ..Settings::new()
        };
        let model = OpenAiChatModel::with_key(&settings, settings.api_key_or(None)).unwrap();
        assert_eq!(model.api_key, "sk-configured");
        assert_eq!(model.endpoint(), "https://api.openai.com/v1/chat/completions");
    }
}
