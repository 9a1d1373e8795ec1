//! Language model backends used for selection

mod openai;

pub use openai::OpenAiChatModel;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{AgentError, AgentResult};

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System instructions
    pub system: String,
    /// User prompt
    pub prompt: String,
}

/// A model that answers a prompt with a JSON text
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a request, returning the raw response text
    async fn complete(&self, request: CompletionRequest) -> AgentResult<String>;
}

/// Model that replays canned responses in order and records each request.
///
/// Used in tests where no provider is reachable.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    /// Create a model that answers with `responses`, one per call
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> AgentResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        self.responses
            .lock()
            .map_err(|e| AgentError::ModelError(e.to_string()))?
            .pop_front()
            .ok_or_else(|| AgentError::ModelError("No scripted response left".to_string()))
    }
}

/// Strip Markdown code fences some models wrap around JSON
pub(crate) fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
