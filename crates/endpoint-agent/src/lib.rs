//! # endpoint-agent
//!
//! Turns a free-text query into a REST pull source for an OpenAPI-described API:
//! a language model picks the GET endpoint and its parameters, the spec's
//! servers supply the base URL.

pub mod error;
pub mod model;
mod planner;
mod selector;
pub mod settings;
mod source;

pub use error::{AgentError, AgentResult};
pub use model::{CompletionRequest, LanguageModel, OpenAiChatModel, ScriptedModel};
pub use planner::{PipelinePlan, PipelinePlanner, PipelineRequest};
pub use selector::{EndpointSelector, SelectedParameter};
pub use settings::{Settings, SettingsManager};
pub use source::{build_rest_source, ClientConfig, Resource, ResourceEndpoint, RestSource};
