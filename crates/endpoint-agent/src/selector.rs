//! Agent-backed endpoint and parameter selection

use indexmap::IndexMap;
use openapi_parser::{candidates_for_selection, HttpMethod, ParameterDescription, ParameterLocation, ParsedSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AgentError, AgentResult};
use crate::model::{extract_json, CompletionRequest, LanguageModel};

const ENDPOINT_INSTRUCTIONS: &str = "You match user questions to HTTP API endpoints. \
You are given a user query and a JSON object of GET endpoints keyed by path, each with a summary \
and description. Choose the single endpoint whose data best answers the query. \
Respond with a JSON object {\"path\": \"<path>\"} using a path exactly as listed, \
or {\"path\": null} if no endpoint can answer the query.";

const PARAMETER_INSTRUCTIONS: &str = "You fill in query and path parameters for an HTTP GET request. \
You are given a user query, the endpoint path and its parameters with their schemas. \
Select only the parameters needed to answer the query and derive their values from the query \
(for example, resolve a city name to latitude and longitude when those are required). \
Respond with a JSON object \
{\"parameters\": [{\"name\": \"<name>\", \"in\": \"<param_in>\", \"value\": <value>}]}, \
copying \"in\" from the parameter's param_in; use an empty list if no parameters are needed.";

/// A parameter chosen for a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    /// Value derived from the query, if the model supplied one
    pub value: Option<Value>,
}

#[derive(Deserialize)]
struct EndpointChoice {
    path: Option<String>,
}

#[derive(Deserialize)]
struct ParameterChoice {
    #[serde(default)]
    parameters: Vec<ChosenValue>,
}

#[derive(Deserialize)]
struct ChosenValue {
    name: String,
    #[serde(default, rename = "in")]
    location: Option<ParameterLocation>,
    #[serde(default)]
    value: Value,
}

/// Selects endpoints and parameters for a free-text query using a language model
#[derive(Clone)]
pub struct EndpointSelector {
    model: Arc<dyn LanguageModel>,
}

impl EndpointSelector {
    /// Create a selector backed by `model`
    pub fn new(model: impl LanguageModel + 'static) -> Self {
        Self::with_shared_model(Arc::new(model))
    }

    /// Create a selector sharing an existing model
    pub fn with_shared_model(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Pick the GET endpoint that best answers `query`.
    ///
    /// Only endpoints with a summary or description are offered. Returns
    /// `None` without consulting the model when there is no query or no
    /// candidate, and when the model answers with a path it was not offered.
    pub async fn select_endpoint(&self, spec: &ParsedSpec, query: Option<&str>) -> AgentResult<Option<String>> {
        let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            debug!("No query given, skipping endpoint selection");
            return Ok(None);
        };

        let candidates: IndexMap<String, Value> = candidates_for_selection(spec)
            .into_iter()
            .map(|(path, endpoint)| {
                let entry = json!({
                    "summary": endpoint.get.summary,
                    "description": endpoint.get.description,
                });
                (path, entry)
            })
            .collect();

        if candidates.is_empty() {
            debug!("Spec has no described GET endpoints");
            return Ok(None);
        }

        let prompt = format!(
            "User query: {}\n\nAvailable endpoints:\n{}",
            query,
            serde_json::to_string_pretty(&candidates)?
        );

        let response = self
            .model
            .complete(CompletionRequest {
                system: ENDPOINT_INSTRUCTIONS.to_string(),
                prompt,
            })
            .await?;

        let choice: EndpointChoice = serde_json::from_str(extract_json(&response))
            .map_err(|e| AgentError::InvalidResponse(format!("{}: {}", e, response)))?;

        match choice.path {
            Some(path) if candidates.contains_key(path.as_str()) => {
                info!("Selected endpoint {} for query", path);
                Ok(Some(path))
            }
            Some(path) => {
                warn!("Model chose unknown endpoint {}, treating as no match", path);
                Ok(None)
            }
            None => {
                info!("No endpoint matches the query");
                Ok(None)
            }
        }
    }

    /// Choose parameters of `endpoint`'s GET operation for `query`.
    ///
    /// Path-level and operation-level parameters are both candidates.
    /// Names the endpoint does not declare are dropped; required parameters
    /// are always returned, without a value if the model gave none.
    pub async fn select_parameters(
        &self,
        spec: &ParsedSpec,
        endpoint: &str,
        query: &str,
    ) -> AgentResult<Vec<SelectedParameter>> {
        let item = spec
            .path(endpoint)
            .filter(|item| item.get().is_some())
            .ok_or_else(|| AgentError::EndpointNotFound(endpoint.to_string()))?;

        let parameters = item.parameters_for(HttpMethod::Get);
        if parameters.is_empty() {
            debug!("Endpoint {} declares no parameters", endpoint);
            return Ok(Vec::new());
        }

        let described: Vec<ParameterDescription> = parameters.iter().map(ParameterDescription::from).collect();
        let prompt = format!(
            "User query: {}\n\nEndpoint: {} {}\n\nParameters:\n{}",
            query,
            HttpMethod::Get,
            endpoint,
            serde_json::to_string_pretty(&described)?
        );

        let response = self
            .model
            .complete(CompletionRequest {
                system: PARAMETER_INSTRUCTIONS.to_string(),
                prompt,
            })
            .await?;

        let choice: ParameterChoice = serde_json::from_str(extract_json(&response))
            .map_err(|e| AgentError::InvalidResponse(format!("{}: {}", e, response)))?;

        // Keyed by (name, location): OpenAPI allows one name in several locations
        let mut chosen: HashMap<(String, ParameterLocation), Value> = HashMap::new();
        for answer in choice.parameters {
            let targets: Vec<ParameterLocation> = parameters
                .iter()
                .filter(|p| p.name == answer.name && answer.location.map_or(true, |loc| loc == p.location))
                .map(|p| p.location)
                .collect();

            if targets.is_empty() {
                debug!("Dropping undeclared parameter {} for {}", answer.name, endpoint);
                continue;
            }

            for location in targets {
                let key = (answer.name.clone(), location);
                if answer.location.is_some() {
                    chosen.insert(key, answer.value.clone());
                } else {
                    // An answer without `in` fills every declaration of the name,
                    // but never overrides an answer that named its location
                    chosen.entry(key).or_insert_with(|| answer.value.clone());
                }
            }
        }

        let selected: Vec<SelectedParameter> = parameters
            .into_iter()
            .filter_map(|param| {
                let value = chosen
                    .remove(&(param.name.clone(), param.location))
                    .filter(|v| !v.is_null());
                if value.is_none() && !param.required {
                    return None;
                }
                Some(SelectedParameter {
                    value,
                    name: param.name,
                    location: param.location,
                    required: param.required,
                })
            })
            .collect();

        debug!(
            "Selected parameters for {}: {:?}",
            endpoint,
            selected.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
        );

        Ok(selected)
    }
}
