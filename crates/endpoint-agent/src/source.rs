//! Declarative REST pull source built from a selected endpoint

use indexmap::IndexMap;
use openapi_parser::{ParameterLocation, ParsedSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{AgentError, AgentResult};
use crate::selector::SelectedParameter;

/// REST pull source: one client and the resources it fetches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestSource {
    pub client: ClientConfig,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub endpoint: ResourceEndpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEndpoint {
    /// Path with path parameters substituted
    pub path: String,
    /// Query parameters
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, Value>,
}

/// Build a REST source for GET `endpoint` with the selected parameters.
///
/// Fails when the endpoint is unknown, when no server URL resolves for it,
/// or when a path placeholder has no value.
pub fn build_rest_source(
    spec: &ParsedSpec,
    endpoint: &str,
    parameters: &[SelectedParameter],
) -> AgentResult<RestSource> {
    if spec.path(endpoint).is_none() {
        return Err(AgentError::EndpointNotFound(endpoint.to_string()));
    }

    let base_url = spec.server_url(Some(endpoint))?;

    let path_value = |name: &str| {
        parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Path && p.name == name)
            .and_then(|p| p.value.as_ref())
    };

    // Placeholders come from the template; substituted values may contain braces
    let mut path = String::with_capacity(endpoint.len());
    for segment in template_segments(endpoint) {
        match segment {
            TemplateSegment::Literal(text) => path.push_str(text),
            TemplateSegment::Placeholder(name) => {
                let value = path_value(name).ok_or_else(|| AgentError::MissingPathParameter(name.to_string()))?;
                path.push_str(&value_to_string(value));
            }
        }
    }

    let mut params = IndexMap::new();
    for param in parameters {
        match (param.location, &param.value) {
            (ParameterLocation::Path, _) => {}
            (ParameterLocation::Query, Some(value)) => {
                params.insert(param.name.clone(), value.clone());
            }
            (location, _) => {
                debug!("Not forwarding {:?} parameter {} without a usable value", location, param.name);
            }
        }
    }

    Ok(RestSource {
        client: ClientConfig { base_url },
        resources: vec![Resource {
            name: resource_name(endpoint),
            endpoint: ResourceEndpoint { path, params },
        }],
    })
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

enum TemplateSegment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split `/users/{id}/posts` into literal text and `{name}` placeholders
fn template_segments(template: &str) -> Vec<TemplateSegment<'_>> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        if start > 0 {
            segments.push(TemplateSegment::Literal(&rest[..start]));
        }
        segments.push(TemplateSegment::Placeholder(&rest[start + 1..start + len]));
        rest = &rest[start + len + 1..];
    }

    if !rest.is_empty() {
        segments.push(TemplateSegment::Literal(rest));
    }
    segments
}

/// Resource name from the literal path segments: `/users/{id}/posts` -> `users_posts`
fn resource_name(path: &str) -> String {
    let name = path
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .map(|segment| {
            segment
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("_");

    if name.is_empty() {
        "root".to_string()
    } else {
        name
    }
}
