//! GET endpoint descriptions offered to endpoint selection

use crate::types::{OperationParameter, ParameterLocation, ParsedSpec};
use indexmap::IndexMap;
use serde::Serialize;

/// A parameter as presented to the selector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescription {
    pub name: String,
    pub param_in: ParameterLocation,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_schema: Option<serde_json::Value>,
}

impl From<&OperationParameter> for ParameterDescription {
    fn from(param: &OperationParameter) -> Self {
        ParameterDescription {
            name: param.name.clone(),
            param_in: param.location,
            required: param.required,
            description: param.description.clone(),
            param_schema: param.schema.clone(),
        }
    }
}

/// The GET operation of a path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Vec<ParameterDescription>,
}

/// A path that declares a GET operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointDescription {
    /// Path-level parameters, kept apart from the operation's own
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDescription>,
    pub get: OperationDescription,
}

impl EndpointDescription {
    /// Whether the endpoint carries any human-readable text to match against
    pub fn is_described(&self) -> bool {
        let has_text = |text: &Option<String>| text.as_deref().is_some_and(|t| !t.trim().is_empty());
        has_text(&self.get.summary) || has_text(&self.get.description)
    }
}

/// Describe every path with a GET operation, in spec order
pub fn describe_get_endpoints(spec: &ParsedSpec) -> IndexMap<String, EndpointDescription> {
    spec.paths
        .iter()
        .filter_map(|(path, item)| {
            let get = item.get()?;
            let description = EndpointDescription {
                parameters: item.parameters.iter().map(ParameterDescription::from).collect(),
                get: OperationDescription {
                    summary: get.summary.clone(),
                    description: get.description.clone(),
                    parameters: get.parameters.iter().map(ParameterDescription::from).collect(),
                },
            };
            Some((path.clone(), description))
        })
        .collect()
}

/// GET endpoints carrying a summary or description, the only ones worth offering for selection
pub fn candidates_for_selection(spec: &ParsedSpec) -> IndexMap<String, EndpointDescription> {
    describe_get_endpoints(spec)
        .into_iter()
        .filter(|(_, endpoint)| endpoint.is_described())
        .collect()
}
