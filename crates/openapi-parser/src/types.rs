//! Type definitions for parsed OpenAPI specs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// HTTP methods supported by OpenAPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// OpenAPI document version family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecVersion {
    #[serde(rename = "3.0")]
    V3_0,
    #[serde(rename = "3.1")]
    V3_1,
}

impl SpecVersion {
    /// Classify the `openapi` field of a document
    pub fn from_openapi_field(value: &str) -> Option<Self> {
        if value.starts_with("3.0") {
            Some(SpecVersion::V3_0)
        } else if value.starts_with("3.1") {
            Some(SpecVersion::V3_1)
        } else {
            None
        }
    }
}

/// Parameter location in HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    fn from_raw(value: &str) -> Option<Self> {
        match value {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }
}

/// A parameter for an API operation or path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationParameter {
    /// Parameter name
    pub name: String,
    /// Where the parameter is located
    pub location: ParameterLocation,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter description
    pub description: Option<String>,
    /// JSON Schema for the parameter
    pub schema: Option<serde_json::Value>,
    /// Whether the parameter is deprecated
    pub deprecated: bool,
}

/// A single operation on a path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Operation-level parameters only; see [`PathItem::parameters_for`]
    pub parameters: Vec<OperationParameter>,
}

/// A path entry with its servers, shared parameters and operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// Servers overriding the root-level list for this path
    pub servers: Vec<ServerInfo>,
    /// Parameters shared by every operation on this path
    pub parameters: Vec<OperationParameter>,
    /// Operations keyed by method, in declaration order
    pub operations: IndexMap<HttpMethod, Operation>,
}

impl PathItem {
    /// The GET operation, if declared
    pub fn get(&self) -> Option<&Operation> {
        self.operations.get(&HttpMethod::Get)
    }

    /// Effective parameters of an operation: path-level parameters overridden
    /// by operation-level ones with the same name and location.
    pub fn parameters_for(&self, method: HttpMethod) -> Vec<OperationParameter> {
        let mut parameters = self.parameters.clone();
        if let Some(op) = self.operations.get(&method) {
            for param in &op.parameters {
                parameters
                    .retain(|existing| !(existing.name == param.name && existing.location == param.location));
                parameters.push(param.clone());
            }
        }
        parameters
    }
}

/// Server information from the spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server URL, variables such as `{region}` left unexpanded
    pub url: String,
    /// Server description
    pub description: Option<String>,
}

/// Parsed OpenAPI specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedSpec {
    /// Document version family
    pub spec_version: SpecVersion,
    /// API title
    pub title: String,
    /// API description
    pub description: Option<String>,
    /// API version
    pub version: String,
    /// Root-level server URLs
    pub servers: Vec<ServerInfo>,
    /// Paths in declaration order
    pub paths: IndexMap<String, PathItem>,
}

impl ParsedSpec {
    /// Look up a path entry
    pub fn path(&self, path: &str) -> Option<&PathItem> {
        self.paths.get(path)
    }

    /// Base URL for requests to `path`; see [`crate::resolve_server_url`]
    pub fn server_url(&self, path: Option<&str>) -> Result<String, crate::ResolveError> {
        crate::resolve_server_url(self, path)
    }
}

// --- Raw OpenAPI 3.x structures for parsing ---

/// Raw OpenAPI document structure
#[derive(Debug, Clone, Deserialize)]
pub struct RawOpenApiSpec {
    pub openapi: String,
    pub info: RawInfo,
    #[serde(default)]
    pub servers: Vec<RawServer>,
    #[serde(default)]
    pub paths: IndexMap<String, RawPathItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawServer {
    pub url: String,
    pub description: Option<String>,
}

impl From<&RawServer> for ServerInfo {
    fn from(raw: &RawServer) -> Self {
        ServerInfo {
            url: raw.url.clone(),
            description: raw.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPathItem {
    #[serde(default)]
    pub servers: Vec<RawServer>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    pub get: Option<RawOperation>,
    pub post: Option<RawOperation>,
    pub put: Option<RawOperation>,
    pub patch: Option<RawOperation>,
    pub delete: Option<RawOperation>,
    pub head: Option<RawOperation>,
    pub options: Option<RawOperation>,
    pub trace: Option<RawOperation>,
}

impl RawPathItem {
    /// Declared operations in method order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &RawOperation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Head, &self.head),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Trace, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    /// Parameter name (optional when $ref is used)
    #[serde(default)]
    pub name: String,
    /// Parameter location (optional when $ref is used)
    #[serde(rename = "in", default)]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<serde_json::Value>,
    #[serde(default)]
    pub deprecated: bool,
    /// Reference to a parameter in components/parameters
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
}

impl RawParameter {
    /// Convert to a parameter, skipping unresolved references and unknown locations
    pub fn to_parameter(&self) -> Option<OperationParameter> {
        if self.reference.is_some() {
            return None;
        }

        let location = ParameterLocation::from_raw(&self.location)?;

        Some(OperationParameter {
            name: self.name.clone(),
            location,
            // Path parameters are always required
            required: self.required || location == ParameterLocation::Path,
            description: self.description.clone(),
            schema: self.schema.clone(),
            deprecated: self.deprecated,
        })
    }
}

impl From<&RawOperation> for Operation {
    fn from(raw: &RawOperation) -> Self {
        Operation {
            operation_id: raw.operation_id.clone(),
            summary: raw.summary.clone(),
            description: raw.description.clone(),
            deprecated: raw.deprecated,
            parameters: raw.parameters.iter().filter_map(RawParameter::to_parameter).collect(),
        }
    }
}

impl From<&RawPathItem> for PathItem {
    fn from(raw: &RawPathItem) -> Self {
        PathItem {
            servers: raw.servers.iter().map(ServerInfo::from).collect(),
            parameters: raw.parameters.iter().filter_map(RawParameter::to_parameter).collect(),
            operations: raw
                .operations()
                .map(|(method, op)| (method, Operation::from(op)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, location: ParameterLocation) -> OperationParameter {
        OperationParameter {
            name: name.to_string(),
            location,
            required: false,
            description: None,
            schema: None,
            deprecated: false,
        }
    }

    #[test]
    fn test_spec_version_classification() {
        assert_eq!(SpecVersion::from_openapi_field("3.0.3"), Some(SpecVersion::V3_0));
        assert_eq!(SpecVersion::from_openapi_field("3.1.0"), Some(SpecVersion::V3_1));
        assert_eq!(SpecVersion::from_openapi_field("2.0"), None);
    }

    #[test]
    fn test_raw_path_parameter_always_required() {
        let raw = RawParameter {
            name: "id".to_string(),
            location: "path".to_string(),
            required: false,
            description: None,
            schema: None,
            deprecated: false,
            reference: None,
        };
        assert!(raw.to_parameter().unwrap().required);
    }

    #[test]
    fn test_raw_reference_parameter_skipped() {
        let raw = RawParameter {
            name: String::new(),
            location: String::new(),
            required: false,
            description: None,
            schema: None,
            deprecated: false,
            reference: Some("#/components/parameters/Limit".to_string()),
        };
        assert!(raw.to_parameter().is_none());
    }

    #[test]
    fn test_parameters_for_overrides_path_level() {
        let mut overriding = param("limit", ParameterLocation::Query);
        overriding.required = true;

        let mut item = PathItem {
            parameters: vec![param("org_id", ParameterLocation::Path), param("limit", ParameterLocation::Query)],
            ..Default::default()
        };
        item.operations.insert(
            HttpMethod::Get,
            Operation {
                operation_id: None,
                summary: None,
                description: None,
                deprecated: false,
                parameters: vec![overriding],
            },
        );

        let params = item.parameters_for(HttpMethod::Get);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "org_id");
        assert_eq!(params[1].name, "limit");
        assert!(params[1].required);
    }
}
