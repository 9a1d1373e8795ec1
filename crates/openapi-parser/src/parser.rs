//! Spec acquisition and OpenAPI parsing

use crate::error::{ParseError, ParseResult};
use crate::types::*;
use serde_json::Value;
use tracing::{debug, info};

/// Download a spec and return the raw document (JSON first, then YAML).
///
/// No OpenAPI validation happens here, so Swagger 2.0 documents load too.
pub async fn download_spec(url: &str) -> ParseResult<Value> {
    url::Url::parse(url).map_err(|e| ParseError::InvalidUrl(format!("{}: {}", url, e)))?;

    info!("Fetching OpenAPI spec from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| ParseError::HttpError(e.to_string()))?;

    let response = client
        .get(url)
        .header("Accept", "application/json, application/yaml, text/yaml")
        .send()
        .await
        .map_err(|e| ParseError::FetchError(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ParseError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let content = response
        .text()
        .await
        .map_err(|e| ParseError::FetchError(e.to_string()))?;

    OpenApiParser::parse_document_text(&content)
}

/// OpenAPI 3.x parser
pub struct OpenApiParser;

impl OpenApiParser {
    /// Parse an OpenAPI spec from a string (JSON first, then YAML)
    pub fn parse(content: &str) -> ParseResult<ParsedSpec> {
        let document = Self::parse_document_text(content)?;
        Self::parse_document(document)
    }

    /// Fetch and parse an OpenAPI spec from a URL
    pub async fn fetch_and_parse(url: &str) -> ParseResult<ParsedSpec> {
        let document = download_spec(url).await?;
        Self::parse_document(document)
    }

    /// Decode spec text into a raw document without validating it
    pub fn parse_document_text(content: &str) -> ParseResult<Value> {
        let document = match serde_json::from_str::<Value>(content) {
            Ok(value) => value,
            Err(json_err) => {
                debug!("Spec is not JSON ({}), trying YAML", json_err);
                // Through serde_yaml::Value so non-string keys (e.g. `200:`) survive
                let yaml: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| {
                    ParseError::InvalidFormat(format!("Failed to parse file as json or yaml: {}", e))
                })?;
                serde_json::to_value(yaml).map_err(|e| {
                    ParseError::InvalidFormat(format!("Failed to parse file as json or yaml: {}", e))
                })?
            }
        };

        if !document.is_object() {
            return Err(ParseError::InvalidFormat(
                "Failed to parse file as json or yaml: document is not a mapping".to_string(),
            ));
        }

        Ok(document)
    }

    /// Validate a raw document as OpenAPI 3.0 or 3.1
    pub fn parse_document(document: Value) -> ParseResult<ParsedSpec> {
        if document.get("openapi").is_none() {
            // Unquoted `swagger: 2.0` in YAML arrives as a number
            let swagger = match document.get("swagger") {
                Some(Value::String(version)) => Some(version.clone()),
                Some(Value::Number(version)) => Some(version.to_string()),
                _ => None,
            };
            if let Some(swagger) = swagger {
                return Err(ParseError::UnsupportedVersion(format!("swagger {}", swagger)));
            }
        }

        let raw: RawOpenApiSpec =
            serde_json::from_value(document).map_err(|e| ParseError::InvalidDocument(e.to_string()))?;

        Self::convert_spec(raw)
    }

    /// Convert a raw OpenAPI spec to our internal format
    fn convert_spec(raw: RawOpenApiSpec) -> ParseResult<ParsedSpec> {
        let spec_version = SpecVersion::from_openapi_field(&raw.openapi)
            .ok_or_else(|| ParseError::UnsupportedVersion(raw.openapi.clone()))?;

        debug!("Parsing OpenAPI {} spec: {}", raw.openapi, raw.info.title);

        let paths: indexmap::IndexMap<String, PathItem> = raw
            .paths
            .iter()
            .map(|(path, item)| (path.clone(), PathItem::from(item)))
            .collect();

        debug!("Parsed {} paths", paths.len());

        Ok(ParsedSpec {
            spec_version,
            title: raw.info.title,
            description: raw.info.description,
            version: raw.info.version,
            servers: raw.servers.iter().map(ServerInfo::from).collect(),
            paths,
        })
    }
}
