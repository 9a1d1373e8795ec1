//! Query-to-source planning: fetch spec, select, build

use openapi_parser::{OpenApiParser, ParsedSpec};
use serde::Serialize;
use tracing::info;

use crate::error::AgentResult;
use crate::selector::{EndpointSelector, SelectedParameter};
use crate::settings::Settings;
use crate::source::{build_rest_source, RestSource};

/// What to plan: which spec, answering which query
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub spec_url: String,
    pub query: String,
}

impl PipelineRequest {
    /// Request against the spec configured in `settings`
    pub fn from_settings(settings: &Settings, query: impl Into<String>) -> Self {
        Self {
            spec_url: settings.spec_url.clone(),
            query: query.into(),
        }
    }
}

/// A planned REST pull
#[derive(Debug, Clone, Serialize)]
pub struct PipelinePlan {
    pub endpoint: String,
    pub parameters: Vec<SelectedParameter>,
    pub source: RestSource,
}

/// Plans REST sources for queries
pub struct PipelinePlanner {
    selector: EndpointSelector,
}

impl PipelinePlanner {
    pub fn new(selector: EndpointSelector) -> Self {
        Self { selector }
    }

    /// Fetch the spec named in `request` and plan against it
    pub async fn plan(&self, request: &PipelineRequest) -> AgentResult<Option<PipelinePlan>> {
        let spec = OpenApiParser::fetch_and_parse(&request.spec_url).await?;
        self.plan_for_spec(&spec, &request.query).await
    }

    /// Plan against an already parsed spec. `None` when no endpoint matches.
    pub async fn plan_for_spec(&self, spec: &ParsedSpec, query: &str) -> AgentResult<Option<PipelinePlan>> {
        let Some(endpoint) = self.selector.select_endpoint(spec, Some(query)).await? else {
            return Ok(None);
        };

        let parameters = self.selector.select_parameters(spec, &endpoint, query).await?;
        let source = build_rest_source(spec, &endpoint, &parameters)?;

        info!(
            "Planned {} {} with {} parameters",
            source.client.base_url,
            endpoint,
            parameters.len()
        );

        Ok(Some(PipelinePlan {
            endpoint,
            parameters,
            source,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::model::ScriptedModel;
    use openapi_parser::ResolveError;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FORECAST_SPEC: &str = r#"
openapi: 3.0.0
info:
  title: Open-Meteo APIs
  version: "1.0"
servers:
  - url: https://api.open-meteo.com
paths:
  /v1/forecast:
    get:
      summary: 7 day weather forecast for coordinates
      description: 7 day weather variables in hourly and daily resolution
      parameters:
        - name: latitude
          in: query
          required: true
          schema:
            type: number
        - name: longitude
          in: query
          required: true
          schema:
            type: number
        - name: hourly
          in: query
          schema:
            type: array
      responses:
        200:
          description: OK
"#;

    fn planner(responses: &[&str]) -> PipelinePlanner {
        PipelinePlanner::new(EndpointSelector::new(ScriptedModel::new(responses.iter().copied())))
    }

    #[tokio::test]
    async fn test_plan_fetches_and_builds_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/openapi.yml"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(FORECAST_SPEC, "text/yaml"))
            .mount(&server)
            .await;

        let planner = planner(&[
            r#"{"path": "/v1/forecast"}"#,
            r#"{"parameters": [{"name": "latitude", "value": 52.52}, {"name": "longitude", "value": 13.41}]}"#,
        ]);
        let request = PipelineRequest {
            spec_url: format!("{}/openapi.yml", server.uri()),
            query: "Weather in Berlin this week".to_string(),
        };

        let plan = planner.plan(&request).await.unwrap().unwrap();
        assert_eq!(plan.endpoint, "/v1/forecast");
        assert_eq!(plan.parameters.len(), 2);
        assert_eq!(plan.source.client.base_url, "https://api.open-meteo.com");
        let endpoint = &plan.source.resources[0].endpoint;
        assert_eq!(endpoint.path, "/v1/forecast");
        assert_eq!(endpoint.params.get("latitude"), Some(&json!(52.52)));
        assert_eq!(endpoint.params.get("longitude"), Some(&json!(13.41)));
    }

    #[tokio::test]
    async fn test_plan_no_matching_endpoint() {
        let spec = OpenApiParser::parse(FORECAST_SPEC).unwrap();
        let plan = planner(&[r#"{"path": null}"#])
            .plan_for_spec(&spec, "What's the stock price of AAPL?")
            .await
            .unwrap();
        assert!(plan.is_none());
    }

    #[tokio::test]
    async fn test_plan_aborts_without_server() {
        let mut spec = OpenApiParser::parse(FORECAST_SPEC).unwrap();
        spec.servers.clear();

        let err = planner(&[r#"{"path": "/v1/forecast"}"#, r#"{"parameters": []}"#])
            .plan_for_spec(&spec, "Weather in Berlin")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Resolve(ResolveError::NoServerFound)));
    }

    #[test]
    fn test_request_from_settings() {
        let settings = Settings {
            spec_url: "https://api.example.com/openapi.json".to_string(),
            ..Settings::new()
        };
        let request = PipelineRequest::from_settings(&settings, "anything");
        assert_eq!(request.spec_url, "https://api.example.com/openapi.json");
        assert_eq!(request.query, "anything");
    }
}
