//! openapi-pull - plan REST pulls from an OpenAPI spec and a free-text query
//!
//! Logs go to stderr so stdout carries only the JSON or URL output.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use endpoint_agent::{
    EndpointSelector, OpenAiChatModel, PipelinePlanner, PipelineRequest, SettingsManager,
};
use openapi_parser::{describe_get_endpoints, OpenApiParser};

/// Plan REST API pulls from OpenAPI specs
#[derive(Parser, Debug)]
#[command(name = "openapi-pull")]
#[command(author = "Symbia Labs")]
#[command(version)]
#[command(about = "Resolve OpenAPI endpoints for a question and emit a REST pull source")]
struct Args {
    /// OpenAPI spec URL (JSON or YAML), overrides settings
    #[arg(long, env = "OPENAPI_SPEC_URL")]
    spec_url: Option<String>,

    /// Directory holding settings.json
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Chat model name, overrides settings
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// API key for the model provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the base server URL for a path (or the root server)
    Servers {
        /// Path as declared in the spec, e.g. /v1/forecast
        #[arg(long)]
        path: Option<String>,
    },
    /// Print the GET endpoints offered for selection as JSON
    Endpoints,
    /// Select an endpoint and parameters for a query and print the REST source
    Plan {
        /// Free-text question the data should answer
        #[arg(long)]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config_dir = match args.config_dir {
        Some(dir) => dir,
        None => SettingsManager::default_dir()?,
    };
    let mut settings = SettingsManager::new(&config_dir).into_settings();
    if let Some(spec_url) = args.spec_url {
        settings.spec_url = spec_url;
    }
    if let Some(model) = args.model {
        settings.model = model;
    }
    if args.api_key.is_some() {
        settings.api_key = args.api_key;
    }

    match args.command {
        Command::Servers { path } => {
            let spec = OpenApiParser::fetch_and_parse(&settings.spec_url).await?;
            let url = spec.server_url(path.as_deref())?;
            println!("{}", url);
        }
        Command::Endpoints => {
            let spec = OpenApiParser::fetch_and_parse(&settings.spec_url).await?;
            let descriptions = describe_get_endpoints(&spec);
            println!("{}", serde_json::to_string_pretty(&descriptions)?);
        }
        Command::Plan { query } => {
            let model = OpenAiChatModel::from_settings(&settings)?;
            let planner = PipelinePlanner::new(EndpointSelector::new(model));
            let request = PipelineRequest::from_settings(&settings, query);

            info!("Planning against {}", request.spec_url);

            let plan = planner
                .plan(&request)
                .await?
                .ok_or("No endpoint in the spec matches the query")?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}
