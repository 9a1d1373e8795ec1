//! # openapi-parser
//!
//! OpenAPI 3.x parser for the endpoint pipeline.
//! Downloads specs (JSON or YAML), resolves the base server URL for a path
//! and describes the GET endpoints an agent may pick from.

mod types;
mod parser;
mod servers;
mod endpoints;
mod error;

pub use types::*;
pub use parser::{download_spec, OpenApiParser};
pub use servers::{resolve_server_url, ServerSource};
pub use endpoints::{
    candidates_for_selection, describe_get_endpoints, EndpointDescription, OperationDescription,
    ParameterDescription,
};
pub use error::{ParseError, ParseResult, ResolveError};
