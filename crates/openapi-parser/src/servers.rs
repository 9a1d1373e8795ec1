//! Base server URL resolution for a path

use crate::error::ResolveError;
use crate::types::{ParsedSpec, ServerInfo};
use tracing::debug;

/// Read access to the server lists of an OpenAPI document.
///
/// Implemented by every document model the resolver works over, so the
/// resolution rules do not depend on a version-specific representation.
pub trait ServerSource {
    /// Root-level servers, in declaration order
    fn root_servers(&self) -> &[ServerInfo];

    /// Servers declared on `path`, or `None` if the path is unknown
    fn path_servers(&self, path: &str) -> Option<&[ServerInfo]>;
}

impl ServerSource for ParsedSpec {
    fn root_servers(&self) -> &[ServerInfo] {
        &self.servers
    }

    fn path_servers(&self, path: &str) -> Option<&[ServerInfo]> {
        self.paths.get(path).map(|item| item.servers.as_slice())
    }
}

/// Resolve the base URL for requests to `path`.
///
/// The first path-level server wins, then the first root-level server.
/// Later entries and server variables are never considered.
pub fn resolve_server_url<S>(spec: &S, path: Option<&str>) -> Result<String, ResolveError>
where
    S: ServerSource + ?Sized,
{
    if let Some(path) = path.filter(|p| !p.is_empty()) {
        if let Some(url) = spec.path_servers(path).and_then(first_url) {
            debug!("Using path-level server {} for {}", url, path);
            return Ok(url.to_string());
        }
    }

    let url = first_url(spec.root_servers()).ok_or(ResolveError::NoServerFound)?;
    debug!("Using root-level server {}", url);
    Ok(url.to_string())
}

// A blank url counts as no server at that level
fn first_url(servers: &[ServerInfo]) -> Option<&str> {
    servers
        .first()
        .map(|server| server.url.as_str())
        .filter(|url| !url.trim().is_empty())
}
