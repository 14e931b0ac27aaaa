//! Diagnostic route table.
//!
//! Serialized as:
//!
//! ```json
//! { "apiRoutes": [{ "path": "/api/users", "filePath": "themes/default/routes/api/users.js" }],
//!   "frontendRoutes": [{ "path": "/about", "filePath": "themes/default/html/about.html" }] }
//! ```
//!
//! The two lists are kept apart because the same URL may legitimately exist
//! in both domains.

use super::{RouteEntry, RouteSource};
use crate::utils::path::to_slash;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub path: String,
    pub file_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTable {
    pub api_routes: Vec<RouteRecord>,
    pub frontend_routes: Vec<RouteRecord>,
}

impl RouteTable {
    pub fn to_json(&self, pretty: bool) -> String {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
    }
}

/// A router handle was not supplied. Returned as data, never a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoutersUnavailable {
    #[error("API router is not available")]
    Api,
    #[error("frontend router is not available")]
    Frontend,
    #[error("API and frontend routers are not available")]
    Both,
}

impl RoutersUnavailable {
    /// `{ "error": "..." }` body for the diagnostic endpoint.
    pub fn to_json(self) -> String {
        serde_json::json!({ "error": self.to_string() }).to_string()
    }
}

/// Build the route table from both live routers.
pub fn assemble_routes(
    api: Option<&dyn RouteSource>,
    frontend: Option<&dyn RouteSource>,
    project_root: &Path,
) -> Result<RouteTable, RoutersUnavailable> {
    let (api, frontend) = match (api, frontend) {
        (Some(api), Some(frontend)) => (api, frontend),
        (None, Some(_)) => return Err(RoutersUnavailable::Api),
        (Some(_), None) => return Err(RoutersUnavailable::Frontend),
        (None, None) => return Err(RoutersUnavailable::Both),
    };

    Ok(RouteTable {
        api_routes: records(api.route_entries(), project_root),
        frontend_routes: records(frontend.route_entries(), project_root),
    })
}

fn records(mut entries: Vec<RouteEntry>, project_root: &Path) -> Vec<RouteRecord> {
    entries.sort();
    entries
        .into_iter()
        .map(|entry| RouteRecord {
            file_path: entry
                .file_path
                .strip_prefix(project_root)
                .ok()
                .and_then(to_slash)
                .unwrap_or_else(|| entry.file_path.display().to_string()),
            path: entry.url_path,
        })
        .collect()
}
