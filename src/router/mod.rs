//! File-backed routers and the diagnostic route table.
//!
//! The dev server owns two [`FileRouter`]s: one for API handlers under
//! `<theme>/routes/api/` and one for front-end pages. [`assemble_routes`]
//! takes both handles explicitly and produces a [`RouteTable`] view; it
//! never caches anything.

mod file;
mod table;

pub use file::FileRouter;
pub use table::{RouteTable, RoutersUnavailable, assemble_routes};

use std::path::PathBuf;

/// One URL → backing file association.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RouteEntry {
    pub url_path: String,
    pub file_path: PathBuf,
}

/// Anything that can list its current routes.
pub trait RouteSource: Send + Sync {
    fn route_entries(&self) -> Vec<RouteEntry>;
}
