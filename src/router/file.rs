//! Directory-scanning router.
//!
//! `index.<ext>` maps to its directory URL and every other file to its path
//! without extension, under a fixed prefix:
//!
//! | file (under dir) | prefix `/`  | prefix `/api`  |
//! |------------------|-------------|----------------|
//! | `index.html`     | `/`         | `/api`         |
//! | `blog/index.html`| `/blog`     | `/api/blog`    |
//! | `a/b.js`         | `/a/b`      | `/api/a/b`     |

use super::{RouteEntry, RouteSource};
use crate::debug;
use crate::discovery::walk_entries;
use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type RouteMap = BTreeMap<String, PathBuf>;

pub struct FileRouter {
    name: &'static str,
    dir: PathBuf,
    prefix: String,
    extensions: Vec<&'static str>,
    routes: ArcSwap<RouteMap>,
}

impl FileRouter {
    /// Create and scan. A missing directory yields an empty router.
    pub fn new(
        name: &'static str,
        dir: impl Into<PathBuf>,
        prefix: &str,
        extensions: &[&'static str],
    ) -> Self {
        let router = Self {
            name,
            dir: dir.into(),
            prefix: normalize_prefix(prefix),
            extensions: extensions.to_vec(),
            routes: ArcSwap::from_pointee(RouteMap::new()),
        };
        router.reload();
        router
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rescan the directory and swap in the new map. Returns the route count.
    pub fn reload(&self) -> usize {
        let routes = self.scan();
        let count = routes.len();
        self.routes.store(Arc::new(routes));
        debug!("router"; "{}: {} route(s)", self.name, count);
        count
    }

    fn scan(&self) -> RouteMap {
        let Ok(entries) = walk_entries(&self.dir, &self.extensions) else {
            return RouteMap::new();
        };

        let mut map = RouteMap::new();
        for found in entries {
            if let crate::discovery::Found::Entry(entry) = found {
                // First file wins when `a.html` and `a/index.html` collide
                map.entry(url_for(&self.prefix, &entry.relative_path))
                    .or_insert(entry.absolute_path);
            }
        }
        map
    }

    /// Look up a URL. A miss rescans once in case files appeared since the
    /// last scan.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let key = normalize_url(url_path);
        if let Some(path) = self.routes.load().get(&key) {
            return Some(path.clone());
        }
        self.reload();
        self.routes.load().get(&key).cloned()
    }

    pub fn snapshot(&self) -> Arc<RouteMap> {
        self.routes.load_full()
    }
}

impl RouteSource for FileRouter {
    fn route_entries(&self) -> Vec<RouteEntry> {
        self.snapshot()
            .iter()
            .map(|(url, file)| RouteEntry {
                url_path: url.clone(),
                file_path: file.clone(),
            })
            .collect()
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn normalize_url(url_path: &str) -> String {
    let trimmed = url_path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".into()
    } else if trimmed.starts_with('/') {
        trimmed.into()
    } else {
        format!("/{trimmed}")
    }
}

/// URL for a slash-separated path relative to the router root.
pub fn url_for(prefix: &str, relative: &str) -> String {
    let prefix = normalize_prefix(prefix);
    let without_ext = match relative.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() && !stem.ends_with('/') => stem,
        _ => relative,
    };
    let route = match without_ext.rsplit_once('/') {
        Some((dir, "index")) => dir,
        None if without_ext == "index" => "",
        _ => without_ext,
    };

    match (prefix.is_empty(), route.is_empty()) {
        (true, true) => "/".into(),
        (true, false) => format!("/{route}"),
        (false, true) => prefix,
        (false, false) => format!("{prefix}/{route}"),
    }
}
