//! Request routing.
//!
//! [`handle`] maps one [`HttpRequest`] to one [`HttpResponse`] and keeps no
//! state between calls beyond the routers' scan caches.

use super::index;
use super::path::{ServeAccess, ServeMode, decode_path, is_extensionless, resolve_file};
use crate::debug;
use crate::discovery::{PAGE_EXTENSION, discover_entries};
use crate::fallback::{ErrorContext, ErrorHandlers};
use crate::router::{FileRouter, RouteTable, RoutersUnavailable, assemble_routes};
use crate::theme::ResolvedSite;
use crate::utils::http::{HttpRequest, HttpResponse, Method};
use crate::utils::mime::{self, types::PLAIN};
use crate::utils::path::is_within;
use std::fs;
use std::path::{Path, PathBuf};

pub const ROUTES_ENDPOINT: &str = "/__routes";
pub const API_PREFIX: &str = "/api";
/// Subdirectory of the theme's routes holding API handlers.
pub const API_DIR: &str = "api";
pub const API_EXTENSIONS: &[&str] = &["js", "mjs", "ts", "json"];

pub struct ServeContext {
    project_root: PathBuf,
    serve_root: PathBuf,
    access: ServeAccess,
    api: FileRouter,
    pages: FileRouter,
    handlers: ErrorHandlers,
}

impl ServeContext {
    pub fn new(resolved: &ResolvedSite, mode: ServeMode) -> Self {
        let ResolvedSite { site, theme } = resolved;
        let serve_root = match mode {
            ServeMode::Source => theme.pages_path.clone(),
            ServeMode::Built => site.build.output.clone(),
        };

        Self {
            project_root: site.get_root().to_path_buf(),
            access: ServeAccess::new(mode, &site.build.passthrough),
            api: FileRouter::new("api", theme.routes_path.join(API_DIR), API_PREFIX, API_EXTENSIONS),
            pages: FileRouter::new("pages", &serve_root, "/", &[PAGE_EXTENSION]),
            handlers: ErrorHandlers::from_templates(&theme.routes_path),
            serve_root,
        }
    }

    #[cfg(test)]
    pub fn with_handlers(mut self, handlers: ErrorHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn serve_root(&self) -> &Path {
        &self.serve_root
    }

    pub const fn mode(&self) -> ServeMode {
        self.access.mode()
    }

    /// Current route table of both routers.
    pub fn routes(&self) -> Result<RouteTable, RoutersUnavailable> {
        assemble_routes(Some(&self.api), Some(&self.pages), &self.project_root)
    }
}

/// Answer one request. Always produces a response.
pub fn handle(ctx: &ServeContext, request: &HttpRequest) -> HttpResponse {
    let response = match request.method {
        Method::Get | Method::Head => route(ctx, request),
        Method::Other => HttpResponse::new(405, PLAIN, "405 Method Not Allowed"),
    };

    debug!("serve"; "{:?} {} -> {}", request.method, request.url, response.status);

    if request.is_head() {
        response.without_body()
    } else {
        response
    }
}

fn route(ctx: &ServeContext, request: &HttpRequest) -> HttpResponse {
    let Some(path) = decode_path(request.path()) else {
        return not_found(ctx, request, request.path());
    };

    match path.as_str() {
        "" | "/" => index_page(ctx, request),
        ROUTES_ENDPOINT => route_table(ctx),
        p if is_api(p) => api(ctx, request, p),
        p => page(ctx, request, p),
    }
}

fn is_api(path: &str) -> bool {
    path.strip_prefix(API_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn index_page(ctx: &ServeContext, request: &HttpRequest) -> HttpResponse {
    match discover_entries(&ctx.serve_root) {
        Ok(mut discovery) => {
            for warning in &discovery.warnings {
                debug!("serve"; "index: {warning}");
            }
            // List only what `page` would serve
            discovery
                .entries
                .retain(|entry| is_within(&entry.absolute_path, &ctx.serve_root).is_some());
            HttpResponse::html(200, index::render(&discovery.sorted()))
        }
        Err(e) => internal_error(ctx, request, "/", &e.to_string()),
    }
}

fn route_table(ctx: &ServeContext) -> HttpResponse {
    match ctx.routes() {
        Ok(table) => HttpResponse::json(200, table.to_json(true)),
        Err(e) => HttpResponse::json(500, e.to_json()),
    }
}

fn api(ctx: &ServeContext, request: &HttpRequest, path: &str) -> HttpResponse {
    let file = ctx
        .api
        .resolve(path)
        .and_then(|file| is_within(&file, ctx.api.dir()));
    match file {
        Some(file) => send_file(ctx, request, path, &file),
        None => not_found(ctx, request, path),
    }
}

fn page(ctx: &ServeContext, request: &HttpRequest, path: &str) -> HttpResponse {
    if let Some(file) = resolve_file(path, &ctx.serve_root, &ctx.access) {
        return send_file(ctx, request, path, &file);
    }

    // `/about` → `about.html` through the page router
    if is_extensionless(path)
        && let Some(file) = ctx.pages.resolve(path)
        && let Some(file) = is_within(&file, &ctx.serve_root)
    {
        return send_file(ctx, request, path, &file);
    }

    not_found(ctx, request, path)
}

fn send_file(ctx: &ServeContext, request: &HttpRequest, path: &str, file: &Path) -> HttpResponse {
    match fs::read(file) {
        Ok(body) => HttpResponse::new(200, mime::from_path(file), body),
        Err(e) => internal_error(ctx, request, path, &format!("failed to read {}: {e}", file.display())),
    }
}

fn not_found(ctx: &ServeContext, request: &HttpRequest, path: &str) -> HttpResponse {
    let fallback = ctx.handlers.respond(request, &ErrorContext::not_found(path));
    debug!("serve"; "{path}: 404 ({})", fallback.decision);
    fallback.response
}

fn internal_error(ctx: &ServeContext, request: &HttpRequest, path: &str, error: &str) -> HttpResponse {
    let fallback = ctx.handlers.respond(request, &ErrorContext::error(path, error));
    debug!("serve"; "{path}: 500 ({})", fallback.decision);
    fallback.response
}
