//! Theme-supplied error pages.
//!
//! Templates are plain HTML files read on every request, so edits show up
//! without restarting the server. Placeholders:
//!
//! - `{{path}}` - the requested path
//! - `{{error}}` - internal error message (empty for 404)
//! - `{{statusCode}}` - numeric status
//!
//! Substituted values are HTML-escaped.

use super::{ErrorContext, ErrorHandler, HandlerError};
use crate::utils::html::escape;
use crate::utils::http::{HttpRequest, HttpResponse};
use regex::{Captures, Regex};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const NOT_FOUND_TEMPLATE: &str = "404.html";
pub const ERROR_TEMPLATE: &str = "error.html";

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*(path|error|statusCode)\s*\}\}").unwrap())
}

#[derive(Debug, Clone)]
pub struct TemplateHandler {
    file: PathBuf,
}

impl TemplateHandler {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn not_found(routes_dir: &Path) -> Self {
        Self::new(routes_dir.join(NOT_FOUND_TEMPLATE))
    }

    pub fn error(routes_dir: &Path) -> Self {
        Self::new(routes_dir.join(ERROR_TEMPLATE))
    }

    fn load(&self) -> Result<String, HandlerError> {
        fs::read_to_string(&self.file).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => HandlerError::Missing {
                path: self.file.clone(),
            },
            _ => HandlerError::Failed(format!("{}: {e}", self.file.display())),
        })
    }
}

impl ErrorHandler for TemplateHandler {
    fn handle(
        &self,
        _request: &HttpRequest,
        context: &ErrorContext<'_>,
    ) -> Result<HttpResponse, HandlerError> {
        let template = self.load()?;
        Ok(HttpResponse::html(
            context.status_code(),
            render(&template, context),
        ))
    }
}

fn render(template: &str, context: &ErrorContext<'_>) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "path" => escape(context.path).into_owned(),
            "error" => escape(context.error.unwrap_or_default()).into_owned(),
            _ => context.status_code().to_string(),
        })
        .into_owned()
}
