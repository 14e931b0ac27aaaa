//! Error response fallback chain.
//!
//! A failed request first goes to the site's handler for its status class
//! (see [`ErrorHandlers`]). When there is none, or it fails or panics, a
//! built-in page is synthesized instead. Handler failures are logged and
//! never reach the client.

mod builtin;
mod template;

pub use builtin::built_in_page;
pub use template::TemplateHandler;

use crate::utils::http::{HttpRequest, HttpResponse};
use crate::{debug, log};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Status class a handler is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    NotFound,
    Error,
}

impl StatusClass {
    pub const fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Error => 500,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Self::NotFound => "Not Found",
            Self::Error => "Internal Server Error",
        }
    }
}

/// What went wrong, as seen by a handler.
#[derive(Debug, Clone)]
pub struct ErrorContext<'a> {
    pub class: StatusClass,
    /// Decoded request path.
    pub path: &'a str,
    /// Internal error message, present for [`StatusClass::Error`].
    pub error: Option<&'a str>,
}

impl<'a> ErrorContext<'a> {
    pub fn not_found(path: &'a str) -> Self {
        Self {
            class: StatusClass::NotFound,
            path,
            error: None,
        }
    }

    pub fn error(path: &'a str, error: &'a str) -> Self {
        Self {
            class: StatusClass::Error,
            path,
            error: Some(error),
        }
    }

    pub const fn status_code(&self) -> u16 {
        self.class.status_code()
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("error handler template `{}` not found", path.display())]
    Missing { path: PathBuf },

    #[error("error handler failed: {0}")]
    Failed(String),

    #[error("error handler panicked: {0}")]
    Panicked(String),
}

/// A site-supplied error page producer.
pub trait ErrorHandler: Send + Sync {
    fn handle(
        &self,
        request: &HttpRequest,
        context: &ErrorContext<'_>,
    ) -> Result<HttpResponse, HandlerError>;
}

/// Which tier produced an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
    Custom,
    BuiltIn,
}

impl fmt::Display for FallbackDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Custom => "custom",
            Self::BuiltIn => "built-in",
        })
    }
}

/// Response produced by the chain, tagged with its origin.
#[derive(Debug)]
pub struct Fallback {
    pub response: HttpResponse,
    pub decision: FallbackDecision,
}

/// Registry of handlers per status class.
#[derive(Default)]
pub struct ErrorHandlers {
    not_found: Option<Box<dyn ErrorHandler>>,
    error: Option<Box<dyn ErrorHandler>>,
}

impl ErrorHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// `404.html` and `error.html` templates from a theme's routes directory.
    pub fn from_templates(routes_dir: &Path) -> Self {
        Self::new()
            .with(StatusClass::NotFound, TemplateHandler::not_found(routes_dir))
            .with(StatusClass::Error, TemplateHandler::error(routes_dir))
    }

    pub fn with(mut self, class: StatusClass, handler: impl ErrorHandler + 'static) -> Self {
        let slot = match class {
            StatusClass::NotFound => &mut self.not_found,
            StatusClass::Error => &mut self.error,
        };
        *slot = Some(Box::new(handler));
        self
    }

    pub fn get(&self, class: StatusClass) -> Option<&dyn ErrorHandler> {
        match class {
            StatusClass::NotFound => self.not_found.as_deref(),
            StatusClass::Error => self.error.as_deref(),
        }
    }

    /// Produce the error response for a request. Never fails.
    pub fn respond(&self, request: &HttpRequest, context: &ErrorContext<'_>) -> Fallback {
        if let Some(handler) = self.get(context.class) {
            match run_handler(handler, request, context) {
                Ok(response) => {
                    return Fallback {
                        response,
                        decision: FallbackDecision::Custom,
                    };
                }
                Err(e @ HandlerError::Missing { .. }) => debug!("serve"; "{e}"),
                Err(e) => log!("warning"; "{}: {e}", context.path),
            }
        }

        Fallback {
            response: built_in_page(context),
            decision: FallbackDecision::BuiltIn,
        }
    }
}

fn run_handler(
    handler: &dyn ErrorHandler,
    request: &HttpRequest,
    context: &ErrorContext<'_>,
) -> Result<HttpResponse, HandlerError> {
    panic::catch_unwind(AssertUnwindSafe(|| handler.handle(request, context)))
        .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".into()
    }
}
