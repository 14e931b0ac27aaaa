//! Last-resort error page.

use super::{ErrorContext, StatusClass};
use crate::utils::html::escape;
use crate::utils::http::HttpResponse;

/// Minimal inline document for a failed request. Only formats escaped
/// strings, so it cannot fail.
pub fn built_in_page(context: &ErrorContext<'_>) -> HttpResponse {
    let code = context.status_code();
    let reason = context.class.reason();
    let path = escape(context.path);

    let detail = match (context.class, context.error) {
        (StatusClass::NotFound, _) => format!("<p>Nothing is served at <code>{path}</code>.</p>"),
        (StatusClass::Error, Some(error)) => format!(
            "<p>Serving <code>{path}</code> failed.</p><pre>{}</pre>",
            escape(error)
        ),
        (StatusClass::Error, None) => format!("<p>Serving <code>{path}</code> failed.</p>"),
    };

    let body = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{code} {reason}</title></head>\
         <body><h1>{code} {reason}</h1>{detail}<p><a href=\"/\">Back to index</a></p></body></html>"
    );
    HttpResponse::html(code, body)
}
