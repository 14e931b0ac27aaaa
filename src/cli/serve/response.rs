//! Conversion between `tiny_http` and the transport-free request types.

use crate::utils::http::{HttpRequest, HttpResponse, Method};
use crate::utils::mime::types::PLAIN;
use anyhow::Result;
use tiny_http::{Header, Request, Response, StatusCode};

pub fn to_request(request: &Request) -> HttpRequest {
    let method = match request.method() {
        tiny_http::Method::Get => Method::Get,
        tiny_http::Method::Head => Method::Head,
        _ => Method::Other,
    };
    HttpRequest::new(method, request.url())
}

pub fn send(request: Request, response: HttpResponse) -> Result<()> {
    let mut reply =
        Response::from_data(response.body).with_status_code(StatusCode(response.status));
    if let Ok(header) = Header::from_bytes("Content-Type", response.content_type) {
        reply.add_header(header);
    }
    request.respond(reply)?;
    Ok(())
}

/// 503 while shutting down.
pub fn unavailable() -> HttpResponse {
    HttpResponse::new(503, PLAIN, "503 Service Unavailable")
}
