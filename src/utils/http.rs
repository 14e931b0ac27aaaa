//! Transport-independent request/response values.
//!
//! The dev server converts `tiny_http` requests into [`HttpRequest`] and
//! answers with [`HttpResponse`], so routing and fallback logic can be
//! exercised without a socket.

use super::mime::types::{HTML, JSON};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Other,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Raw request target, e.g. `/sub/b.html?x=1`.
    pub url: String,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    #[cfg(test)]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    #[cfg(test)]
    pub fn head(url: impl Into<String>) -> Self {
        Self::new(Method::Head, url)
    }

    /// Path component without query or fragment, still percent-encoded.
    pub fn path(&self) -> &str {
        let end = self.url.find(['?', '#']).unwrap_or(self.url.len());
        &self.url[..end]
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::Head
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    pub fn html(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, HTML, body)
    }

    pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, JSON, body)
    }

    /// Drop the body, keeping status and headers (HEAD).
    pub fn without_body(mut self) -> Self {
        self.body.clear();
        self
    }

    #[cfg(test)]
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_strips_query_and_fragment() {
        assert_eq!(HttpRequest::get("/a.html?x=1").path(), "/a.html");
        assert_eq!(HttpRequest::get("/a.html#top").path(), "/a.html");
        assert_eq!(HttpRequest::get("/").path(), "/");
        assert!(HttpRequest::head("/").is_head());
    }

    #[test]
    fn test_without_body() {
        let response = HttpResponse::html(404, "<p>missing</p>").without_body();
        assert_eq!(response.status, 404);
        assert_eq!(response.content_type, HTML);
        assert!(response.body.is_empty());
    }
}
