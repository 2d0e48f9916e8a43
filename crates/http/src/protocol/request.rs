//! HTTP request header handling implementation.
//!
//! This module wraps the standard `http::Request` type to carry a parsed request head
//! until its body has been collected, and defines the connection metadata attached
//! to every request handed to a [`Handler`](crate::handler::Handler).

use std::net::SocketAddr;

use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};

/// Represents an HTTP request header.
///
/// This struct wraps a `http::Request<()>` to provide:
/// - Access to standard HTTP header fields
/// - Body attachment once the payload has been read
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
}

impl AsRef<Request<()>> for RequestHeader {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl AsMut<Request<()>> for RequestHeader {
    fn as_mut(&mut self) -> &mut Request<()> {
        &mut self.inner
    }
}

impl RequestHeader {
    /// Consumes the header and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Attaches a body to this header, converting it into a full `Request<T>`.
    pub fn body<T>(self, body: T) -> Request<T> {
        self.inner.map(|()| body)
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }
}

impl From<Parts> for RequestHeader {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()) }
    }
}

impl From<Request<()>> for RequestHeader {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}

/// The peer address of the connection a request arrived on.
///
/// Stored in the request extensions by the connection driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);

/// Returns the `path?query` form of the request target, exactly as received.
pub fn raw_target(uri: &Uri) -> &str {
    uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_body() {
        let header: RequestHeader = Request::builder()
            .method(Method::POST)
            .uri("/users?page=2")
            .body(())
            .unwrap()
            .into();

        assert_eq!(header.method(), &Method::POST);
        assert_eq!(header.uri().path(), "/users");

        let request = header.body("name=neo");
        assert_eq!(*request.body(), "name=neo");
        assert_eq!(raw_target(request.uri()), "/users?page=2");
    }

    #[test]
    fn raw_target_without_query() {
        let uri: Uri = "/index.html".parse().unwrap();
        assert_eq!(raw_target(&uri), "/index.html");
    }
}
