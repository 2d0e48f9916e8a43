//! Request handling module that provides access to HTTP request information and path parameters.
//!
//! This module contains the core types for working with requests in the router:
//! - `Request`: one parsed message plus everything the router and middlewares attach to it
//! - `Body`: raw bytes until a body parser turns them into fields
//! - `PathParams`: values extracted from the path by the matched route

use std::collections::BTreeMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::{Extensions, HeaderMap, Method, Uri, Version};
use strand_http::protocol::{RemoteAddr, raw_target};

/// The body of a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Bytes following the request head, as received.
    Raw(Bytes),
    /// Decoded form fields, see [`body_parser`](crate::middleware::body_parser).
    Fields(BTreeMap<String, String>),
}

impl Body {
    /// Returns the raw bytes, `None` once the body was parsed into fields.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Raw(bytes) => Some(bytes),
            Body::Fields(_) => None,
        }
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Body::Raw(_) => None,
            Body::Fields(fields) => Some(fields),
        }
    }

    /// Looks up one parsed field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields().and_then(|fields| fields.get(name)).map(String::as_str)
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Raw(Bytes::new())
    }
}

/// One request flowing through the router.
///
/// The method, target, version and headers are fixed once parsed. The body, the path
/// parameters and the extensions are what handlers and middlewares may change.
#[derive(Debug)]
pub struct Request {
    inner: http::Request<Body>,
    remote_addr: Option<SocketAddr>,
    params: PathParams,
}

impl Request {
    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns the path of the request target, without the query string
    pub fn uri(&self) -> &str {
        self.inner.uri().path()
    }

    /// Returns the request target as received, query string included
    pub fn raw_uri(&self) -> &str {
        raw_target(self.inner.uri())
    }

    /// Returns the parsed request target
    pub fn target(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the query string, if any
    pub fn query(&self) -> Option<&str> {
        self.inner.uri().query()
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns the value of a header, `None` if it's missing or not visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> &Body {
        self.inner.body()
    }

    pub fn body_mut(&mut self) -> &mut Body {
        self.inner.body_mut()
    }

    /// Returns the peer address of the connection
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Returns the path parameters of the route currently processing the request
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Shorthand for `params().get(name)`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub(crate) fn set_params(&mut self, params: PathParams) {
        self.params = params;
    }

    /// Typed values attached by middlewares
    pub fn extensions(&self) -> &Extensions {
        self.inner.extensions()
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        self.inner.extensions_mut()
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(request: http::Request<Bytes>) -> Self {
        let remote_addr = request.extensions().get::<RemoteAddr>().map(|RemoteAddr(addr)| *addr);
        Self { inner: request.map(Body::Raw), remote_addr, params: PathParams::empty() }
    }
}

/// Represents path parameters extracted from the URL path of a request.
///
/// For the route `/users/:id`, "id" is a path parameter. Parameters keep the order in
/// which they appear in the route template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name
    /// Returns None if the parameter doesn't exist
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.params.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self { params: iter.into_iter().collect() }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a request the way the connection driver hands it over.
    pub(crate) fn request(method: Method, target: &str, body: &'static str) -> Request {
        let mut request = http::Request::builder().method(method).uri(target).body(Bytes::from_static(body.as_bytes())).unwrap();
        request.extensions_mut().insert(RemoteAddr("10.0.0.7:51000".parse().unwrap()));
        Request::from(request)
    }

    #[test]
    fn accessors() {
        let req = request(Method::GET, "/search?q=rust&page=2", "");

        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.uri(), "/search");
        assert_eq!(req.raw_uri(), "/search?q=rust&page=2");
        assert_eq!(req.query(), Some("q=rust&page=2"));
        assert_eq!(req.remote_addr(), Some("10.0.0.7:51000".parse().unwrap()));
        assert!(req.params().is_empty());
        assert_eq!(req.body(), &Body::Raw(Bytes::new()));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let raw = http::Request::builder().uri("/").header("X-Trace-Id", "abc").body(Bytes::new()).unwrap();
        let req = Request::from(raw);

        assert_eq!(req.header("x-trace-id"), Some("abc"));
        assert_eq!(req.header("X-TRACE-ID"), Some("abc"));
        assert_eq!(req.header("missing"), None);
        assert_eq!(req.remote_addr(), None);
    }

    #[test]
    fn path_params() {
        let params: PathParams = vec![("id".to_string(), "42".to_string()), ("postId".to_string(), "7".to_string())].into_iter().collect();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("postId"), Some("7"));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["id", "postId"]);
    }

    #[test]
    fn body_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), "neo".to_string());
        let body = Body::Fields(fields);

        assert_eq!(body.field("name"), Some("neo"));
        assert_eq!(body.field("age"), None);
        assert!(body.as_bytes().is_none());
    }
}
