//! Request cookies and the `Set-Cookie` builder.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use http::HeaderMap;
use http::header::{COOKIE, SET_COOKIE};

use crate::handler::{Handler, HandlerResult};
use crate::response::ResponseError;
use crate::router::Next;
use crate::{Request, Response};

/// The cookies a client sent, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies {
    values: BTreeMap<String, String>,
}

impl Cookies {
    /// Parses one `Cookie` header value, `name=value` pairs separated by `;`.
    ///
    /// Pairs without `=` are ignored. A repeated name keeps its last value.
    pub fn parse(header: &str) -> Self {
        let mut cookies = Self::default();
        cookies.extend_from(header);
        cookies
    }

    /// Collects every `Cookie` header of a request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::default();
        for value in headers.get_all(COOKIE) {
            if let Ok(value) = value.to_str() {
                cookies.extend_from(value);
            }
        }
        cookies
    }

    fn extend_from(&mut self, header: &str) {
        for pair in header.split(';') {
            if let Some((name, value)) = pair.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    self.values.insert(name.to_string(), value.trim().trim_matches('"').to_string());
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Returns the middleware that parses the `Cookie` headers into [`Cookies`],
/// readable through [`Request::cookie`].
pub fn cookie_parser() -> CookieParser {
    CookieParser
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CookieParser;

#[async_trait]
impl Handler for CookieParser {
    async fn call(&self, req: &mut Request, res: &mut Response<'_>, next: Next<'_>) -> HandlerResult {
        if req.extensions().get::<Cookies>().is_none() {
            let cookies = Cookies::from_headers(req.headers());
            req.extensions_mut().insert(cookies);
        }
        next.run(req, res).await
    }
}

impl Request {
    /// Returns the value of a cookie, once [`cookie_parser`] has run.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.extensions().get::<Cookies>()?.get(name)
    }

    /// Returns the parsed cookies, once [`cookie_parser`] has run.
    pub fn cookies(&self) -> Option<&Cookies> {
        self.extensions().get::<Cookies>()
    }
}

/// A cookie to send with [`Response::set_cookie`].
///
/// ```
/// use strand_web::middleware::Cookie;
///
/// let cookie = Cookie::new("theme", "dark").max_age(600).http_only(true);
/// assert_eq!(cookie.to_string(), "theme=dark; Max-Age=600; HttpOnly; Path=/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    max_age: Option<u64>,
    http_only: bool,
    secure: bool,
    path: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            http_only: false,
            secure: false,
            path: "/".to_string(),
        }
    }

    #[must_use]
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    #[must_use]
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        write!(f, "; Path={}", self.path)
    }
}

impl Response<'_> {
    /// Adds a `Set-Cookie` header, earlier cookies are kept.
    pub fn set_cookie(&mut self, cookie: &Cookie) -> Result<&mut Self, ResponseError> {
        self.append_header(SET_COOKIE, cookie.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Router;
    use crate::handler::handler_fn;
    use crate::response::tests::{received, writer};
    use bytes::Bytes;
    use futures::FutureExt;
    use http::Method;

    #[test]
    fn parse_cookie_header() {
        let cookies = Cookies::parse("sid=abc123; theme=dark ;broken; empty=; quoted=\"x\"");

        assert_eq!(cookies.len(), 4);
        assert_eq!(cookies.get("sid"), Some("abc123"));
        assert_eq!(cookies.get("theme"), Some("dark"));
        assert_eq!(cookies.get("empty"), Some(""));
        assert_eq!(cookies.get("quoted"), Some("x"));
        assert_eq!(cookies.get("broken"), None);
    }

    #[test]
    fn several_cookie_headers() {
        let raw = http::Request::builder()
            .uri("/")
            .header(COOKIE, "a=1")
            .header(COOKIE, "b=2; a=3")
            .body(Bytes::new())
            .unwrap();

        let cookies = Cookies::from_headers(raw.headers());
        assert_eq!(cookies.get("a"), Some("3"));
        assert_eq!(cookies.get("b"), Some("2"));
    }

    #[test]
    fn cookie_attributes() {
        assert_eq!(Cookie::new("a", "1").to_string(), "a=1; Path=/");
        assert_eq!(
            Cookie::new("sid", "x").max_age(3600).http_only(true).secure(true).path("/admin").to_string(),
            "sid=x; Max-Age=3600; HttpOnly; Secure; Path=/admin"
        );
    }

    #[tokio::test]
    async fn parser_exposes_cookies_and_response_sets_them() {
        let mut router = Router::new();
        router
            .use_middleware(cookie_parser())
            .unwrap()
            .get(
                "/",
                handler_fn(|req, res, _next| {
                    async move {
                        let theme = req.cookie("theme").unwrap_or("light").to_string();
                        res.set_cookie(&Cookie::new("seen", "1"))?.set_cookie(&Cookie::new("theme", theme.clone()))?;
                        res.send(theme).await?;
                        Ok(())
                    }
                    .boxed()
                }),
            )
            .unwrap();

        let raw = http::Request::builder()
            .method(Method::GET)
            .uri("/")
            .header(COOKIE, "theme=dark")
            .body(Bytes::new())
            .unwrap();
        let mut req = Request::from(raw);

        let (client, mut writer) = writer();
        let mut res = Response::new(&mut writer);
        router.handle(&mut req, &mut res).await.unwrap();
        drop(res);
        drop(writer);

        let output = received(client).await;
        assert!(output.contains("set-cookie: seen=1; Path=/\r\n"));
        assert!(output.contains("set-cookie: theme=dark; Path=/\r\n"));
        assert!(output.ends_with("dark"));
    }
}
