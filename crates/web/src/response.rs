//! The application side of a response.
//!
//! A [`Response`] is bound to the [`ResponseWriter`] of its connection. Handlers set
//! the status and headers, then one terminal call (`send`, `send_with`, `end`, `json`
//! or `render`) writes everything and closes the connection.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use strand_http::connection::ResponseWriter;
use strand_http::protocol::{ResponseBody, ResponseHead, SendError, UnknownStatus, mime_types, status};
use thiserror::Error;
use tracing::debug;

use crate::date::DateService;

const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");
const POWERED_BY: HeaderValue = HeaderValue::from_static("strand");

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("response has already been sent")]
    AlreadySent,

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("can't serialize body: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },

    #[error("can't read {path}: {source}")]
    Render { path: PathBuf, source: io::Error },

    #[error("send error: {source}")]
    Send { source: SendError },
}

impl ResponseError {
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }
}

impl From<SendError> for ResponseError {
    fn from(source: SendError) -> Self {
        match source {
            SendError::AlreadySent => ResponseError::AlreadySent,
            source => ResponseError::Send { source },
        }
    }
}

/// The response of one request, written at most once.
#[derive(Debug)]
pub struct Response<'w> {
    head: ResponseHead,
    writer: &'w mut ResponseWriter,
    views: Option<Arc<Path>>,
}

impl<'w> Response<'w> {
    /// Creates a `200 OK` response with the default headers: `Date`, `Connection: close`,
    /// `Content-Type: text/plain` and `X-Powered-By`.
    pub fn new(writer: &'w mut ResponseWriter) -> Self {
        let mut head = ResponseHead::default();
        let headers = head.headers_mut();

        DateService::get_global_instance().with_http_date(|date| {
            headers.insert(header::DATE, date);
        });
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert(X_POWERED_BY, POWERED_BY);

        Self { head, writer, views: None }
    }

    /// Sets the directory [`render`](Self::render) resolves paths against.
    #[must_use]
    pub fn with_views(mut self, views: Option<Arc<Path>>) -> Self {
        self.views = views;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.head.status()
    }

    /// Replaces the status.
    ///
    /// # Errors
    ///
    /// [`ResponseError::UnknownStatus`] if `code` has no registered reason phrase.
    pub fn set_status(&mut self, code: u16) -> Result<&mut Self, ResponseError> {
        status::reason_phrase(code)?;
        *self.head.status_mut() = StatusCode::from_u16(code).ok().ok_or(UnknownStatus(code))?;
        Ok(self)
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.head.headers_mut()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers().get(name).and_then(|value| value.to_str().ok())
    }

    /// Sets a header, replacing every previous value of it.
    ///
    /// # Errors
    ///
    /// [`ResponseError::InvalidHeader`] if the name or the value is not valid.
    pub fn set_header<K, V>(&mut self, name: K, value: V) -> Result<&mut Self, ResponseError>
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Display,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Display,
    {
        let (name, value) = header_pair(name, value)?;
        self.head.headers_mut().insert(name, value);
        Ok(self)
    }

    /// Sets every header of `headers`, later values win.
    ///
    /// # Errors
    ///
    /// [`ResponseError::InvalidHeader`] on the first invalid pair, the pairs before it
    /// are kept.
    pub fn set_headers<I, K, V>(&mut self, headers: I) -> Result<&mut Self, ResponseError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Display,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Display,
    {
        for (name, value) in headers {
            self.set_header(name, value)?;
        }
        Ok(self)
    }

    /// Adds a value to a header, keeping the existing ones.
    ///
    /// # Errors
    ///
    /// [`ResponseError::InvalidHeader`] if the name or the value is not valid.
    pub fn append_header<K, V>(&mut self, name: K, value: V) -> Result<&mut Self, ResponseError>
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Display,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Display,
    {
        let (name, value) = header_pair(name, value)?;
        self.head.headers_mut().append(name, value);
        Ok(self)
    }

    #[inline]
    pub fn is_sent(&self) -> bool {
        self.writer.is_sent()
    }

    /// Sends `body`, with a `Content-Type` inferred from it.
    ///
    /// # Errors
    ///
    /// See [`send_with`](Self::send_with).
    pub async fn send(&mut self, body: impl Into<ResponseBody>) -> Result<(), ResponseError> {
        self.send_with(body, true).await
    }

    /// Sends `body` and closes the connection.
    ///
    /// With `auto_content_type`, structured bodies are sent as `application/json` and
    /// everything else as `text/html`. Otherwise the current `Content-Type` is kept.
    ///
    /// # Errors
    ///
    /// - [`ResponseError::AlreadySent`] if a response went out already
    /// - [`ResponseError::Send`] if writing to the connection fails
    pub async fn send_with(&mut self, body: impl Into<ResponseBody>, auto_content_type: bool) -> Result<(), ResponseError> {
        if self.is_sent() {
            return Err(ResponseError::AlreadySent);
        }

        let body = body.into();
        if auto_content_type {
            let content_type = if body.is_structured() { mime::APPLICATION_JSON } else { mime::TEXT_HTML };
            let content_type = HeaderValue::from_str(content_type.as_ref()).map_err(ResponseError::invalid_header)?;
            self.head.headers_mut().insert(header::CONTENT_TYPE, content_type);
        }

        self.end(body).await
    }

    /// Sends `body` as it is and closes the connection.
    ///
    /// # Errors
    ///
    /// See [`send_with`](Self::send_with).
    pub async fn end(&mut self, body: impl Into<ResponseBody>) -> Result<(), ResponseError> {
        let body = body.into();
        debug!(status = self.head.status().as_u16(), "sending response");
        self.writer.send(&self.head, &body).await?;
        Ok(())
    }

    /// Serializes `value` to JSON and sends it as `application/json`.
    ///
    /// # Errors
    ///
    /// [`ResponseError::Serialize`] if `value` can't be represented as JSON, otherwise
    /// see [`send_with`](Self::send_with).
    pub async fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ResponseError> {
        let value = serde_json::to_value(value)?;
        self.send_with(value, true).await
    }

    /// Sends the content of a file, found relative to the views directory when one is
    /// configured, with the MIME type of its extension.
    ///
    /// # Errors
    ///
    /// [`ResponseError::Render`] if the file can't be read, otherwise see
    /// [`send_with`](Self::send_with).
    pub async fn render(&mut self, path: impl AsRef<Path>) -> Result<(), ResponseError> {
        let path = path.as_ref();
        let full_path = match &self.views {
            Some(views) => views.join(path),
            None => path.to_path_buf(),
        };

        let content = tokio::fs::read(&full_path).await.map_err(|source| ResponseError::Render { path: full_path.clone(), source })?;

        let mime = mime_types::from_path(&full_path);
        let content_type = HeaderValue::from_str(mime.as_ref()).map_err(ResponseError::invalid_header)?;
        self.head.headers_mut().insert(header::CONTENT_TYPE, content_type);

        self.send_with(content, false).await
    }
}

fn header_pair<K, V>(name: K, value: V) -> Result<(HeaderName, HeaderValue), ResponseError>
where
    K: TryInto<HeaderName>,
    K::Error: std::fmt::Display,
    V: TryInto<HeaderValue>,
    V::Error: std::fmt::Display,
{
    let name = name.try_into().map_err(ResponseError::invalid_header)?;
    let value = value.try_into().map_err(ResponseError::invalid_header)?;
    Ok((name, value))
}
