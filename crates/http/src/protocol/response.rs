//! HTTP response head and body types.
//!
//! The head uses the standard `http::Response` type with an empty body placeholder,
//! the body is one of the few shapes a handler can send in a single write.

use bytes::Bytes;
use http::Response;
use serde_json::Value;

/// Type alias for HTTP response headers.
///
/// This type represents the header portion of an HTTP response, using
/// `http::Response<()>` with an empty body placeholder.
pub type ResponseHead = Response<()>;

/// The body of a response, written in one piece after the head.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    /// Textual or binary content, written byte for byte.
    Bytes(Bytes),
    /// Structured content, written as JSON.
    Json(Value),
}

impl ResponseBody {
    /// Returns true for bodies that serialize as JSON.
    #[inline]
    pub fn is_structured(&self) -> bool {
        matches!(self, ResponseBody::Json(_))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        match self {
            ResponseBody::Empty => true,
            ResponseBody::Bytes(bytes) => bytes.is_empty(),
            ResponseBody::Json(_) => false,
        }
    }
}

impl From<()> for ResponseBody {
    fn from((): ()) -> Self {
        ResponseBody::Empty
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        ResponseBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(vec: Vec<u8>) -> Self {
        ResponseBody::Bytes(Bytes::from(vec))
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        ResponseBody::Bytes(Bytes::from(value))
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        ResponseBody::Bytes(Bytes::from_static(value.as_bytes()))
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        ResponseBody::Json(value)
    }
}

impl<T: Into<ResponseBody>> From<Option<T>> for ResponseBody {
    fn from(option: Option<T>) -> Self {
        option.map_or(ResponseBody::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_bodies() {
        assert!(ResponseBody::from(json!({"id": 1})).is_structured());
        assert!(ResponseBody::from(json!([1, 2])).is_structured());
        assert!(!ResponseBody::from("hello").is_structured());
    }

    #[test]
    fn empty_bodies() {
        assert!(ResponseBody::from(()).is_empty());
        assert!(ResponseBody::from("").is_empty());
        assert!(ResponseBody::from(None::<String>).is_empty());
        assert!(!ResponseBody::from(Some("x")).is_empty());
    }
}
