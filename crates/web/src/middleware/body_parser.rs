//! Decodes form payloads and query strings into [`Body::Fields`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;
use thiserror::Error;
use tracing::trace;

use crate::handler::{Handler, HandlerResult};
use crate::router::Next;
use crate::{Body, Request, Response};

#[derive(Error, Debug)]
pub enum BodyParseError {
    #[error("malformed urlencoded data: {source}")]
    Urlencoded {
        #[from]
        source: serde_urlencoded::de::Error,
    },

    #[error("malformed multipart body: {reason}")]
    Multipart { reason: String },
}

impl BodyParseError {
    pub fn multipart<S: ToString>(str: S) -> Self {
        Self::Multipart { reason: str.to_string() }
    }
}

/// Returns the body parsing middleware.
///
/// `application/x-www-form-urlencoded` bodies and the text fields of
/// `multipart/form-data` bodies become [`Body::Fields`], together with the pairs of the
/// query string. A body field wins over a query pair with the same name. Requests with
/// neither keep their raw body.
pub fn body_parser() -> BodyParser {
    BodyParser
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BodyParser;

#[async_trait]
impl Handler for BodyParser {
    async fn call(&self, req: &mut Request, res: &mut Response<'_>, next: Next<'_>) -> HandlerResult {
        if let Some(fields) = parse_fields(req)? {
            trace!(fields = fields.len(), "request body parsed");
            *req.body_mut() = Body::Fields(fields);
        }
        next.run(req, res).await
    }
}

fn parse_fields(req: &Request) -> Result<Option<BTreeMap<String, String>>, BodyParseError> {
    let mut fields = BTreeMap::new();
    let mut parsed = false;

    if let Some(query) = req.query() {
        fields.extend(serde_urlencoded::from_str::<Vec<(String, String)>>(query)?);
        parsed = true;
    }

    let content_type = req.header("content-type").and_then(|value| value.parse::<Mime>().ok());
    if let (Some(content_type), Some(bytes)) = (content_type, req.body().as_bytes()) {
        if content_type.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
            fields.extend(serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes)?);
            parsed = true;
        } else if content_type.type_() == mime::MULTIPART && content_type.subtype() == mime::FORM_DATA {
            let boundary = content_type.get_param(mime::BOUNDARY).ok_or_else(|| BodyParseError::multipart("missing boundary"))?;
            fields.extend(parse_multipart(bytes, boundary.as_str())?);
            parsed = true;
        }
    }

    Ok(parsed.then_some(fields))
}

/// Collects the text fields of a `multipart/form-data` body, file parts are skipped.
fn parse_multipart(body: &Bytes, boundary: &str) -> Result<Vec<(String, String)>, BodyParseError> {
    let body = std::str::from_utf8(body).map_err(BodyParseError::multipart)?;
    let delimiter = format!("--{boundary}");

    let mut fields = Vec::new();
    for part in body.split(delimiter.as_str()).skip(1) {
        // the closing delimiter is followed by "--"
        if part.starts_with("--") {
            break;
        }

        let part = part.strip_prefix("\r\n").unwrap_or(part);
        let (head, content) = part.split_once("\r\n\r\n").ok_or_else(|| BodyParseError::multipart("part without header separator"))?;

        let Some(disposition) = head.lines().find(|line| line.to_ascii_lowercase().starts_with("content-disposition:")) else {
            return Err(BodyParseError::multipart("part without content-disposition"));
        };
        if disposition_param(disposition, "filename").is_some() {
            continue;
        }

        let name = disposition_param(disposition, "name").ok_or_else(|| BodyParseError::multipart("part without a name"))?;
        let value = content.strip_suffix("\r\n").unwrap_or(content);
        fields.push((name.to_string(), value.to_string()));
    }

    Ok(fields)
}

/// Finds `key="value"` among the `;` separated parameters of a header line.
fn disposition_param<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.split(';').skip(1).find_map(|param| {
        let (name, value) = param.trim().split_once('=')?;
        (name.eq_ignore_ascii_case(key)).then(|| value.trim_matches('"'))
    })
}
