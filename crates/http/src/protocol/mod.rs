//! Core HTTP protocol abstractions.
//!
//! This module provides the building blocks shared by the codec and the connection
//! driver:
//!
//! - **Request Processing** ([`request`]): [`RequestHeader`] wraps a parsed request head,
//!   [`RemoteAddr`] carries the peer address of the connection
//! - **Response Processing** ([`response`]): [`ResponseHead`] and the single-write [`ResponseBody`]
//! - **Static tables**: [`status`] reason phrases and [`mime_types`] extension lookups
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Malformed request messages
//!   - [`SendError`]: Response sending errors

mod request;
pub use request::RemoteAddr;
pub use request::RequestHeader;
pub use request::raw_target;

mod response;
pub use response::ResponseBody;
pub use response::ResponseHead;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::UnknownExtension;
pub use error::UnknownStatus;

pub mod mime_types;
pub mod status;
