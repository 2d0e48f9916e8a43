//! HTTP header processing module for encoding and decoding heads
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes a request head from raw bytes
//!   - Start line and header field validation
//!   - Header count and size limits
//!
//! - [`HeaderEncoder`]: Encodes a response head to bytes
//!   - Status line with the registered reason phrase
//!   - `Content-Length` written from the body size

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
