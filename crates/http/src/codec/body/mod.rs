//! Request and response body handling.
//!
//! Bodies are handled whole: the request side collects the `Content-Length` bytes
//! before the request is handed over, the response side writes a body that is fully
//! known before the head goes out.
//!
//! # Components
//!
//! - [`LengthDecoder`]: collects a fixed-length request body
//! - [`BodyEncoder`]: serializes a [`ResponseBody`](crate::protocol::ResponseBody)

mod body_encoder;
mod length_decoder;

pub use body_encoder::BodyEncoder;
pub use length_decoder::LengthDecoder;
