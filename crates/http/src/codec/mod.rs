//! HTTP codec module for encoding and decoding HTTP messages
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`parse_request`]: parses one buffer holding a whole request
//!   - [`RequestDecoder`]: decodes requests incrementally from a connection
//!   - Head parsing via the `header` module, body collection via the `body` module
//!   - [`build_request`]: the wire form of a request, the inverse of [`parse_request`]
//!
//! - Response handling:
//!   - [`build_response`]: serializes a head and body to bytes
//!   - [`ResponseEncoder`]: the same as a [`tokio_util::codec::Encoder`]
//!
//! # Example
//!
//! ```
//! use strand_http::codec::{build_response, parse_request};
//! use strand_http::protocol::ResponseBody;
//! use http::Response;
//!
//! let request = parse_request(b"GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
//! assert_eq!(request.uri().path(), "/hello");
//!
//! let head = Response::builder().status(200).body(()).unwrap();
//! let bytes = build_response(&head, &ResponseBody::from("hello")).unwrap();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

mod body;
mod header;
mod request_decoder;
mod request_encoder;
mod response_encoder;

pub use request_decoder::{MAX_BODY_BYTES, RequestDecoder, parse_request};
pub use request_encoder::build_request;
pub use response_encoder::{ResponseEncoder, build_response};
