//! Query-string extractor core for the proprietary API.
//!
//! # Overview
//! Turns a `RequestDescriptor` (raw URL plus headers) into a
//! `ResponseEnvelope` without touching the network (host-does-IO pattern).
//! The host runtime receives the request, builds the descriptor, calls
//! [`extract`] and serializes the envelope back to its client.
//!
//! # Design
//! - `extract` is a pure function: no state survives a call.
//! - Relative URLs are resolved against `http://{host}` taken from the
//!   request's `Host` header; absolute URLs need no host.
//! - Query decoding follows `application/x-www-form-urlencoded` rules, and a
//!   repeated key keeps its first position but its last value.
//! - Types use owned `String` / `Vec` fields so the FFI crate can map them
//!   without lifetimes.

pub mod error;
pub mod extract;
pub mod http;
pub mod types;

pub use error::{ExtractError, MalformedReason};
pub use extract::{extract, extract_json};
pub use http::RequestDescriptor;
pub use types::{QueryMap, ResponseEnvelope, MESSAGE};
