//! Runtime-agnostic building blocks for streaming speech services.
//!
//! - [`frame`]: the binary frame codec and the outbound audio chunk scheduler.
//! - [`auth`]: HMAC-SHA256 request signing for control-plane calls.
//! - [`envelope`]: JSON control envelopes and per-service request payloads.
//! - [`server_error`]: vendor error codes reported by the service.
//!
//! Nothing here performs I/O. The tokio client in
//! `volc-speech-tokio-client` drives these pieces over a WebSocket.

pub mod auth;
pub mod constants;
pub mod envelope;
pub mod frame;
pub mod server_error;
pub mod utils;
