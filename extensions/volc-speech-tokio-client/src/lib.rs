//! Tokio client for streaming speech synthesis and voice conversion.
//!
//! [`session::StreamSession`] drives one task over a duplex transport. The
//! service specifics live in [`protocol`]; [`clients`] wraps both in a
//! convenient call. Control-plane calls (token issuance, voice-clone
//! speakers) are in [`open_api`] and [`token`].

pub mod clients;
pub mod config;
pub mod constants;
pub mod error;
pub mod open_api;
pub mod protocol;
pub mod session;
pub mod token;
pub mod transport;

pub use clients::{SynthesisClient, VoiceConversionClient};
pub use config::{OpenApiConfig, SessionOptions, SynthesisConfig, VoiceConversionConfig};
pub use error::{ApiError, ProtocolError, SessionError, StartupError, TokenError, TransportError};
