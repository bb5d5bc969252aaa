use thiserror::Error;

/// A request input that cannot be put into canonical form.
///
/// A request that fails to canonicalize is never signed, and so never sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("request method is empty")]
    EmptyMethod,

    #[error("request path {0:?} does not start with '/'")]
    InvalidPath(String),

    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),

    #[error("value of header {0:?} contains control characters")]
    InvalidHeaderValue(String),

    #[error("signing key rejected: {0}")]
    InvalidKey(String),
}
