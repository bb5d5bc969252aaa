use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameErrorKind {
    /// Header or a declared length does not fit the buffer.
    #[error("malformed")]
    Malformed,

    /// The message type nibble is not one this client understands.
    #[error("unknown message type")]
    UnknownType,

    #[error("decompression failed")]
    DecompressionFailed,

    /// The body was well formed but its JSON content could not be parsed.
    #[error("invalid payload")]
    InvalidPayload,

    /// The frame could not be serialized.
    #[error("encode failed")]
    EncodeFailed,
}

/// A frame could not be encoded or decoded.
///
/// `offset` is the byte position where the problem was found and `len` the
/// length of the buffer being processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} frame at byte {offset} of {len}: {detail}")]
pub struct FrameError {
    pub kind: FrameErrorKind,
    pub offset: usize,
    pub len: usize,
    pub detail: String,
}

impl FrameError {
    pub fn new(kind: FrameErrorKind, offset: usize, len: usize, detail: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            len,
            detail: detail.into(),
        }
    }
}
