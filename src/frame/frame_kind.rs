use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The high nibble of header byte 1.
///
/// Only the kinds this client sends or understands are listed. Any other value
/// is rejected by [`FrameCodec::decode`](crate::frame::FrameCodec::decode).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum MessageType {
    /// Synthesis configuration sent by the client to start a task.
    FullClientRequest = 0b0001,
    /// Audio produced by the server, optionally carrying a sequence number.
    AudioOnlyResponse = 0b1011,
    /// Word/phoneme timestamps produced by the server.
    FrontendResponse = 0b1100,
    /// Vendor error code and message.
    ErrorResponse = 0b1111,
}

/// The high nibble of header byte 2.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum SerializationMethod {
    None = 0b0000,
    Json = 0b0001,
    Custom = 0b1111,
}

/// The low nibble of header byte 2.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum CompressionMethod {
    None = 0b0000,
    Gzip = 0b0001,
    /// Vendor specific; payloads are passed through untouched.
    Custom = 0b1111,
}
