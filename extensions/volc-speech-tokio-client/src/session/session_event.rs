use volc_speech::envelope::{ControlResponse, Frontend};

/// One decoded inbound unit, delivered to the caller in receipt order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Converted or synthesized audio. Never empty.
    Audio(Vec<u8>),
    /// Word and phoneme timestamps of synthesized text.
    Timestamps(Frontend),
    /// A JSON control envelope from the server.
    Status(ControlResponse),
}
