use crate::{
    constants::{
        AUDIO_FLAGS_ACK, AUDIO_FLAGS_NEGATIVE_SEQUENCE, AUDIO_FLAGS_POSITIVE_SEQUENCE,
        FRAME_FIXED_HEADER_SIZE, FRAME_HEADER_WORD_SIZE, PROTOCOL_VERSION,
    },
    envelope::FrontendMessage,
    frame::{CompressionMethod, MessageType, SerializationMethod},
    server_error::ServerError,
};

/// The fixed 4-byte header plus any header extension words.
///
/// `reserved` and `extensions` are carried through encode/decode unchanged so a
/// decoded frame can be re-encoded byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// 4-bit protocol version.
    pub version: u8,

    pub message_type: MessageType,

    /// 4-bit flags whose meaning depends on `message_type`.
    ///
    /// For [`MessageType::AudioOnlyResponse`], `0` marks an acknowledgement
    /// without payload and any other value announces a sequence number.
    pub type_flags: u8,

    pub serialization: SerializationMethod,

    pub compression: CompressionMethod,

    /// Unused by the protocol today.
    pub reserved: u8,

    /// Raw header extension bytes. Always a multiple of 4 in length.
    pub extensions: Vec<u8>,
}

impl FrameHeader {
    pub fn new(
        message_type: MessageType,
        type_flags: u8,
        serialization: SerializationMethod,
        compression: CompressionMethod,
    ) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            message_type,
            type_flags,
            serialization,
            compression,
            reserved: 0,
            extensions: Vec::new(),
        }
    }

    /// Number of 4-byte words the header occupies on the wire.
    pub fn header_words(&self) -> usize {
        1 + self.extensions.len() / FRAME_HEADER_WORD_SIZE
    }

    /// Header length in bytes.
    pub fn byte_len(&self) -> usize {
        FRAME_FIXED_HEADER_SIZE + self.extensions.len()
    }
}

/// One sequence-numbered slice of synthesized audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    /// Signed sequence number. Negative marks the last audio frame of the stream.
    pub sequence: i32,
    pub audio: Vec<u8>,
}

impl AudioChunk {
    pub fn is_final(&self) -> bool {
        self.sequence < 0
    }
}

/// The decoded, message-type specific part of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBody {
    /// Client configuration payload, already decompressed.
    ClientRequest { payload: Vec<u8> },

    /// Audio-only response without a sequence number.
    AudioAck,

    Audio(AudioChunk),

    /// Timestamp information with the nested JSON already unwrapped.
    Frontend(FrontendMessage),

    Error(ServerError),
}

/// One binary protocol unit exchanged over the duplex transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub header: FrameHeader,
    pub body: FrameBody,
}

impl Frame {
    /// A JSON configuration request, as sent to start a synthesis task.
    pub fn full_client_request(payload: Vec<u8>, compression: CompressionMethod) -> Self {
        Self {
            header: FrameHeader::new(
                MessageType::FullClientRequest,
                0,
                SerializationMethod::Json,
                compression,
            ),
            body: FrameBody::ClientRequest { payload },
        }
    }

    pub fn audio_ack() -> Self {
        Self {
            header: FrameHeader::new(
                MessageType::AudioOnlyResponse,
                AUDIO_FLAGS_ACK,
                SerializationMethod::None,
                CompressionMethod::None,
            ),
            body: FrameBody::AudioAck,
        }
    }

    pub fn audio(sequence: i32, audio: Vec<u8>) -> Self {
        let type_flags = if sequence < 0 {
            AUDIO_FLAGS_NEGATIVE_SEQUENCE
        } else {
            AUDIO_FLAGS_POSITIVE_SEQUENCE
        };

        Self {
            header: FrameHeader::new(
                MessageType::AudioOnlyResponse,
                type_flags,
                SerializationMethod::None,
                CompressionMethod::None,
            ),
            body: FrameBody::Audio(AudioChunk { sequence, audio }),
        }
    }

    pub fn frontend(message: FrontendMessage, compression: CompressionMethod) -> Self {
        Self {
            header: FrameHeader::new(
                MessageType::FrontendResponse,
                0,
                SerializationMethod::Json,
                compression,
            ),
            body: FrameBody::Frontend(message),
        }
    }

    pub fn error(error: ServerError, compression: CompressionMethod) -> Self {
        Self {
            header: FrameHeader::new(
                MessageType::ErrorResponse,
                0,
                SerializationMethod::None,
                compression,
            ),
            body: FrameBody::Error(error),
        }
    }

    /// `true` for the audio frame that ends the stream.
    pub fn is_final(&self) -> bool {
        matches!(&self.body, FrameBody::Audio(chunk) if chunk.is_final())
    }
}
