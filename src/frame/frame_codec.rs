use crate::{
    constants::{
        AUDIO_FLAGS_ACK, FRAME_FIELD_SIZE, FRAME_FIXED_HEADER_SIZE, FRAME_HEADER_WORD_SIZE,
        FRAME_MAX_HEADER_WORDS,
    },
    envelope::FrontendMessage,
    frame::{
        AudioChunk, CompressionMethod, Frame, FrameBody, FrameError, FrameErrorKind, FrameHeader,
        MessageType, SerializationMethod, gzip_compress, gzip_decompress,
    },
    server_error::ServerError,
};

/// Provides encoding and decoding functionality for frames.
///
/// The `FrameCodec` serializes a [`Frame`] into the big-endian wire layout used
/// by the streaming speech services and parses received bytes back into a
/// [`Frame`]:
///
/// ```text
/// byte0: version(4b) | headerWords(4b)
/// byte1: messageType(4b) | typeFlags(4b)
/// byte2: serializationMethod(4b) | compressionMethod(4b)
/// byte3: reserved
/// [+ (headerWords-1)*4 bytes of header extensions]
/// body (layout depends on messageType)
/// ```
///
/// Outbound audio is never framed; only the configuration request is. The
/// server side kinds are encodable too so that tests and local stand-ins can
/// produce exactly what a service would send.
pub struct FrameCodec;

impl FrameCodec {
    /// Encodes the configuration request that starts a synthesis task.
    ///
    /// When `compression` is [`CompressionMethod::Gzip`] the payload is
    /// compressed before its length is written.
    pub fn encode_full_client_request(
        serialization: SerializationMethod,
        compression: CompressionMethod,
        payload: &[u8],
    ) -> Result<Vec<u8>, FrameError> {
        let mut frame = Frame::full_client_request(payload.to_vec(), compression);
        frame.header.serialization = serialization;
        Self::encode(&frame)
    }

    /// Encodes a `Frame` into a byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`FrameErrorKind::EncodeFailed`] if a header nibble is out of
    /// range, the extensions are not whole header words, a body is larger than
    /// a 32-bit length can describe, or compression fails.
    pub fn encode(frame: &Frame) -> Result<Vec<u8>, FrameError> {
        let header = &frame.header;
        let mut buf = Vec::with_capacity(header.byte_len() + FRAME_FIELD_SIZE * 2);

        Self::encode_header(header, &mut buf)?;

        match &frame.body {
            FrameBody::ClientRequest { payload } => {
                let payload = compress(header.compression, payload)?;
                write_len(&mut buf, payload.len())?;
                buf.extend_from_slice(&payload);
            }
            FrameBody::AudioAck => {}
            FrameBody::Audio(chunk) => {
                buf.extend_from_slice(&chunk.sequence.to_be_bytes());
                write_len(&mut buf, chunk.audio.len())?;
                buf.extend_from_slice(&chunk.audio);
            }
            FrameBody::Frontend(message) => {
                let json = message.to_json().map_err(|err| {
                    FrameError::new(FrameErrorKind::EncodeFailed, buf.len(), 0, err.to_string())
                })?;
                let payload = compress(header.compression, &json)?;
                write_len(&mut buf, payload.len())?;
                buf.extend_from_slice(&payload);
            }
            FrameBody::Error(error) => {
                let message = compress(header.compression, error.message.as_bytes())?;
                buf.extend_from_slice(&error.code.to_be_bytes());
                write_len(&mut buf, message.len())?;
                buf.extend_from_slice(&message);
            }
        }

        Ok(buf)
    }

    fn encode_header(header: &FrameHeader, buf: &mut Vec<u8>) -> Result<(), FrameError> {
        let words = header.header_words();

        if header.extensions.len() % FRAME_HEADER_WORD_SIZE != 0
            || words > FRAME_MAX_HEADER_WORDS as usize
        {
            return Err(FrameError::new(
                FrameErrorKind::EncodeFailed,
                0,
                header.extensions.len(),
                "header extensions must be whole 4-byte words, at most 14 of them",
            ));
        }

        if header.version > 0x0f || header.type_flags > 0x0f {
            return Err(FrameError::new(
                FrameErrorKind::EncodeFailed,
                0,
                0,
                "version and type flags are 4-bit fields",
            ));
        }

        let message_type: u8 = header.message_type.into();
        let serialization: u8 = header.serialization.into();
        let compression: u8 = header.compression.into();

        buf.push((header.version << 4) | words as u8);
        buf.push((message_type << 4) | header.type_flags);
        buf.push((serialization << 4) | compression);
        buf.push(header.reserved);
        buf.extend_from_slice(&header.extensions);

        Ok(())
    }

    /// Decodes a byte slice into a `Frame`.
    ///
    /// An [`MessageType::ErrorResponse`] decodes successfully into a
    /// [`FrameBody::Error`]; it is up to the caller to treat it as a failure.
    ///
    /// # Errors
    ///
    /// - [`FrameErrorKind::Malformed`] if the header is incomplete or a declared
    ///   length runs past the end of the buffer.
    /// - [`FrameErrorKind::UnknownType`] for an unrecognized message type.
    /// - [`FrameErrorKind::DecompressionFailed`] if gzip decoding fails.
    /// - [`FrameErrorKind::InvalidPayload`] if frontend JSON cannot be parsed.
    pub fn decode(buf: &[u8]) -> Result<Frame, FrameError> {
        let mut reader = ByteReader::new(buf);
        let header = Self::decode_header(&mut reader)?;

        let body = match header.message_type {
            MessageType::FullClientRequest => {
                let len = reader.read_len("request payload length")?;
                let start = reader.pos;
                let payload = reader.take(len, "request payload")?;
                FrameBody::ClientRequest {
                    payload: decompress(header.compression, payload, start, buf.len())?,
                }
            }
            MessageType::AudioOnlyResponse => {
                if header.type_flags == AUDIO_FLAGS_ACK {
                    FrameBody::AudioAck
                } else {
                    let sequence = reader.read_i32("sequence number")?;
                    let len = reader.read_len("audio length")?;
                    let audio = reader.take(len, "audio payload")?.to_vec();
                    FrameBody::Audio(AudioChunk { sequence, audio })
                }
            }
            MessageType::FrontendResponse => {
                let len = reader.read_len("frontend payload length")?;
                let start = reader.pos;
                let payload = reader.take(len, "frontend payload")?;
                let payload = decompress(header.compression, payload, start, buf.len())?;
                let message = FrontendMessage::from_json(&payload).map_err(|err| {
                    FrameError::new(
                        FrameErrorKind::InvalidPayload,
                        start,
                        buf.len(),
                        err.to_string(),
                    )
                })?;
                FrameBody::Frontend(message)
            }
            MessageType::ErrorResponse => {
                let code = reader.read_i32("error code")?;
                let len = reader.read_len("error message length")?;
                let start = reader.pos;
                let message = reader.take(len, "error message")?;
                let message = decompress(header.compression, message, start, buf.len())?;
                FrameBody::Error(ServerError::new(
                    code,
                    String::from_utf8_lossy(&message).into_owned(),
                ))
            }
        };

        Ok(Frame { header, body })
    }

    fn decode_header(reader: &mut ByteReader<'_>) -> Result<FrameHeader, FrameError> {
        let len = reader.buf.len();
        let fixed = reader.take(FRAME_FIXED_HEADER_SIZE, "fixed header")?;

        let version = fixed[0] >> 4;
        let header_words = (fixed[0] & 0x0f) as usize;
        let raw_type = fixed[1] >> 4;
        let type_flags = fixed[1] & 0x0f;
        let raw_serialization = fixed[2] >> 4;
        let raw_compression = fixed[2] & 0x0f;
        let reserved = fixed[3];

        if header_words == 0 {
            return Err(FrameError::new(
                FrameErrorKind::Malformed,
                0,
                len,
                "header size of zero words",
            ));
        }

        let message_type = MessageType::try_from(raw_type).map_err(|_| {
            FrameError::new(
                FrameErrorKind::UnknownType,
                1,
                len,
                format!("message type {raw_type:#06b}"),
            )
        })?;

        let serialization = SerializationMethod::try_from(raw_serialization).map_err(|_| {
            FrameError::new(
                FrameErrorKind::Malformed,
                2,
                len,
                format!("serialization method {raw_serialization:#06b}"),
            )
        })?;

        let compression = CompressionMethod::try_from(raw_compression).map_err(|_| {
            FrameError::new(
                FrameErrorKind::Malformed,
                2,
                len,
                format!("compression method {raw_compression:#06b}"),
            )
        })?;

        let extensions = reader
            .take((header_words - 1) * FRAME_HEADER_WORD_SIZE, "header extensions")?
            .to_vec();

        Ok(FrameHeader {
            version,
            message_type,
            type_flags,
            serialization,
            compression,
            reserved,
            extensions,
        })
    }
}

fn write_len(buf: &mut Vec<u8>, len: usize) -> Result<(), FrameError> {
    let len = u32::try_from(len).map_err(|_| {
        FrameError::new(
            FrameErrorKind::EncodeFailed,
            buf.len(),
            len,
            "body exceeds a 32-bit length",
        )
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

fn compress(method: CompressionMethod, bytes: &[u8]) -> Result<Vec<u8>, FrameError> {
    match method {
        CompressionMethod::Gzip => gzip_compress(bytes).map_err(|err| {
            FrameError::new(FrameErrorKind::EncodeFailed, 0, bytes.len(), err.to_string())
        }),
        CompressionMethod::None | CompressionMethod::Custom => Ok(bytes.to_vec()),
    }
}

fn decompress(
    method: CompressionMethod,
    bytes: &[u8],
    offset: usize,
    len: usize,
) -> Result<Vec<u8>, FrameError> {
    match method {
        CompressionMethod::Gzip => gzip_decompress(bytes).map_err(|err| {
            FrameError::new(
                FrameErrorKind::DecompressionFailed,
                offset,
                len,
                err.to_string(),
            )
        }),
        CompressionMethod::None | CompressionMethod::Custom => Ok(bytes.to_vec()),
    }
}

/// Bounds-checked cursor over a received buffer.
struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], FrameError> {
        let remaining = self.buf.len() - self.pos;

        if n > remaining {
            return Err(FrameError::new(
                FrameErrorKind::Malformed,
                self.pos,
                self.buf.len(),
                format!("{what} needs {n} bytes, {remaining} remain"),
            ));
        }

        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_word(&mut self, what: &str) -> Result<[u8; 4], FrameError> {
        let bytes = self.take(FRAME_FIELD_SIZE, what)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn read_len(&mut self, what: &str) -> Result<usize, FrameError> {
        Ok(u32::from_be_bytes(self.read_word(what)?) as usize)
    }

    fn read_i32(&mut self, what: &str) -> Result<i32, FrameError> {
        Ok(i32::from_be_bytes(self.read_word(what)?))
    }
}
