// Frame related constants

/// Protocol version carried in the high nibble of the first header byte.
pub const PROTOCOL_VERSION: u8 = 0b0001;

/// Size in bytes of one header word. `headerWords` counts these.
pub const FRAME_HEADER_WORD_SIZE: usize = 4;

/// Size of the fixed header (a single header word, no extensions).
pub const FRAME_FIXED_HEADER_SIZE: usize = FRAME_HEADER_WORD_SIZE;

/// Size of every big-endian length, code and sequence field in a frame body.
pub const FRAME_FIELD_SIZE: usize = 4;

/// Largest `headerWords` value that fits the 4-bit field.
pub const FRAME_MAX_HEADER_WORDS: u8 = 0x0f;

/// Type flags written for an audio frame with a non-negative sequence number.
pub const AUDIO_FLAGS_POSITIVE_SEQUENCE: u8 = 0b0001;

/// Type flags written for an audio frame with a negative (final) sequence number.
pub const AUDIO_FLAGS_NEGATIVE_SEQUENCE: u8 = 0b0011;

/// Type flags meaning "acknowledgement, no payload" on an audio frame.
pub const AUDIO_FLAGS_ACK: u8 = 0;

// Chunking

/// Default outbound audio chunk: 100ms of 16kHz mono s16le.
pub const DEFAULT_CHUNK_SIZE: usize = 3200;

// Signing

/// Algorithm identifier used in the string to sign and the `Authorization` header.
pub const SIGNING_ALGORITHM: &str = "HMAC-SHA256";

/// Terminal element of the credential scope.
pub const SIGNING_SCOPE_TERMINATOR: &str = "request";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_DATE: &str = "X-Date";
pub const HEADER_CONTENT_SHA256: &str = "X-Content-Sha256";

/// `X-Date` layout, e.g. `20240101T093000Z`.
pub const SIGNING_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Calendar day layout used in the credential scope.
pub const SIGNING_DATE_FORMAT: &str = "%Y%m%d";

// Control envelopes

/// Status code reported by the speech service for a successful call.
pub const STATUS_CODE_OK: i32 = 20_000_000;
