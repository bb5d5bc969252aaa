use std::fmt;
use thiserror::Error;

/// Vendor error codes the speech service is known to report.
///
/// Codes not listed here are kept as [`ServerErrorCode::Unknown`] so that no
/// information is lost when the service introduces new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerErrorCode {
    BadRequest,
    AudioUpload,
    Asr,
    Sid,
    SidFail,
    GetAudioData,
    SpeakerIdDuplication,
    SpeakerIdNotFound,
    AudioConvert,
    Wer,
    Aed,
    Snr,
    Denoise,
    AudioQuality,
    AsrNoSpeaker,
    MaxUpload,
    Unknown(i32),
}

impl ServerErrorCode {
    const KNOWN: [ServerErrorCode; 16] = [
        Self::BadRequest,
        Self::AudioUpload,
        Self::Asr,
        Self::Sid,
        Self::SidFail,
        Self::GetAudioData,
        Self::SpeakerIdDuplication,
        Self::SpeakerIdNotFound,
        Self::AudioConvert,
        Self::Wer,
        Self::Aed,
        Self::Snr,
        Self::Denoise,
        Self::AudioQuality,
        Self::AsrNoSpeaker,
        Self::MaxUpload,
    ];

    pub fn from_code(code: i32) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|known| known.code() == code)
            .unwrap_or(Self::Unknown(code))
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::BadRequest => 1001,
            Self::AudioUpload => 1101,
            Self::Asr => 1102,
            Self::Sid => 1103,
            Self::SidFail => 1104,
            Self::GetAudioData => 1105,
            Self::SpeakerIdDuplication => 1106,
            Self::SpeakerIdNotFound => 1107,
            Self::AudioConvert => 1108,
            Self::Wer => 1109,
            Self::Aed => 1111,
            Self::Snr => 1112,
            Self::Denoise => 1113,
            Self::AudioQuality => 1114,
            Self::AsrNoSpeaker => 1122,
            Self::MaxUpload => 1123,
            Self::Unknown(code) => *code,
        }
    }

    /// The identifier the service uses for this code, e.g. `SpeakerIDNotFoundError`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequestError",
            Self::AudioUpload => "AudioUploadError",
            Self::Asr => "ASRError",
            Self::Sid => "SIDError",
            Self::SidFail => "SIDFailError",
            Self::GetAudioData => "GetAudioDataError",
            Self::SpeakerIdDuplication => "SpeakerIDDuplicationError",
            Self::SpeakerIdNotFound => "SpeakerIDNotFoundError",
            Self::AudioConvert => "AudioConvertError",
            Self::Wer => "WERError",
            Self::Aed => "AEDError",
            Self::Snr => "SNRError",
            Self::Denoise => "DenoiseError",
            Self::AudioQuality => "AudioQualityError",
            Self::AsrNoSpeaker => "ASRNoSpeakerError",
            Self::MaxUpload => "MaxUpload",
            Self::Unknown(_) => "UnknownError",
        }
    }

    /// Human readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::BadRequest => "invalid request parameters",
            Self::AudioUpload => "audio upload failed",
            Self::Asr => "speech recognition transcription failed",
            Self::Sid => "voiceprint detection failed",
            Self::SidFail => "voiceprint rejected: too similar to a public figure",
            Self::GetAudioData => "failed to fetch audio data",
            Self::SpeakerIdDuplication => "speaker id already exists",
            Self::SpeakerIdNotFound => "speaker id not found",
            Self::AudioConvert => "audio transcoding failed",
            Self::Wer => "word error rate against the reference text is too high",
            Self::Aed => "audio does not appear to contain speech",
            Self::Snr => "signal to noise ratio check failed",
            Self::Denoise => "noise reduction failed",
            Self::AudioQuality => "audio quality too low for noise reduction",
            Self::AsrNoSpeaker => "no human voice detected",
            Self::MaxUpload => "upload limit reached for this speaker",
            Self::Unknown(_) => "unrecognized server error",
        }
    }
}

impl From<i32> for ServerErrorCode {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for ServerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// An error reported by the service itself, either in an error frame or in a
/// control envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("code={code}, desc={message}")]
pub struct ServerError {
    /// Raw vendor code as sent on the wire.
    pub code: i32,
    /// Message text as sent by the service.
    pub message: String,
}

impl ServerError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ServerErrorCode {
        ServerErrorCode::from_code(self.code)
    }
}
