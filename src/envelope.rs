mod base64_bytes;
mod control;
mod frontend;
mod synthesis;
mod voice_conversion;

pub use control::{ControlRequest, ControlResponse, TaskEvent};
pub use frontend::{Frontend, FrontendMessage, Phoneme, Word};
pub use synthesis::{
    SynthesisApp, SynthesisAudio, SynthesisRequest, SynthesisTask, SynthesisUser,
    OPERATION_SUBMIT,
};
pub use voice_conversion::{AudioInfo, ConversionExtra, VoiceConversionRequest};
