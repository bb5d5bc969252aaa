mod synthesis_client;
mod voice_conversion_client;

pub use synthesis_client::SynthesisClient;
pub use voice_conversion_client::VoiceConversionClient;
