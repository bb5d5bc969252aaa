use serde::{Deserialize, Serialize};

/// Timestamp of a single word (or symbol) in the synthesized text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Word {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
    #[serde(default)]
    pub unit_type: String,
}

/// Timestamp of a single phoneme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Phoneme {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
}

/// Word and phoneme timestamps for synthesized text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontend {
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default)]
    pub phonemes: Vec<Phoneme>,
}

/// Content of a frontend response frame.
///
/// On the wire the timestamps travel as a JSON document encoded into the
/// string field `frontend`; this type holds them already parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontendMessage {
    pub duration: Option<String>,
    pub frontend: Option<Frontend>,
}

#[derive(Serialize, Deserialize)]
struct FrontendWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    frontend: String,
}

impl FrontendMessage {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let wire: FrontendWire = serde_json::from_slice(bytes)?;

        let frontend = if wire.frontend.is_empty() {
            None
        } else {
            Some(serde_json::from_str(&wire.frontend)?)
        };

        Ok(Self {
            duration: wire.duration,
            frontend,
        })
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let frontend = match &self.frontend {
            Some(frontend) => serde_json::to_string(frontend)?,
            None => String::new(),
        };

        serde_json::to_vec(&FrontendWire {
            duration: self.duration.clone(),
            frontend,
        })
    }
}
