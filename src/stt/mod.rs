//! Recognition sink contract and transcript result types

pub mod whisper;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use whisper::WhisperSink;

/// Waveform consumer that produces a final transcript on demand.
///
/// `accept` is called once per frame in stream order; `finalize` is valid
/// exactly once, after the last `accept`. A second `finalize` is an error.
pub trait RecognitionSink {
    fn accept(&mut self, frame: &[i16]) -> Result<()>;
    fn finalize(&mut self) -> Result<String>;
}

/// The single externally observable output of a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscriptResult {
    pub fn ok(text: String) -> Self {
        Self { text, error: None }
    }

    pub fn failure(message: String) -> Self {
        Self {
            text: String::new(),
            error: Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_empty_text() {
        let result = TranscriptResult::failure("boom".to_string());
        assert!(result.is_error());
        assert!(result.text.is_empty());
    }
}
