//! Whisper-backed recognition sink

use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::config::SttConfig;
use crate::error::{RecognizerError, Result};
use crate::stt::RecognitionSink;

/// Buffers accepted frames and runs Whisper inference once on `finalize`
pub struct WhisperSink {
    ctx: WhisperContext,
    config: SttConfig,
    samples: Vec<f32>,
    finalized: bool,
}

impl WhisperSink {
    pub fn new(config: SttConfig) -> Result<Self> {
        let model_path = &config.model_path;

        if !model_path.exists() {
            return Err(
                RecognizerError::ModelNotFound(model_path.display().to_string()).into(),
            );
        }

        info!("Loading Whisper model from: {}", model_path.display());

        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(
            model_path.to_str().unwrap_or_default(),
            ctx_params,
        )
        .map_err(|e| RecognizerError::ModelLoad(e.to_string()))?;

        info!("Whisper model loaded successfully");

        Ok(Self {
            ctx,
            config,
            samples: Vec::new(),
            finalized: false,
        })
    }

    fn transcribe(&self) -> Result<String> {
        debug!(
            "Transcribing {} samples ({:.2}s)",
            self.samples.len(),
            self.samples.len() as f32 / 16000.0
        );

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.config.threads as i32);
        params.set_language(Some(&self.config.language));
        params.set_translate(self.config.translate);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_no_context(true);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| RecognizerError::Transcription(e.to_string()))?;

        state
            .full(params, &self.samples)
            .map_err(|e| RecognizerError::Transcription(e.to_string()))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| RecognizerError::Transcription(e.to_string()))?;

        let mut text = String::new();
        for i in 0..num_segments {
            let segment = state
                .full_get_segment_text(i)
                .map_err(|e| RecognizerError::Transcription(e.to_string()))?;
            if !text.is_empty() && !segment.starts_with(' ') {
                text.push(' ');
            }
            text.push_str(segment.trim());
        }

        debug!("Transcription complete: {} chars", text.len());
        Ok(text.trim().to_string())
    }
}

impl RecognitionSink for WhisperSink {
    fn accept(&mut self, frame: &[i16]) -> Result<()> {
        self.samples
            .extend(frame.iter().map(|&s| s as f32 / i16::MAX as f32));
        Ok(())
    }

    fn finalize(&mut self) -> Result<String> {
        if self.finalized {
            return Err(RecognizerError::AlreadyFinalized.into());
        }
        self.finalized = true;

        // A session that stopped without any audio transcribes to nothing
        if self.samples.is_empty() {
            return Ok(String::new());
        }

        self.transcribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_an_error() {
        let config = SttConfig {
            model_path: "/nonexistent/model.bin".into(),
            ..Default::default()
        };

        let result = WhisperSink::new(config);
        assert!(result.is_err());
    }
}
