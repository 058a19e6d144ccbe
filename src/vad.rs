//! Voice activity classification

use tracing::trace;

use crate::config::VadConfig;
use crate::error::Result;

/// Per-frame speech/non-speech classification.
///
/// Implementations receive fixed-size frames only; the session owns framing.
pub trait VoiceActivityClassifier {
    fn classify(&mut self, frame: &[i16]) -> Result<bool>;
}

/// RMS-energy classifier with a dBFS threshold.
///
/// Aggressiveness 0..=3 selects progressively stricter thresholds: at 0 most
/// low-level audio passes as speech, at 3 only clearly voiced frames do.
pub struct EnergyVad {
    threshold_db: f32,
}

impl EnergyVad {
    pub fn new(config: &VadConfig) -> Self {
        let threshold_db = match config.aggressiveness {
            0 => -60.0,
            1 => -55.0,
            2 => -50.0,
            _ => -45.0,
        };

        Self { threshold_db }
    }

    fn frame_db(frame: &[i16]) -> f32 {
        if frame.is_empty() {
            return f32::NEG_INFINITY;
        }

        let sum_squares: f64 = frame
            .iter()
            .map(|&s| {
                let norm = s as f64 / i16::MAX as f64;
                norm * norm
            })
            .sum();
        let rms = (sum_squares / frame.len() as f64).sqrt().max(1e-9);
        20.0 * rms.log10() as f32
    }
}

impl VoiceActivityClassifier for EnergyVad {
    fn classify(&mut self, frame: &[i16]) -> Result<bool> {
        let db = Self::frame_db(frame);
        let is_speech = db >= self.threshold_db;
        trace!(db, is_speech, "frame classified");
        Ok(is_speech)
    }
}
