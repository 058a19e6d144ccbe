//! Configuration structures for the capture pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub session: SessionConfig,
    pub vad: VadConfig,
    pub stt: SttConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check cross-field invariants that serde alone cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audio.sample_rate".to_string(),
                value: "0".to_string(),
            });
        }

        // Frame duration must yield a whole, nonzero number of samples
        if self.audio.frame_ms == 0
            || (self.audio.sample_rate as u64 * self.audio.frame_ms) % 1000 != 0
        {
            return Err(ConfigError::InvalidValue {
                field: "audio.frame_ms".to_string(),
                value: self.audio.frame_ms.to_string(),
            });
        }

        if !self.session.max_seconds.is_finite() || self.session.max_seconds <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "session.max_seconds".to_string(),
                value: self.session.max_seconds.to_string(),
            });
        }

        if self.vad.aggressiveness > 3 {
            return Err(ConfigError::InvalidValue {
                field: "vad.aggressiveness".to_string(),
                value: self.vad.aggressiveness.to_string(),
            });
        }

        if self.session.silence_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.silence_ms".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Number of samples in one classification frame
    pub fn frame_samples(&self) -> usize {
        (self.audio.sample_rate as u64 * self.audio.frame_ms / 1000) as usize
    }

    /// Duration of one classification frame
    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.audio.frame_ms)
    }
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Capture sample rate (Hz)
    pub sample_rate: u32,
    /// Classification frame duration (ms)
    pub frame_ms: u64,
    /// Number of capture channels (downmixed to mono)
    pub channels: u16,
    /// Device buffer size in samples
    pub buffer_size: u32,
    /// Audio device name (None = default device)
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            frame_ms: 30,
            channels: 1,
            buffer_size: 512,
            device: None,
        }
    }
}

/// Utterance segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hard ceiling on session duration (seconds)
    pub max_seconds: f32,
    /// Trailing silence that ends a confirmed utterance (ms)
    pub silence_ms: u64,
    /// Minimum consecutive speech run to confirm a state change (ms)
    pub min_speech_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_seconds: 12.0,
            silence_ms: 2200,
            min_speech_ms: 150,
        }
    }
}

/// Voice activity classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    /// Classifier aggressiveness, 0 (permissive) to 3 (strict)
    pub aggressiveness: u8,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self { aggressiveness: 3 }
    }
}

/// Recognition engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Path to the Whisper model file
    pub model_path: PathBuf,
    /// Language for transcription
    pub language: String,
    /// Number of threads for inference
    pub threads: u32,
    /// Enable translation to English
    pub translate: bool,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/ggml-base.en.bin"),
            language: "en".to_string(),
            threads: 4,
            translate: false,
        }
    }
}
