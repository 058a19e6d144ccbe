//! Single-Utterance Voice Capture
//!
//! Captures live microphone audio, detects the boundaries of one spoken
//! utterance using voice-activity detection, and emits a transcribed text
//! result as soon as the speaker stops talking or a maximum duration elapses.
//!
//! # Architecture
//!
//! - `segment`: the utterance segmentation state machine (debounce + silence
//!   timeout + duration ceiling)
//! - `session`: the orchestration loop that frames audio and drives the
//!   segmenter
//! - `audio`: the frame source contract, microphone capture, WAV input
//! - `vad`: the per-frame speech classifier contract and energy classifier
//! - `stt`: the recognition sink contract and Whisper-backed sink
//! - `config`: configuration structures
//! - `error`: error types
//! - `output`: single-line JSON result emission
//!
//! # Example
//!
//! ```no_run
//! use uttercap::{CaptureSession, Config, EnergyVad, MicCapture, WhisperSink};
//!
//! let config = Config::default();
//! config.validate().unwrap();
//!
//! let mut mic = MicCapture::new(config.audio.clone());
//! mic.init().unwrap();
//! mic.start().unwrap();
//!
//! let vad = EnergyVad::new(&config.vad);
//! let sink = WhisperSink::new(config.stt.clone()).unwrap();
//!
//! let result = CaptureSession::new(&config, mic, vad, sink).run();
//! println!("{}", result.text);
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod output;
pub mod segment;
pub mod session;
pub mod stt;
pub mod vad;

// Re-exports for convenience
pub use audio::{FrameSource, MicCapture, WavSource};
pub use config::{AudioConfig, Config, SessionConfig, SttConfig, VadConfig};
pub use error::{CaptureError, ConfigError, DeviceError, RecognizerError, Result};
pub use segment::{StopReason, UtteranceSegmenter, Verdict};
pub use session::CaptureSession;
pub use stt::{RecognitionSink, TranscriptResult, WhisperSink};
pub use vad::{EnergyVad, VoiceActivityClassifier};
