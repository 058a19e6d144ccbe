//! Custom error types for the capture pipeline

use thiserror::Error;

/// Main error type for a capture session
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Recognition error: {0}")]
    Recognize(#[from] RecognizerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Classification error: {0}")]
    Classify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Audio device and stream errors
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to get device configuration: {0}")]
    DeviceConfig(String),

    #[error("Failed to build audio stream: {0}")]
    StreamBuild(String),

    #[error("Stream playback error: {0}")]
    StreamPlay(String),

    #[error("Audio stream failed: {0}")]
    StreamFailed(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),
}

/// Recognition sink errors
#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Sink already finalized")]
    AlreadyFinalized,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, CaptureError>;
