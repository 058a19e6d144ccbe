//! Audio input: the frame source contract and its implementations

pub mod capture;
pub mod source;

pub use capture::MicCapture;
pub use source::{FrameSource, WavSource};
