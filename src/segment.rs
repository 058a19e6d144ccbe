//! Utterance boundary detection from per-frame speech classifications

use std::time::Duration;
use tracing::trace;

use crate::config::SessionConfig;

/// Why a capture session stopped listening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Trailing silence after a confirmed utterance reached the timeout
    SilenceTimeout,
    /// The hard session duration ceiling was hit
    MaxDurationReached,
}

/// Per-frame decision of the segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Stop(StopReason),
}

impl Verdict {
    pub fn is_stop(&self) -> bool {
        matches!(self, Verdict::Stop(_))
    }
}

/// Turns a stream of per-frame speech/non-speech classifications into a single
/// stop decision.
///
/// A short run of speech-classified frames is not enough to confirm an
/// utterance: `min_speech_run` consecutive speech time is required before the
/// segmenter considers speech started. The same threshold guards the silence
/// counter once speech has started, so a lone speech-classified frame inside a
/// pause cannot reset the accumulating silence.
///
/// States: idle until the debounce confirms speech, speaking until trailing
/// silence reaches `silence_timeout`, then stopped. The max-duration ceiling
/// can stop the session from either state. Stopped is terminal; `observe`
/// must not be called again after a stop verdict.
pub struct UtteranceSegmenter {
    min_speech_run: Duration,
    silence_timeout: Duration,
    max_duration: Duration,
    speech_started: bool,
    consecutive_speech: Duration,
    non_speech: Duration,
    stopped: bool,
}

impl UtteranceSegmenter {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            min_speech_run: Duration::from_millis(config.min_speech_ms),
            silence_timeout: Duration::from_millis(config.silence_ms),
            max_duration: Duration::from_secs_f32(config.max_seconds),
            speech_started: false,
            consecutive_speech: Duration::ZERO,
            non_speech: Duration::ZERO,
            stopped: false,
        }
    }

    /// Update state with one classified frame and decide whether to stop
    pub fn observe(&mut self, frame_duration: Duration, is_speech: bool) -> Verdict {
        debug_assert!(!self.stopped, "observe called after stop verdict");

        if is_speech {
            self.consecutive_speech += frame_duration;
            if self.consecutive_speech >= self.min_speech_run {
                if !self.speech_started {
                    self.speech_started = true;
                    trace!(
                        run_ms = self.consecutive_speech.as_millis() as u64,
                        "speech confirmed"
                    );
                }
                // A confirmed speech run cancels accumulating silence
                self.non_speech = Duration::ZERO;
            }
        } else {
            self.consecutive_speech = Duration::ZERO;
            if self.speech_started {
                self.non_speech += frame_duration;
            }
        }

        if self.speech_started && self.non_speech >= self.silence_timeout {
            self.stopped = true;
            trace!(
                silence_ms = self.non_speech.as_millis() as u64,
                "silence timeout"
            );
            return Verdict::Stop(StopReason::SilenceTimeout);
        }

        Verdict::Continue
    }

    /// Check the hard duration ceiling, independent of frame arrival.
    ///
    /// This is what terminates a session when the classifier never reports
    /// speech at all, e.g. a dead microphone.
    pub fn check_timeout(&mut self, elapsed: Duration) -> Verdict {
        if elapsed > self.max_duration {
            self.stopped = true;
            return Verdict::Stop(StopReason::MaxDurationReached);
        }
        Verdict::Continue
    }

    /// Whether an utterance has been confirmed
    pub fn speech_started(&self) -> bool {
        self.speech_started
    }
}
