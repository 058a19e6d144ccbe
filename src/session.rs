//! Capture session orchestration

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::audio::FrameSource;
use crate::config::Config;
use crate::error::Result;
use crate::segment::{StopReason, UtteranceSegmenter, Verdict};
use crate::stt::{RecognitionSink, TranscriptResult};
use crate::vad::VoiceActivityClassifier;

/// How often the max-duration ceiling is checked when no audio arrives
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drives the frame pipeline for one utterance.
///
/// Pulls raw chunks from the source, slices them into fixed-size frames in
/// FIFO order, feeds each frame to the classifier and the recognition sink,
/// and lets the segmenter decide when to stop. The source poll is
/// time-bounded so the duration ceiling stays live under total silence.
pub struct CaptureSession<S, V, R> {
    source: S,
    classifier: V,
    sink: R,
    segmenter: UtteranceSegmenter,
    frame_samples: usize,
    frame_duration: Duration,
}

impl<S, V, R> CaptureSession<S, V, R>
where
    S: FrameSource,
    V: VoiceActivityClassifier,
    R: RecognitionSink,
{
    pub fn new(config: &Config, source: S, classifier: V, sink: R) -> Self {
        Self {
            source,
            classifier,
            sink,
            segmenter: UtteranceSegmenter::new(&config.session),
            frame_samples: config.frame_samples(),
            frame_duration: config.frame_duration(),
        }
    }

    /// Run the session to completion.
    ///
    /// Every outcome is normalized into a [`TranscriptResult`]: a successful
    /// stop of either reason carries the sink's transcript, any collaborator
    /// error carries an empty text and the error message. No error escapes
    /// unformatted.
    pub fn run(mut self) -> TranscriptResult {
        match self.capture() {
            Ok(text) => TranscriptResult::ok(text),
            Err(e) => TranscriptResult::failure(e.to_string()),
        }
    }

    fn capture(&mut self) -> Result<String> {
        let started = Instant::now();
        let mut pending: Vec<i16> = Vec::with_capacity(self.frame_samples * 4);
        let mut frames = 0u64;

        let reason = 'capture: loop {
            if let Verdict::Stop(reason) = self.segmenter.check_timeout(started.elapsed()) {
                break 'capture reason;
            }

            let Some(chunk) = self.source.next_chunk(POLL_INTERVAL)? else {
                continue;
            };
            pending.extend_from_slice(&chunk);

            while pending.len() >= self.frame_samples {
                let frame: Vec<i16> = pending.drain(..self.frame_samples).collect();
                let is_speech = self.classifier.classify(&frame)?;
                self.sink.accept(&frame)?;
                frames += 1;

                if let Verdict::Stop(reason) = self.segmenter.observe(self.frame_duration, is_speech)
                {
                    // Intake ceases here; sub-frame leftovers are discarded
                    break 'capture reason;
                }
            }
        };

        match reason {
            StopReason::SilenceTimeout => info!(frames, "utterance complete, silence timeout"),
            StopReason::MaxDurationReached => info!(frames, "max session duration reached"),
        }
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            speech_started = self.segmenter.speech_started(),
            "requesting final transcript"
        );

        self.sink.finalize()
    }
}
