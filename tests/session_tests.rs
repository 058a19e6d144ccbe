//! Integration tests for the capture session with scripted collaborators

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use uttercap::{
    CaptureError, CaptureSession, Config, FrameSource, RecognitionSink, Result, TranscriptResult,
    VoiceActivityClassifier,
};

const FRAME_SAMPLES: usize = 480; // 30 ms at 16 kHz

/// Serves a fixed script of chunks, then reports no data forever
struct ScriptedSource {
    chunks: VecDeque<Vec<i16>>,
    fail_after: Option<usize>,
    polls: usize,
}

impl ScriptedSource {
    fn new(chunks: Vec<Vec<i16>>) -> Self {
        Self {
            chunks: chunks.into(),
            fail_after: None,
            polls: 0,
        }
    }

    fn failing_after(chunks: Vec<Vec<i16>>, polls: usize) -> Self {
        Self {
            chunks: chunks.into(),
            fail_after: Some(polls),
            polls: 0,
        }
    }
}

impl FrameSource for ScriptedSource {
    fn next_chunk(&mut self, _timeout: Duration) -> Result<Option<Vec<i16>>> {
        self.polls += 1;
        if let Some(limit) = self.fail_after {
            if self.polls > limit {
                return Err(uttercap::DeviceError::StreamFailed("device unplugged".into()).into());
            }
        }
        Ok(self.chunks.pop_front())
    }
}

/// Classifies by frame content: any nonzero sample means speech
struct MarkerVad {
    classified: usize,
    fail_on: Option<usize>,
}

impl MarkerVad {
    fn new() -> Self {
        Self {
            classified: 0,
            fail_on: None,
        }
    }

    fn failing_on(frame: usize) -> Self {
        Self {
            classified: 0,
            fail_on: Some(frame),
        }
    }
}

impl VoiceActivityClassifier for MarkerVad {
    fn classify(&mut self, frame: &[i16]) -> Result<bool> {
        self.classified += 1;
        if self.fail_on == Some(self.classified) {
            return Err(CaptureError::Classify("classifier backend crashed".into()));
        }
        Ok(frame.iter().any(|&s| s != 0))
    }
}

#[derive(Default)]
struct SinkState {
    frames: usize,
    samples: usize,
    finalized: usize,
}

/// Records accepted frames; finalize reports how many frames arrived
struct RecordingSink {
    state: Rc<RefCell<SinkState>>,
}

impl RecordingSink {
    fn new() -> (Self, Rc<RefCell<SinkState>>) {
        let state = Rc::new(RefCell::new(SinkState::default()));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

impl RecognitionSink for RecordingSink {
    fn accept(&mut self, frame: &[i16]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.frames += 1;
        state.samples += frame.len();
        Ok(())
    }

    fn finalize(&mut self) -> Result<String> {
        let mut state = self.state.borrow_mut();
        state.finalized += 1;
        if state.finalized > 1 {
            return Err(uttercap::RecognizerError::AlreadyFinalized.into());
        }
        Ok(format!("{} frames", state.frames))
    }
}

fn speech_frames(n: usize) -> Vec<Vec<i16>> {
    (0..n).map(|_| vec![1000i16; FRAME_SAMPLES]).collect()
}

fn silence_frames(n: usize) -> Vec<Vec<i16>> {
    (0..n).map(|_| vec![0i16; FRAME_SAMPLES]).collect()
}

fn run_session(source: ScriptedSource, vad: MarkerVad) -> (TranscriptResult, Rc<RefCell<SinkState>>) {
    let config = Config::default();
    let (sink, state) = RecordingSink::new();
    let result = CaptureSession::new(&config, source, vad, sink).run();
    (result, state)
}

#[test]
fn test_silence_timeout_after_confirmed_speech() {
    // 10 speech frames confirm the utterance, then silence. With
    // silence_ms=2200 and 30 ms frames the session stops on the 74th silent
    // frame: 84 frames total reach the sink, then exactly one finalize.
    let mut chunks = speech_frames(10);
    chunks.extend(silence_frames(100));

    let (result, state) = run_session(ScriptedSource::new(chunks), MarkerVad::new());

    assert!(!result.is_error(), "unexpected error: {:?}", result.error);
    assert_eq!(result.text, "84 frames");

    let state = state.borrow();
    assert_eq!(state.frames, 84);
    assert_eq!(state.samples, 84 * FRAME_SAMPLES);
    assert_eq!(state.finalized, 1);
}

#[test]
fn test_max_duration_under_total_silence() {
    // An empty source never produces frames; the duration ceiling
    // terminates the session and the sink is still finalized once.
    let mut config = Config::default();
    config.session.max_seconds = 0.3;

    let (sink, state) = RecordingSink::new();
    let result =
        CaptureSession::new(&config, ScriptedSource::new(vec![]), MarkerVad::new(), sink).run();

    assert!(!result.is_error());
    assert_eq!(result.text, "0 frames");

    let state = state.borrow();
    assert_eq!(state.frames, 0);
    assert_eq!(state.finalized, 1);
}

#[test]
fn test_unconfirmed_speech_only_ends_by_ceiling() {
    // 4 speech frames (120 ms) never reach the 150 ms debounce, so the
    // following silence cannot close the utterance.
    let mut config = Config::default();
    config.session.max_seconds = 0.3;

    let mut chunks = speech_frames(4);
    chunks.extend(silence_frames(200));

    let (sink, state) = RecordingSink::new();
    let result =
        CaptureSession::new(&config, ScriptedSource::new(chunks), MarkerVad::new(), sink).run();

    assert!(!result.is_error());
    // Everything that arrived was fed through before the ceiling hit
    assert_eq!(state.borrow().finalized, 1);
}

#[test]
fn test_classifier_error_aborts_without_finalize() {
    // The classifier fails mid-stream: the session reports the error
    // result, never finalizes, and stops feeding frames.
    let mut chunks = speech_frames(10);
    chunks.extend(silence_frames(100));

    let (sink, state) = RecordingSink::new();
    let result = CaptureSession::new(
        &Config::default(),
        ScriptedSource::new(chunks),
        MarkerVad::failing_on(7),
        sink,
    )
    .run();

    assert!(result.is_error());
    assert!(result.text.is_empty());
    assert!(result.error.as_deref().unwrap().contains("classifier backend crashed"));

    let state = state.borrow();
    // The failing frame was classified but never accepted
    assert_eq!(state.frames, 6);
    assert_eq!(state.finalized, 0);
}

#[test]
fn test_device_error_aborts_session() {
    let result = {
        let (sink, _state) = RecordingSink::new();
        CaptureSession::new(
            &Config::default(),
            ScriptedSource::failing_after(speech_frames(3), 3),
            MarkerVad::new(),
            sink,
        )
        .run()
    };

    assert!(result.is_error());
    assert!(result.error.as_deref().unwrap().contains("device unplugged"));
}

#[test]
fn test_odd_sized_chunks_are_framed_fifo() {
    // Chunks that don't align to frame boundaries: 10 speech frames worth of
    // samples delivered in 7 uneven pieces, then silence in one big chunk.
    let speech: Vec<i16> = vec![1000i16; 10 * FRAME_SAMPLES];
    let mut chunks: Vec<Vec<i16>> = Vec::new();
    let mut offset = 0;
    for size in [100, 700, 333, 1147, 480, 1000, 1040] {
        chunks.push(speech[offset..offset + size].to_vec());
        offset += size;
    }
    assert_eq!(offset, 10 * FRAME_SAMPLES);
    chunks.push(vec![0i16; 100 * FRAME_SAMPLES]);

    let (result, state) = run_session(ScriptedSource::new(chunks), MarkerVad::new());

    assert!(!result.is_error());
    // Same frame accounting as the aligned case
    assert_eq!(state.borrow().frames, 84);
}

#[test]
fn test_subframe_leftover_is_discarded_on_stop() {
    // The silent tail ends with 200 extra samples beyond the stopping frame;
    // they never reach the sink.
    let mut chunks = speech_frames(10);
    let mut tail = vec![0i16; 74 * FRAME_SAMPLES + 200];
    // Mark the leftover so feeding it would flip the classifier
    let len = tail.len();
    tail[len - 1] = 1000;
    chunks.push(tail);

    let (result, state) = run_session(ScriptedSource::new(chunks), MarkerVad::new());

    assert!(!result.is_error());
    let state = state.borrow();
    assert_eq!(state.frames, 84);
    assert_eq!(state.samples, 84 * FRAME_SAMPLES);
}
