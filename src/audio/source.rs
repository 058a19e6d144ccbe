//! Frame source contract and the WAV-file source

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{DeviceError, Result};

/// Time-bounded pull of raw mono i16 samples.
///
/// Chunks may be any length; the capture session slices them into fixed-size
/// classification frames. `Ok(None)` means no data arrived within the timeout,
/// which keeps the caller's max-duration polling live.
pub trait FrameSource {
    fn next_chunk(&mut self, timeout: Duration) -> Result<Option<Vec<i16>>>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_chunk(&mut self, timeout: Duration) -> Result<Option<Vec<i16>>> {
        (**self).next_chunk(timeout)
    }
}

/// File-backed source for offline runs.
///
/// Serves fixed-size chunks per poll without sleeping, then pads synthetic
/// silence after end of file so the silence timeout can close the utterance.
pub struct WavSource {
    samples: Vec<i16>,
    position: usize,
    chunk_samples: usize,
}

impl WavSource {
    /// Read a WAV file, downmixing to mono and converting to i16.
    ///
    /// The file's sample rate must match the configured capture rate; this
    /// crate does not resample.
    pub fn open(path: &Path, sample_rate: u32) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .map_err(|e| DeviceError::UnsupportedFormat(e.to_string()))?;
        let spec = reader.spec();

        if spec.sample_rate != sample_rate {
            return Err(DeviceError::UnsupportedFormat(format!(
                "expected {} Hz, file is {} Hz",
                sample_rate, spec.sample_rate
            ))
            .into());
        }

        let samples: Vec<i16> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let shift = spec.bits_per_sample.saturating_sub(16) as u32;
                reader
                    .samples::<i32>()
                    .filter_map(|s| s.ok())
                    .map(|s| (s >> shift) as i16)
                    .collect()
            }
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .filter_map(|s| s.ok())
                .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                .collect(),
        };

        let mono: Vec<i16> = if spec.channels > 1 {
            samples
                .chunks(spec.channels as usize)
                .map(|frame| {
                    let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                    (sum / frame.len() as i32) as i16
                })
                .collect()
        } else {
            samples
        };

        info!(
            path = %path.display(),
            samples = mono.len(),
            seconds = mono.len() as f32 / sample_rate as f32,
            "loaded WAV input"
        );

        Ok(Self {
            samples: mono,
            position: 0,
            // 100 ms of audio per poll
            chunk_samples: sample_rate as usize / 10,
        })
    }
}

impl FrameSource for WavSource {
    fn next_chunk(&mut self, _timeout: Duration) -> Result<Option<Vec<i16>>> {
        if self.position >= self.samples.len() {
            // End of file: keep the pipeline fed with silence
            return Ok(Some(vec![0i16; self.chunk_samples]));
        }

        let end = (self.position + self.chunk_samples).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        if end == self.samples.len() {
            debug!("WAV input exhausted, padding silence");
        }
        self.position = end;
        Ok(Some(chunk))
    }
}
