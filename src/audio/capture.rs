//! Microphone capture using cpal

use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, SampleRate, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::audio::source::FrameSource;
use crate::config::AudioConfig;
use crate::error::{DeviceError, Result};

/// Microphone frame source.
///
/// The cpal callback is the producer: it downmixes to mono, converts to i16
/// and hands chunks to a bounded channel without ever blocking. The consumer
/// pulls through [`FrameSource::next_chunk`] with a short timeout. Stream
/// errors reported by the audio subsystem are parked in a shared slot and
/// surfaced on the next pull.
pub struct MicCapture {
    config: AudioConfig,
    host: Host,
    device: Option<Device>,
    stream: Option<Stream>,
    chunk_sender: Sender<Vec<i16>>,
    chunk_receiver: Receiver<Vec<i16>>,
    stream_error: Arc<Mutex<Option<String>>>,
}

impl MicCapture {
    pub fn new(config: AudioConfig) -> Self {
        let host = cpal::default_host();
        let (sender, receiver) = bounded(100); // Buffer up to 100 chunks

        Self {
            config,
            host,
            device: None,
            stream: None,
            chunk_sender: sender,
            chunk_receiver: receiver,
            stream_error: Arc::new(Mutex::new(None)),
        }
    }

    /// List available audio input devices
    pub fn list_devices(&self) -> Result<Vec<String>> {
        let devices = self
            .host
            .input_devices()
            .map_err(|e| DeviceError::DeviceConfig(e.to_string()))?;

        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Resolve the capture device and verify it supports the configured rate
    pub fn init(&mut self) -> Result<()> {
        let device = if let Some(ref device_name) = self.config.device {
            self.find_device_by_name(device_name)?
        } else {
            self.host
                .default_input_device()
                .ok_or(DeviceError::NoInputDevice)?
        };

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!("Using audio input device: {}", device_name);

        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| DeviceError::DeviceConfig(e.to_string()))?;

        let target_rate = SampleRate(self.config.sample_rate);
        let mut supported = false;
        for cfg in supported_configs {
            debug!(
                "Supported config: channels={}, sample_rate={:?}-{:?}",
                cfg.channels(),
                cfg.min_sample_rate(),
                cfg.max_sample_rate()
            );
            if cfg.channels() == self.config.channels
                && cfg.min_sample_rate() <= target_rate
                && target_rate <= cfg.max_sample_rate()
            {
                supported = true;
                break;
            }
        }

        if !supported {
            return Err(DeviceError::DeviceConfig(format!(
                "device does not support {} channel(s) at {} Hz",
                self.config.channels, self.config.sample_rate
            ))
            .into());
        }

        self.device = Some(device);
        Ok(())
    }

    /// Start the capture stream
    pub fn start(&mut self) -> Result<()> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| DeviceError::DeviceConfig("Device not initialized".to_string()))?;

        let config = StreamConfig {
            channels: self.config.channels,
            sample_rate: SampleRate(self.config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.config.buffer_size),
        };

        let sender = self.chunk_sender.clone();
        let stream_error = self.stream_error.clone();
        let channels = self.config.channels as usize;

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<i16> = if channels > 1 {
                        data.chunks(channels)
                            .map(|frame| {
                                let mono = frame.iter().sum::<f32>() / channels as f32;
                                (mono.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
                            })
                            .collect()
                    } else {
                        data.iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                            .collect()
                    };

                    if sender.try_send(samples).is_err() {
                        warn!("Audio buffer overflow - dropping samples");
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    *stream_error.lock() = Some(err.to_string());
                },
                None,
            )
            .map_err(|e| DeviceError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| DeviceError::StreamPlay(e.to_string()))?;

        self.stream = Some(stream);
        info!("Audio capture started");
        Ok(())
    }

    /// Stop the capture stream
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            info!("Audio capture stopped");
        }
    }

    fn find_device_by_name(&self, name: &str) -> Result<Device> {
        let devices = self
            .host
            .input_devices()
            .map_err(|e| DeviceError::DeviceConfig(e.to_string()))?;

        for device in devices {
            if let Ok(device_name) = device.name() {
                if device_name.contains(name) {
                    return Ok(device);
                }
            }
        }

        Err(DeviceError::DeviceNotFound(name.to_string()).into())
    }
}

impl FrameSource for MicCapture {
    fn next_chunk(&mut self, timeout: Duration) -> Result<Option<Vec<i16>>> {
        if let Some(message) = self.stream_error.lock().take() {
            return Err(DeviceError::StreamFailed(message).into());
        }

        Ok(self.chunk_receiver.recv_timeout(timeout).ok())
    }
}

impl Drop for MicCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
