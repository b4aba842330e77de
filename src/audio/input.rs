use crate::{LucidError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{CAPTURE_CHANNELS, CAPTURE_SAMPLE_RATE};

/// Microphone input producing 16 kHz mono 16-bit chunks for the recognizer.
pub struct AudioInput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    is_recording: Arc<Mutex<bool>>,
}

impl AudioInput {
    /// Create an audio input on the default input device.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| LucidError::AudioDevice("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = StreamConfig {
            channels: CAPTURE_CHANNELS,
            sample_rate: SampleRate(CAPTURE_SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok(Self {
            device,
            config,
            stream: None,
            is_recording: Arc::new(Mutex::new(false)),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start recording and push sample chunks to the provided channel.
    pub fn start_recording(&mut self, chunk_tx: Sender<Vec<i16>>) -> Result<()> {
        if *self.is_recording.lock() {
            warn!("Already recording");
            return Ok(());
        }

        let is_recording = Arc::clone(&self.is_recording);

        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if !*is_recording.lock() {
                        return;
                    }
                    if let Err(e) = chunk_tx.try_send(data.to_vec()) {
                        debug!("Failed to send audio chunk: {}", e);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                LucidError::AudioDevice(format!("Failed to build input stream: {}", e))
            })?;

        stream
            .play()
            .map_err(|e| LucidError::AudioDevice(format!("Failed to start input stream: {}", e)))?;

        *self.is_recording.lock() = true;
        self.stream = Some(stream);

        info!("Started audio capture");
        Ok(())
    }

    /// Stop recording audio
    pub fn stop_recording(&mut self) -> Result<()> {
        *self.is_recording.lock() = false;

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Stopped audio capture");
        }

        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        *self.is_recording.lock()
    }
}

impl Drop for AudioInput {
    fn drop(&mut self) {
        let _ = self.stop_recording();
    }
}
