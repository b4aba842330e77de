//! Microphone capture and audio playback (feature `audio-io`).

#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod playback;

#[cfg(feature = "audio-io")]
pub use input::AudioInput;
#[cfg(feature = "audio-io")]
pub use playback::play_file;

/// Sample rate the speech recognizer expects.
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

/// Mono capture.
pub const CAPTURE_CHANNELS: u16 = 1;
