//! Voice capture: streaming recognition with silence-based endpointing.

pub mod capture;
pub mod recognizer;

pub use capture::{run_capture, CaptureEvent, CaptureOptions, CapturePipeline, StopFlag};
pub use recognizer::{RecognizerUpdate, StreamingRecognizer};

#[cfg(feature = "stt-vosk")]
pub use recognizer::VoskRecognizer;
