//! Text-to-speech boundary and fire-and-forget speech service.

pub mod tts;

pub use tts::{EdgeTts, SpeechService, Synthesizer};
