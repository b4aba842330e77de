//! Streaming speech-recognizer boundary.
//!
//! The capture loop only needs three behaviors per chunk: a finalized
//! segment, an in-progress partial, or silence, plus a flush at stream end.
//! Keeping this behind a trait lets the endpointing logic run in tests with
//! a scripted recognizer and without the native Vosk library.

use crate::Result;

/// What the recognizer reported for one audio chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerUpdate {
    /// A segment was finalized with non-empty text.
    Finalized(String),
    /// An in-progress hypothesis; display-only, not yet committed.
    Partial(String),
    /// Nothing recognized in this chunk.
    Silence,
}

/// Consumes 16 kHz mono 16-bit PCM and produces incremental transcripts.
pub trait StreamingRecognizer: Send {
    /// Feed one chunk of samples.
    fn accept_pcm(&mut self, pcm: &[i16]) -> Result<RecognizerUpdate>;

    /// Flush at end of stream; yields any trailing finalized text.
    fn finalize(&mut self) -> Result<Option<String>>;
}

#[cfg(feature = "stt-vosk")]
pub use vosk_engine::VoskRecognizer;

#[cfg(feature = "stt-vosk")]
mod vosk_engine {
    use super::{RecognizerUpdate, StreamingRecognizer};
    use crate::{LucidError, Result};
    use vosk::{DecodingState, Model, Recognizer};

    /// Vosk-backed streaming recognizer.
    pub struct VoskRecognizer {
        recognizer: Recognizer,
    }

    impl VoskRecognizer {
        pub fn new(model_path: &str, sample_rate: f32) -> Result<Self> {
            let model = Model::new(model_path).ok_or_else(|| {
                LucidError::Recognition(format!("failed to load model at {}", model_path))
            })?;
            let recognizer = Recognizer::new(&model, sample_rate).ok_or_else(|| {
                LucidError::Recognition("failed to create recognizer".to_string())
            })?;
            Ok(Self { recognizer })
        }

        fn take_result(&mut self) -> String {
            self.recognizer
                .result()
                .single()
                .map(|r| r.text.to_string())
                .unwrap_or_default()
        }
    }

    impl StreamingRecognizer for VoskRecognizer {
        fn accept_pcm(&mut self, pcm: &[i16]) -> Result<RecognizerUpdate> {
            match self.recognizer.accept_waveform(pcm) {
                Ok(DecodingState::Finalized) => {
                    let text = self.take_result();
                    if text.trim().is_empty() {
                        Ok(RecognizerUpdate::Silence)
                    } else {
                        Ok(RecognizerUpdate::Finalized(text))
                    }
                }
                Ok(DecodingState::Running) => {
                    let partial = self.recognizer.partial_result().partial.to_string();
                    if partial.trim().is_empty() {
                        Ok(RecognizerUpdate::Silence)
                    } else {
                        Ok(RecognizerUpdate::Partial(partial))
                    }
                }
                Ok(DecodingState::Failed) => {
                    Err(LucidError::Recognition("decoding failed".to_string()))
                }
                Err(e) => Err(LucidError::Recognition(format!(
                    "accept_waveform: {:?}",
                    e
                ))),
            }
        }

        fn finalize(&mut self) -> Result<Option<String>> {
            let text = self
                .recognizer
                .final_result()
                .single()
                .map(|r| r.text.to_string())
                .unwrap_or_default();
            if text.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(text))
            }
        }
    }
}
