//! Speech synthesis via an external service, playback on the task pool.
//!
//! Each request synthesizes into its own uuid-named temp file, plays it, and
//! removes it. Concurrent requests therefore never fight over a shared
//! output slot. Failures are logged and never retried.

use crate::utils::TaskPool;
use crate::{LucidError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Turns text plus a voice identifier into a playable audio artifact.
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, text: &str, voice: &str, output: &Path) -> Result<()>;
}

/// Synthesizer shelling out to the `edge-tts` CLI.
pub struct EdgeTts {
    program: String,
}

impl EdgeTts {
    pub fn new() -> Self {
        Self {
            program: "edge-tts".to_string(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for EdgeTts {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer for EdgeTts {
    fn synthesize(&self, text: &str, voice: &str, output: &Path) -> Result<()> {
        let result = std::process::Command::new(&self.program)
            .arg("--voice")
            .arg(voice)
            .arg("--text")
            .arg(text)
            .arg("--write-media")
            .arg(output)
            .output()
            .map_err(|e| LucidError::Synthesis(format!("launch {}: {}", self.program, e)))?;

        if !result.status.success() {
            return Err(LucidError::Synthesis(
                String::from_utf8_lossy(&result.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

/// Background read-aloud service.
pub struct SpeechService {
    synthesizer: Arc<dyn Synthesizer>,
    pool: Arc<TaskPool>,
}

impl SpeechService {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, pool: Arc<TaskPool>) -> Self {
        Self { synthesizer, pool }
    }

    /// Speak `text` with `voice`, entirely on the worker pool.
    pub fn speak(&self, text: &str, voice: &str) {
        let synthesizer = Arc::clone(&self.synthesizer);
        let text = text.to_string();
        let voice = voice.to_string();

        self.pool.spawn(move || {
            let artifact =
                std::env::temp_dir().join(format!("lucid-tts-{}.mp3", Uuid::new_v4()));
            run_speech_job(synthesizer.as_ref(), &text, &voice, &artifact);
        });
    }
}

/// Synthesize, play, clean up. Every failure is logged and swallowed.
fn run_speech_job(synthesizer: &dyn Synthesizer, text: &str, voice: &str, artifact: &Path) {
    match synthesizer.synthesize(text, voice, artifact) {
        Ok(()) => {
            debug!("Synthesized {} chars to {:?}", text.len(), artifact);
            #[cfg(feature = "audio-io")]
            if let Err(e) = crate::audio::play_file(artifact) {
                warn!("Speech playback failed: {}", e);
            }
        }
        Err(e) => warn!("Speech synthesis failed: {}", e),
    }

    if let Err(e) = std::fs::remove_file(artifact) {
        debug!("Could not remove speech artifact {:?}: {}", artifact, e);
    }
}
