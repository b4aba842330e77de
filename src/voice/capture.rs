//! Capture loop: drain microphone chunks, feed the recognizer, endpoint on
//! silence, yield the final prompt.
//!
//! Runs on its own thread so recognition never blocks the UI. Transcript
//! previews and the final result travel back over an event channel; the loop
//! never mutates session history itself.

use crate::utils::TaskPool;
use crate::Result;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::recognizer::{RecognizerUpdate, StreamingRecognizer};

/// Shared cancel flag; setting it ends the capture promptly with whatever
/// text was committed so far.
pub type StopFlag = Arc<AtomicBool>;

/// Events emitted while a capture is in flight.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    Started,

    /// Live transcript preview: committed text plus the provisional partial.
    Preview { committed: String, partial: String },

    /// Capture ended; `None` means nothing was recognized and the caller
    /// must not trigger a generation.
    Finished(Option<String>),

    /// Device or recognizer failure aborted the capture.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// End the utterance after this long without recognizer output.
    pub silence_threshold: Duration,

    /// How long one queue poll may block; bounds cancel/silence latency.
    pub poll_interval: Duration,

    pub start_cue: Option<PathBuf>,
    pub end_cue: Option<PathBuf>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            silence_threshold: Duration::from_secs(2),
            poll_interval: Duration::from_millis(250),
            start_cue: Some(PathBuf::from("assets/Listening-start.mp3")),
            end_cue: Some(PathBuf::from("assets/Listening-end.mp3")),
        }
    }
}

/// Drain `chunks` through `recognizer` until silence or cancellation, then
/// flush and return the accumulated prompt.
pub fn run_capture(
    chunks: &Receiver<Vec<i16>>,
    recognizer: &mut dyn StreamingRecognizer,
    options: &CaptureOptions,
    events: &Sender<CaptureEvent>,
    stop: &StopFlag,
) -> Result<Option<String>> {
    let mut transcript = String::new();
    let mut last_speech = Instant::now();

    loop {
        if stop.load(Ordering::Relaxed) {
            info!("Voice capture cancelled");
            break;
        }

        match chunks.recv_timeout(options.poll_interval) {
            Ok(chunk) => match recognizer.accept_pcm(&chunk)? {
                RecognizerUpdate::Finalized(text) => {
                    transcript.push_str(&text);
                    transcript.push(' ');
                    last_speech = Instant::now();
                    let _ = events.send(CaptureEvent::Preview {
                        committed: transcript.trim().to_string(),
                        partial: String::new(),
                    });
                }
                RecognizerUpdate::Partial(partial) => {
                    last_speech = Instant::now();
                    let _ = events.send(CaptureEvent::Preview {
                        committed: transcript.trim().to_string(),
                        partial,
                    });
                }
                RecognizerUpdate::Silence => {}
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if last_speech.elapsed() > options.silence_threshold {
            break;
        }
    }

    if let Some(tail) = recognizer.finalize()? {
        transcript.push_str(&tail);
    }

    let prompt = transcript.trim();
    if prompt.is_empty() {
        Ok(None)
    } else {
        Ok(Some(prompt.to_string()))
    }
}

/// Spawns capture runs on dedicated threads and plays the start/end cues.
pub struct CapturePipeline {
    options: CaptureOptions,
    pool: Arc<TaskPool>,
}

impl CapturePipeline {
    pub fn new(options: CaptureOptions, pool: Arc<TaskPool>) -> Self {
        Self { options, pool }
    }

    /// Start one capture. The caller supplies the chunk source (typically
    /// [`crate::audio::AudioInput`]) and a fresh recognizer; events arrive on
    /// the returned receiver and the flag cancels the run.
    pub fn start<R>(&self, chunks: Receiver<Vec<i16>>, mut recognizer: R) -> (Receiver<CaptureEvent>, StopFlag)
    where
        R: StreamingRecognizer + 'static,
    {
        let (event_tx, event_rx) = bounded(64);
        let stop: StopFlag = Arc::new(AtomicBool::new(false));

        let options = self.options.clone();
        let pool = Arc::clone(&self.pool);
        let worker_stop = Arc::clone(&stop);
        let failure_tx = event_tx.clone();

        let spawned = std::thread::Builder::new()
            .name("voice-capture".to_string())
            .spawn(move || {
                let _ = event_tx.send(CaptureEvent::Started);
                play_cue(&pool, &options.start_cue);
                info!("Listening for speech");

                let result = run_capture(
                    &chunks,
                    &mut recognizer,
                    &options,
                    &event_tx,
                    &worker_stop,
                );

                // The end cue plays on every outcome, including the
                // no-prompt path.
                play_cue(&pool, &options.end_cue);

                match result {
                    Ok(prompt) => {
                        match &prompt {
                            Some(text) => info!("Recognized: {}", text),
                            None => info!("No prompt recognized"),
                        }
                        let _ = event_tx.send(CaptureEvent::Finished(prompt));
                    }
                    Err(e) => {
                        warn!("Voice capture aborted: {}", e);
                        let _ = event_tx.send(CaptureEvent::Failed(e.to_string()));
                    }
                }
            });

        // A spawn failure must still be observable on the event channel, so
        // callers can tell it apart from a capture that heard nothing.
        if let Err(e) = spawned {
            warn!("Could not spawn capture thread: {}", e);
            let _ = failure_tx.send(CaptureEvent::Failed(format!(
                "spawn capture thread: {}",
                e
            )));
        }

        (event_rx, stop)
    }
}

#[cfg(feature = "audio-io")]
fn play_cue(pool: &TaskPool, cue: &Option<PathBuf>) {
    if let Some(path) = cue.clone() {
        pool.spawn(move || {
            if let Err(e) = crate::audio::play_file(&path) {
                warn!("Cue playback failed: {}", e);
            }
        });
    }
}

#[cfg(not(feature = "audio-io"))]
fn play_cue(_pool: &TaskPool, _cue: &Option<PathBuf>) {}
