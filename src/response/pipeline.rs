//! Response pipeline worker.
//!
//! Runs the external generation tool off the UI thread, with a hard timeout.
//! Every failure mode degrades to assistant-visible error text appended to
//! the session log; a failed generation never kills the session or the
//! process.

use crate::config::ConfigStore;
use crate::session::MessageLog;
use crate::{LucidError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::invocation::{build_invocation, serialize_conversation, Invocation};

/// Hard ceiling on one external generation call.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Commands accepted by the response pipeline worker.
#[derive(Debug, Clone)]
pub enum ResponseCommand {
    /// Generate a reply to `prompt` within the given session's history.
    Generate {
        session_id: Uuid,
        model: String,
        log: MessageLog,
        prompt: String,
        request_id: Uuid,
    },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the response pipeline worker.
#[derive(Debug, Clone)]
pub enum ResponseEvent {
    /// The external tool has been launched for this request.
    Started { session_id: Uuid, request_id: Uuid },

    /// Generation finished; `text` is already appended to the session log.
    Complete {
        session_id: Uuid,
        request_id: Uuid,
        text: String,
        is_error: bool,
        elapsed_ms: u64,
    },

    /// Pipeline has shut down
    Shutdown,
}

/// Result of one generation call.
#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    pub text: String,
    pub is_error: bool,
}

/// Run the external tool and collect its output.
///
/// `Ok` carries trimmed stdout; `Err` carries text already shaped for the
/// transcript (`[Error]` for a non-zero exit, `[Exception]` for launch
/// failures and timeouts).
async fn run_tool(invocation: &Invocation) -> std::result::Result<String, String> {
    let output = tokio::process::Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(GENERATION_TIMEOUT, output).await {
        Ok(Ok(output)) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                Err(format!(
                    "[Error]: {}",
                    String::from_utf8_lossy(&output.stderr)
                ))
            }
        }
        Ok(Err(e)) => Err(format!("[Exception]: {}", e)),
        Err(_) => Err(format!(
            "[Exception]: generation timed out after {}s",
            GENERATION_TIMEOUT.as_secs()
        )),
    }
}

/// Generate a reply to `prompt` for a session using `model`.
pub fn get_response(
    runtime: &Runtime,
    config: &crate::config::Config,
    model: &str,
    log: &MessageLog,
    prompt: &str,
) -> ResponseOutcome {
    let payload = serialize_conversation(&log.get_all(), prompt);
    let invocation = build_invocation(config, model, &payload);
    get_response_with(runtime, &invocation, log, prompt)
}

/// Run a prebuilt invocation against a session log.
///
/// This is the single place that appends prompt/response pairs to a session
/// log: the user prompt goes in right before the tool runs, the assistant
/// text (answer or degraded error) right after.
pub fn get_response_with(
    runtime: &Runtime,
    invocation: &Invocation,
    log: &MessageLog,
    prompt: &str,
) -> ResponseOutcome {
    debug!(
        "Running {} with {} arg(s)",
        invocation.program,
        invocation.args.len()
    );

    log.push_user(prompt);

    let outcome = match runtime.block_on(run_tool(invocation)) {
        Ok(text) => ResponseOutcome {
            text,
            is_error: false,
        },
        Err(text) => {
            error!("Generation failed: {}", text);
            ResponseOutcome {
                text,
                is_error: true,
            }
        }
    };

    log.push_assistant(outcome.text.clone());
    outcome
}

/// Channel-driven worker wrapping [`get_response`], so the blocking external
/// call never runs on the UI thread.
pub struct ResponsePipeline {
    config: Arc<ConfigStore>,
    command_tx: Sender<ResponseCommand>,
    command_rx: Receiver<ResponseCommand>,
    event_tx: Sender<ResponseEvent>,
    event_rx: Receiver<ResponseEvent>,
}

impl ResponsePipeline {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        let (command_tx, command_rx) = bounded(100);
        let (event_tx, event_rx) = bounded(100);

        Self {
            config,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    pub fn command_sender(&self) -> Sender<ResponseCommand> {
        self.command_tx.clone()
    }

    pub fn event_receiver(&self) -> Receiver<ResponseEvent> {
        self.event_rx.clone()
    }

    /// Spawn the worker thread that services generation requests.
    pub fn start_worker(self) -> Result<()> {
        let config = self.config;
        let command_rx = self.command_rx;
        let event_tx = self.event_tx;

        std::thread::Builder::new()
            .name("response-pipeline".to_string())
            .spawn(move || {
                info!("Response pipeline worker starting");

                let runtime = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to create tokio runtime: {}", e);
                        let _ = event_tx.send(ResponseEvent::Shutdown);
                        return;
                    }
                };

                loop {
                    match command_rx.recv() {
                        Ok(ResponseCommand::Generate {
                            session_id,
                            model,
                            log,
                            prompt,
                            request_id,
                        }) => {
                            let _ = event_tx.send(ResponseEvent::Started {
                                session_id,
                                request_id,
                            });

                            let start = Instant::now();
                            let snapshot = config.get();
                            let outcome =
                                get_response(&runtime, &snapshot, &model, &log, &prompt);

                            let _ = event_tx.send(ResponseEvent::Complete {
                                session_id,
                                request_id,
                                text: outcome.text,
                                is_error: outcome.is_error,
                                elapsed_ms: start.elapsed().as_millis() as u64,
                            });
                        }

                        Ok(ResponseCommand::Shutdown) => {
                            info!("Response pipeline worker shutting down");
                            let _ = event_tx.send(ResponseEvent::Shutdown);
                            break;
                        }

                        Err(e) => {
                            error!("Command channel error: {}", e);
                            break;
                        }
                    }
                }
            })
            .map_err(|e| LucidError::Channel(format!("spawn response worker: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn missing_tool_degrades_to_exception_text() {
        let runtime = Runtime::new().unwrap();
        let invocation = Invocation {
            program: "lucid-no-such-tool".to_string(),
            args: vec!["-q".to_string()],
        };

        let err = runtime.block_on(run_tool(&invocation)).unwrap_err();
        assert!(err.starts_with("[Exception]:"));
    }

    #[test]
    fn get_response_appends_prompt_then_reply() {
        let runtime = Runtime::new().unwrap();
        let log = MessageLog::new();

        // The tool is absent in the test environment, so the outcome is the
        // degraded error path; the history shape is the same either way.
        let mut config = Config::default();
        config.selected_model = "phind".to_string();
        let outcome = get_response(&runtime, &config, "phind", &log, "Hello");

        let history = log.get_all();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, crate::session::Sender::User);
        assert_eq!(history[0].text, "Hello");
        assert_eq!(history[1].sender, crate::session::Sender::Assistant);
        assert_eq!(history[1].text, outcome.text);
    }
}
