//! End-to-end response pipeline tests against a scripted generation tool.

#![cfg(unix)]

use lucid::config::Config;
use lucid::response::{build_invocation, get_response_with, serialize_conversation, Invocation};
use lucid::session::{MessageLog, Sender, SessionRegistry};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

/// Write a fake `tgpt` shell script into `dir` and return its path.
fn fake_tool(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("tgpt");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn scripted_invocation(tool: &Path, config: &Config, model: &str, payload: &str) -> Invocation {
    let mut invocation = build_invocation(config, model, payload);
    invocation.program = tool.to_string_lossy().into_owned();
    invocation
}

#[test]
fn successful_generation_appends_prompt_and_reply() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), r#"echo "Hi there""#);
    let runtime = Runtime::new().unwrap();

    let mut config = Config::default();
    config.enabled_models.insert("phind".to_string(), true);
    config.selected_model = "phind".to_string();

    let log = MessageLog::new();
    let payload = serialize_conversation(&log.get_all(), "Hello");
    let invocation = scripted_invocation(&tool, &config, "phind", &payload);

    let outcome = get_response_with(&runtime, &invocation, &log, "Hello");
    assert!(!outcome.is_error);
    assert_eq!(outcome.text, "Hi there");

    let history = log.get_all();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sender, Sender::User);
    assert_eq!(history[0].text, "Hello");
    assert_eq!(history[1].sender, Sender::Assistant);
    assert_eq!(history[1].text, "Hi there");
}

#[test]
fn failed_generation_degrades_to_transcript_error() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), r#"echo "rate limited" >&2; exit 1"#);
    let runtime = Runtime::new().unwrap();

    let config = Config::default();
    let log = MessageLog::new();
    let payload = serialize_conversation(&log.get_all(), "Hello");
    let invocation = scripted_invocation(&tool, &config, "phind", &payload);

    let outcome = get_response_with(&runtime, &invocation, &log, "Hello");
    assert!(outcome.is_error);

    let history = log.get_all();
    let last = history.last().unwrap();
    assert_eq!(last.sender, Sender::Assistant);
    assert!(last.text.contains("rate limited"));
    assert!(last.text.starts_with("[Error]:"));

    // The conversation continues normally after a failure.
    assert_eq!(history[0].sender, Sender::User);
    assert_eq!(history[0].text, "Hello");
}

#[test]
fn tool_receives_the_conversation_as_one_argument() {
    let dir = tempfile::tempdir().unwrap();
    // Default phind config produces `-q --provider phind <payload>`, so the
    // payload is the fourth positional argument. Echo it straight back.
    let tool = fake_tool(dir.path(), r#"printf '%s\n' "$4""#);
    let runtime = Runtime::new().unwrap();

    let config = Config::default();
    let log = MessageLog::new();
    log.push_user("What is Rust?\nIn one line.");
    log.push_assistant("A systems language.");

    let payload = serialize_conversation(&log.get_all(), "Thanks");
    let invocation = scripted_invocation(&tool, &config, "phind", &payload);

    let outcome = get_response_with(&runtime, &invocation, &log, "Thanks");
    assert_eq!(
        outcome.text,
        "You: What is Rust?\\nIn one line.\\n\\nAI: A systems language.\\n\\nYou: Thanks"
    );
}

#[test]
fn generated_history_survives_a_persistence_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), r#"echo "Hi there""#);
    let runtime = Runtime::new().unwrap();

    let snapshot_path = dir.path().join("chat_history.yaml");
    let config = Config::default();

    let mut registry = SessionRegistry::open(&snapshot_path);
    let id = registry.create(&config);

    {
        let session = registry.get(id).unwrap();
        let payload = serialize_conversation(&session.log.get_all(), "Hello");
        let invocation = scripted_invocation(&tool, &config, &session.model_name, &payload);
        get_response_with(&runtime, &invocation, &session.log, "Hello");
    }

    registry.persist_all().unwrap();

    let restored = SessionRegistry::open(&snapshot_path);
    let session = restored.get(id).unwrap();
    let history = session.log.get_all();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].text, "Hello");
    assert_eq!(history[1].text, "Hi there");
    assert_eq!(session.model_name, "phind");
}
