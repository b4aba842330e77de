//! Building the external generation command and its conversation payload.

use crate::config::models::get_provider_from_model;
use crate::config::store::KEYLESS_SENTINEL;
use crate::config::Config;
use crate::session::{ChatMessage, Sender};

/// The external text-generation tool. Resolved through `PATH`.
pub const GENERATION_TOOL: &str = "tgpt";

/// Replaces newlines inside one history entry so the payload stays one line.
pub const LINE_BREAK_TOKEN: &str = "\\n";

/// Separates rendered history entries in the payload.
pub const ENTRY_SEPARATOR: &str = "\\n\\n";

/// A fully resolved external command, argument-vector form. No shell is
/// involved, so prompt content needs no quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Render the conversation plus the new prompt as a single-line payload:
/// `"{sender}: {text}"` entries with embedded newlines tokenized, joined by
/// the block separator, the fresh user prompt last.
pub fn serialize_conversation(history: &[ChatMessage], prompt: &str) -> String {
    let mut entries: Vec<String> = history
        .iter()
        .map(|m| {
            format!(
                "{}: {}",
                m.sender.label(),
                m.text.replace('\n', LINE_BREAK_TOKEN)
            )
        })
        .collect();
    entries.push(format!(
        "{}: {}",
        Sender::User.label(),
        prompt.replace('\n', LINE_BREAK_TOKEN)
    ));
    entries.join(ENTRY_SEPARATOR)
}

/// Build the `tgpt` invocation for `model` under the given configuration.
///
/// The provider flag is always present. Key, model and (for openai) base-URL
/// flags are added only when a real API key is configured; the sentinel value
/// marking keyless providers never produces flags.
pub fn build_invocation(config: &Config, model: &str, payload: &str) -> Invocation {
    let provider = get_provider_from_model(model);
    let api_key = config.api_key(provider);

    let mut args = vec![
        "-q".to_string(),
        "--provider".to_string(),
        provider.to_string(),
    ];

    if !api_key.is_empty() && api_key != KEYLESS_SENTINEL {
        args.push("--key".to_string());
        args.push(api_key.to_string());
        args.push("--model".to_string());
        args.push(model.to_string());
        if provider == "openai" {
            args.push("--url".to_string());
            args.push(config.openai_api_base.clone());
        }
    }

    args.push(payload.to_string());

    Invocation {
        program: GENERATION_TOOL.to_string(),
        args,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MessageLog;

    #[test]
    fn provider_flag_is_always_present() {
        let config = Config::default();
        let inv = build_invocation(&config, "phind", "hello");
        assert_eq!(inv.program, GENERATION_TOOL);
        assert_eq!(
            inv.args,
            vec!["-q", "--provider", "phind", "hello"]
        );
    }

    #[test]
    fn sentinel_key_adds_no_credential_flags() {
        let mut config = Config::default();
        config
            .api_keys
            .insert("phind".to_string(), KEYLESS_SENTINEL.to_string());

        let inv = build_invocation(&config, "phind", "hi");
        assert!(!inv.args.iter().any(|a| a == "--key"));
        assert!(!inv.args.iter().any(|a| a == "--model"));
        assert!(!inv.args.iter().any(|a| a == "--url"));
    }

    #[test]
    fn real_key_adds_key_and_model_flags() {
        let mut config = Config::default();
        config
            .api_keys
            .insert("groq".to_string(), "gsk-123".to_string());

        let inv = build_invocation(&config, "mixtral", "hi");
        assert_eq!(
            inv.args,
            vec![
                "-q", "--provider", "groq", "--key", "gsk-123", "--model", "mixtral", "hi"
            ]
        );
    }

    #[test]
    fn openai_additionally_gets_the_base_url() {
        let mut config = Config::default();
        config
            .api_keys
            .insert("openai".to_string(), "sk-123".to_string());
        config.openai_api_base = "https://proxy.local/v1".to_string();

        let inv = build_invocation(&config, "gpt-4o", "hi");
        let url_pos = inv.args.iter().position(|a| a == "--url").unwrap();
        assert_eq!(inv.args[url_pos + 1], "https://proxy.local/v1");
    }

    #[test]
    fn unknown_model_falls_back_to_default_provider() {
        let config = Config::default();
        let inv = build_invocation(&config, "some-future-model", "hi");
        assert_eq!(inv.args[1], "--provider");
        assert_eq!(inv.args[2], "phind");
    }

    #[test]
    fn payload_serializes_history_one_line() {
        let log = MessageLog::new();
        log.push_user("first\nquestion");
        log.push_assistant("answer");

        let payload = serialize_conversation(&log.get_all(), "follow-up");
        assert_eq!(
            payload,
            "You: first\\nquestion\\n\\nAI: answer\\n\\nYou: follow-up"
        );
        assert!(!payload.contains('\n'));
    }

    #[test]
    fn payload_with_empty_history_is_just_the_prompt() {
        assert_eq!(serialize_conversation(&[], "Hello"), "You: Hello");
    }
}
