/// Fixed lookup from user-facing model name to backend provider key.
///
/// Unknown or unset models fall back to the keyless "phind" provider.
pub const MODEL_PROVIDER_MAP: &[(&str, &str)] = &[
    ("gpt-3.5-turbo", "openai"),
    ("gpt-4o", "openai"),
    ("gemini-pro", "gemini"),
    ("deepseek-chat", "deepseek"),
    ("mixtral", "groq"),
    ("llama3", "groq"),
    ("phind", "phind"),
    ("isou", "isou"),
    ("pollinations", "pollinations"),
    ("llama3-local", "ollama"),
];

pub const DEFAULT_PROVIDER: &str = "phind";

pub fn get_provider_from_model(model: &str) -> &'static str {
    MODEL_PROVIDER_MAP
        .iter()
        .find(|(m, _)| *m == model)
        .map(|(_, p)| *p)
        .unwrap_or(DEFAULT_PROVIDER)
}
