pub mod audio;
pub mod config;
pub mod response;
pub mod session;
pub mod speech;
pub mod utils;
pub mod voice;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum LucidError {
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("TTS error: {0}")]
    Synthesis(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LucidError {
    fn from(e: std::io::Error) -> Self {
        LucidError::Io(e.to_string())
    }
}

impl LucidError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            LucidError::AudioDevice(_) => false,
            LucidError::Recognition(_) => true,
            LucidError::Generation(_) => true,
            LucidError::Synthesis(_) => true,
            LucidError::Persistence(_) => true,
            LucidError::Config(_) => false,
            LucidError::Channel(_) => false,
            LucidError::Io(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            LucidError::AudioDevice(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            LucidError::Recognition(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            LucidError::Generation(_) => {
                "AI response generation failed. Please try again.".to_string()
            }
            LucidError::Synthesis(_) => {
                "Text-to-speech failed. Response will be shown as text.".to_string()
            }
            LucidError::Persistence(_) => {
                "Failed to read or write saved chats.".to_string()
            }
            LucidError::Config(_) => "Configuration error. Please check settings.".to_string(),
            LucidError::Channel(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            LucidError::Io(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LucidError>;
