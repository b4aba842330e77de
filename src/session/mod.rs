//! Chat sessions: message history, typed-output reveal, and the registry
//! that owns and persists every conversation.

pub mod registry;
pub mod types;
pub mod typing;

pub use registry::{SessionRecord, SessionRegistry, RECENT_REPLAY_LIMIT};
pub use types::{ChatMessage, ChatSession, MessageLog, Sender};
pub use typing::{Reveal, Typewriter};
