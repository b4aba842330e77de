//! Ordered collection of chat sessions with full snapshot persistence.
//!
//! The snapshot document is YAML shaped as `{ chats: [...] }`, one record per
//! session. Saving overwrites the whole document; loading an absent or
//! unparseable snapshot yields an empty registry rather than failing startup.

use crate::config::Config;
use crate::{LucidError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use super::types::{ChatSession, Sender};

/// How many history entries a restored transcript view replays. The full
/// history stays in memory regardless.
pub const RECENT_REPLAY_LIMIT: usize = 10;

/// Canonical on-disk shape of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub name: String,
    pub model: String,
    /// `[sender_label, text]` pairs in conversation order.
    pub history: Vec<(String, String)>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotDoc {
    #[serde(default)]
    chats: Vec<SessionRecord>,
}

impl SessionRecord {
    fn from_session(session: &ChatSession) -> Self {
        Self {
            id: session.id,
            name: session.display_name.clone(),
            model: session.model_name.clone(),
            history: session
                .log
                .get_all()
                .into_iter()
                .map(|m| (m.sender.label().to_string(), m.text))
                .collect(),
        }
    }

    fn into_session(self) -> ChatSession {
        let mut session = ChatSession::new(self.name, self.model);
        session.id = self.id;
        for (label, text) in self.history {
            match Sender::from_label(&label) {
                Sender::User => session.log.push_user(text),
                Sender::Assistant => session.log.push_assistant(text),
            }
        }
        session
    }
}

pub struct SessionRegistry {
    sessions: Vec<ChatSession>,
    path: PathBuf,
}

impl SessionRegistry {
    /// Default on-disk location of the session snapshot.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lucid")
            .join("chat_history.yaml")
    }

    /// Open the registry backed by `path`, restoring any saved sessions.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sessions = Self::restore_all(&path);
        if !sessions.is_empty() {
            info!("Restored {} chat session(s)", sessions.len());
        }
        Self { sessions, path }
    }

    /// Create a new session named after its position, using the currently
    /// selected model.
    pub fn create(&mut self, config: &Config) -> Uuid {
        let name = format!("Chat {}", self.sessions.len() + 1);
        let session = ChatSession::new(name, config.selected_model.clone());
        let id = session.id;
        self.sessions.push(session);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Rename a session. Whitespace-only names are ignored.
    pub fn rename(&mut self, id: Uuid, new_name: &str) -> bool {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return false;
        }
        match self.get_mut(id) {
            Some(session) => {
                session.display_name = trimmed.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove a session by identity. Positional indices are never used here,
    /// so queued deletions cannot shift onto the wrong session.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        self.sessions.len() != before
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Serialize every session and overwrite the snapshot document.
    pub fn persist_all(&self) -> Result<()> {
        let doc = SnapshotDoc {
            chats: self.sessions.iter().map(SessionRecord::from_session).collect(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_yaml::to_string(&doc)
            .map_err(|e| LucidError::Persistence(format!("serialize snapshot: {}", e)))?;
        std::fs::write(&self.path, text)?;

        info!("Persisted {} chat session(s)", self.sessions.len());
        Ok(())
    }

    /// Read the snapshot at `path`. Absent or corrupt documents load as an
    /// empty session list.
    pub fn restore_all(path: &Path) -> Vec<ChatSession> {
        if !path.exists() {
            return Vec::new();
        }

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not read snapshot {:?}: {}", path, e);
                return Vec::new();
            }
        };

        match serde_yaml::from_str::<SnapshotDoc>(&text) {
            Ok(doc) => doc.chats.into_iter().map(SessionRecord::into_session).collect(),
            Err(e) => {
                warn!("Invalid snapshot {:?}: {}", path, e);
                Vec::new()
            }
        }
    }
}
