//! Dialogue turn types.

use serde::{Deserialize, Serialize};

/// Speaker role of a dialogue turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Party member speaking to the familiar
    User,
    /// The familiar's reply
    Assistant,
    /// Persona instruction (never stored in history by the engine itself,
    /// but accepted when loading a saved file)
    System,
}

impl Role {
    /// String form matching the persisted and wire formats.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// One role-tagged message unit in a dialogue.
///
/// Immutable once created; chronological ordering is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}
