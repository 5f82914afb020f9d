//! Transcript messages and the events emitted when the transcript changes.

use serde::{Deserialize, Serialize};

/// Role in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// True only while the assistant's completion update is pending.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_generating: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            is_generating: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            is_generating: false,
        }
    }

    /// An assistant message whose content will be replaced once generation finishes.
    pub fn generating(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            is_generating: true,
        }
    }
}

/// Change notifications for a transcript, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// A message was appended at `index`.
    MessageAppended { index: usize, message: Message },

    /// The message at `index` was replaced in place.
    MessageUpdated { index: usize, message: Message },

    /// The building flag flipped.
    BuildingChanged { building: bool },

    /// The transcript was torn down and restored to its initial state.
    Reset { messages: Vec<Message> },
}
