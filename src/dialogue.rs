//! Acquaintance dialogue module for tracking per-chat conversation state.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Conversation state of a single chat
///
/// A chat with no stored state is `Idle`. The state lives in memory only and
/// is lost when the process restarts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatState {
    #[default]
    Idle,
    /// The next plain text message is taken verbatim as the user's name
    AwaitingName,
}

impl ChatState {
    pub fn is_awaiting_name(&self) -> bool {
        matches!(self, ChatState::AwaitingName)
    }
}

/// Storage backing the chat dialogues
pub type ChatStorage = InMemStorage<ChatState>;

/// Type alias for our chat dialogue
pub type ChatDialogue = Dialogue<ChatState, ChatStorage>;

/// Persist the next state, dropping the record once the chat is idle again
pub async fn store_state(dialogue: &ChatDialogue, next: ChatState) -> anyhow::Result<()> {
    match next {
        // Removing a record that was never stored is an error for InMemStorage
        ChatState::Idle => {
            if dialogue.get().await?.is_some() {
                dialogue.exit().await?;
            }
        }
        ChatState::AwaitingName => dialogue.update(next).await?,
    }
    Ok(())
}
