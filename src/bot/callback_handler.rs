//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, warn};

// Import dialogue types
use crate::dialogue::{ChatDialogue, ChatState};

// Import store types
use crate::store::RecordStore;

use super::conversation::{run_action, Sender};
use super::router::route_callback;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    store: Arc<dyn RecordStore>,
    dialogue: ChatDialogue,
    state: ChatState,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    match q.data.as_deref().and_then(route_callback) {
        Some(action) => {
            // Updates without a chat are dropped before reaching this handler
            let sender = Sender {
                chat_id: dialogue.chat_id().0,
                first_name: &q.from.first_name,
                language_code: q.from.language_code.as_deref(),
            };
            run_action(&bot, store.as_ref(), &dialogue, state, action, sender).await?;
        }
        None => {
            warn!(user_id = %q.from.id, data = ?q.data, "Ignoring unknown callback data");
        }
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id.clone()).await?;

    Ok(())
}
