//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

// Import dialogue types
use crate::dialogue::{ChatDialogue, ChatState};

// Import store types
use crate::store::RecordStore;

use super::commands::Command;
use super::conversation::{run_action, Sender};
use super::router::{route_command, route_text};

fn sender_of(msg: &Message) -> Sender<'_> {
    let from = msg.from.as_ref();
    Sender {
        chat_id: msg.chat.id.0,
        first_name: from.map(|user| user.first_name.as_str()).unwrap_or_default(),
        language_code: from.and_then(|user| user.language_code.as_deref()),
    }
}

/// Handle a recognised bot command
pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    store: Arc<dyn RecordStore>,
    dialogue: ChatDialogue,
    state: ChatState,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, command = cmd.name(), "Received command from user");

    run_action(
        &bot,
        store.as_ref(),
        &dialogue,
        state,
        route_command(&cmd),
        sender_of(&msg),
    )
    .await
}

/// Handle any other message
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    store: Arc<dyn RecordStore>,
    dialogue: ChatDialogue,
    state: ChatState,
) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!(user_id = %msg.chat.id, "Ignoring message without text");
        return Ok(());
    };

    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    let sender = sender_of(&msg);
    let action = route_text(state, text, sender.language_code);

    run_action(
        &bot,
        store.as_ref(),
        &dialogue,
        state,
        action,
        sender,
    )
    .await
}
