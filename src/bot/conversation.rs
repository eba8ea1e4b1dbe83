//! Conversation module executing routed actions
//!
//! [`perform`] runs one action against the record store and yields the reply
//! plus the chat's next state without touching Telegram, so the flow can be
//! exercised with any [`RecordStore`]. [`run_action`] is the thin layer that
//! sends the reply and persists the state.

use anyhow::Result;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ReplyMarkup;
use tracing::{debug, info};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import dialogue types
use crate::dialogue::{store_state, ChatDialogue, ChatState};

// Import store types
use crate::store::RecordStore;

use super::router::Action;
use super::ui_builder::{create_inline_menu, create_main_menu_keyboard, format_info_message, MenuScreen};

/// Who an update came from
#[derive(Debug, Clone, Copy)]
pub struct Sender<'a> {
    /// Chat identifier, stored as `telegram_id`
    pub chat_id: i64,
    pub first_name: &'a str,
    pub language_code: Option<&'a str>,
}

/// Text reply with an optional keyboard
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub markup: Option<ReplyMarkup>,
}

impl Reply {
    fn text(text: String) -> Self {
        Self { text, markup: None }
    }

    fn with_markup(text: String, markup: impl Into<ReplyMarkup>) -> Self {
        Self {
            text,
            markup: Some(markup.into()),
        }
    }
}

/// Result of performing an action
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Plain logged messages get no reply
    pub reply: Option<Reply>,
    pub next_state: ChatState,
}

/// Perform one action for a sender
///
/// Store errors propagate unchanged and leave the state untouched.
pub async fn perform(
    store: &dyn RecordStore,
    state: ChatState,
    action: Action,
    sender: Sender<'_>,
) -> Result<Outcome> {
    let next_state = action.next_state(state);
    let language_code = sender.language_code;

    let reply = match action {
        Action::Start => {
            store.upsert_user(sender.chat_id, sender.first_name).await?;
            Some(Reply::with_markup(
                t_lang("start-greeting", language_code),
                create_main_menu_keyboard(language_code),
            ))
        }
        Action::Help => Some(Reply::with_markup(
            t_lang("help-commands", language_code),
            create_inline_menu(MenuScreen::Help, language_code),
        )),
        Action::Info => {
            let user = store.get_user_by_telegram_id(sender.chat_id).await?;
            Some(Reply::with_markup(
                format_info_message(user.as_ref(), language_code),
                create_inline_menu(MenuScreen::Info, language_code),
            ))
        }
        Action::BeginAcquaintance => Some(Reply::with_markup(
            t_lang("acquaintance-prompt", language_code),
            create_inline_menu(MenuScreen::Acquaintance, language_code),
        )),
        Action::CompleteAcquaintance { name } => {
            store.upsert_user(sender.chat_id, &name).await?;
            Some(Reply::text(t_args_lang(
                "acquaintance-greeting",
                &[("name", name.as_str())],
                language_code,
            )))
        }
        Action::LogMessage { text } => {
            store.insert_message(sender.chat_id, &text).await?;
            None
        }
    };

    Ok(Outcome { reply, next_state })
}

/// Perform an action, send its reply and persist the next state
///
/// `state` is the chat state the dispatcher loaded when the update entered
/// the dialogue.
pub async fn run_action(
    bot: &Bot,
    store: &dyn RecordStore,
    dialogue: &ChatDialogue,
    state: ChatState,
    action: Action,
    sender: Sender<'_>,
) -> Result<()> {
    let chat_id = dialogue.chat_id();
    debug!(user_id = %chat_id, state = ?state, action = ?action, "Performing action");

    let outcome = perform(store, state, action, sender).await?;

    if let Some(reply) = outcome.reply {
        let request = bot.send_message(chat_id, reply.text);
        match reply.markup {
            Some(markup) => request.reply_markup(markup).await?,
            None => request.await?,
        };
    }

    if outcome.next_state != state {
        info!(user_id = %chat_id, from = ?state, to = ?outcome.next_state, "Chat state changed");
        store_state(dialogue, outcome.next_state).await?;
    }

    Ok(())
}
