//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `commands`: The command set and its Telegram menu registration
//! - `router`: Maps commands, callback data and text to actions
//! - `conversation`: Performs actions against the record store
//! - `message_handler`: Handles incoming commands and text messages
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages

pub mod callback_handler;
pub mod commands;
pub mod conversation;
pub mod message_handler;
pub mod router;
pub mod ui_builder;

use teloxide::dispatching::{dialogue, UpdateHandler};
use teloxide::prelude::*;

use crate::dialogue::{ChatState, ChatStorage};

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use commands::{localized_bot_commands, Command};
pub use message_handler::{command_handler, message_handler};

/// Build the update handling tree
///
/// Every update enters the chat's dialogue first; messages try the command
/// filter before falling through to the text handler.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    let command_branch = teloxide::filter_command::<Command, _>().endpoint(command_handler);

    let message_branch = Update::filter_message()
        .branch(command_branch)
        .branch(dptree::endpoint(message_handler));

    let callback_branch = Update::filter_callback_query().endpoint(callback_handler);

    dialogue::enter::<Update, ChatStorage, ChatState, _>()
        .branch(message_branch)
        .branch(callback_branch)
}
