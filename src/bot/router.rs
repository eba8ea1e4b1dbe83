//! Router module mapping commands, callbacks and text to bot actions
//!
//! Routing is pure: it only looks at the incoming update and the chat's
//! current [`ChatState`]. Executing the chosen action happens in
//! [`super::conversation`].

use crate::dialogue::ChatState;
use crate::localization::get_localization_manager;

use super::commands::Command;

// Callback identifiers attached to the inline menus
pub const CALLBACK_SHOW_INFO: &str = "show_info";
pub const CALLBACK_SHOW_HELP: &str = "show_help";
pub const CALLBACK_SHOW_ACQUAINTANCE: &str = "show_Acquaintance";

/// One reply-producing action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Upsert the sender under their first name and show the main menu
    Start,
    /// Show the command list
    Help,
    /// Show the stored user record and the bot description
    Info,
    /// Prompt for a name and arm the acquaintance flow
    BeginAcquaintance,
    /// Store the reply to the name prompt
    CompleteAcquaintance { name: String },
    /// Append a plain message to the log
    LogMessage { text: String },
}

impl Action {
    /// State of the chat once this action has been performed
    pub fn next_state(&self, current: ChatState) -> ChatState {
        match self {
            Action::BeginAcquaintance => ChatState::AwaitingName,
            Action::CompleteAcquaintance { .. } => ChatState::Idle,
            _ => current,
        }
    }
}

/// Commands are routed the same way in every state
pub fn route_command(command: &Command) -> Action {
    match command {
        Command::Start => Action::Start,
        Command::Help => Action::Help,
        Command::Info => Action::Info,
        Command::Acquaintance | Command::GetAcquainted => Action::BeginAcquaintance,
    }
}

/// Unknown callback data yields no action
pub fn route_callback(data: &str) -> Option<Action> {
    match data {
        CALLBACK_SHOW_INFO => Some(Action::Info),
        CALLBACK_SHOW_HELP => Some(Action::Help),
        CALLBACK_SHOW_ACQUAINTANCE => Some(Action::BeginAcquaintance),
        _ => None,
    }
}

/// Route a plain text message
///
/// While a name is awaited, any text is the name, menu labels included.
/// Otherwise the reply-keyboard labels in the sender's language act as
/// navigation and are not logged; everything else is logged.
pub fn route_text(state: ChatState, text: &str, language_code: Option<&str>) -> Action {
    if state.is_awaiting_name() {
        return Action::CompleteAcquaintance {
            name: text.to_string(),
        };
    }

    let localization = get_localization_manager();
    let is_label = |key: &str| localization.matches_in_language(key, text, language_code);

    if is_label("menu-show-info") {
        Action::Info
    } else if is_label("menu-help") {
        Action::Help
    } else if is_label("menu-acquaintance") {
        Action::BeginAcquaintance
    } else {
        Action::LogMessage {
            text: text.to_string(),
        }
    }
}
