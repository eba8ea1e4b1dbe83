//! Bot commands and their registration in the Telegram command menu

use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

// Import localization
use crate::localization::t_lang;

/// Commands understood by the bot
///
/// Command names are case sensitive. `/Acquaintance` keeps its capital letter,
/// but Telegram only accepts lowercase names in the command menu, so the menu
/// advertises the `/acquaintance` alias instead.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    #[command(rename = "start")]
    Start,
    #[command(rename = "help")]
    Help,
    #[command(rename = "info")]
    Info,
    #[command(rename = "Acquaintance")]
    Acquaintance,
    #[command(rename = "acquaintance")]
    GetAcquainted,
}

impl Command {
    /// Command name without the leading slash
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Info => "info",
            Command::Acquaintance => "Acquaintance",
            Command::GetAcquainted => "acquaintance",
        }
    }

    fn description_key(&self) -> &'static str {
        match self {
            Command::Start => "command-start",
            Command::Help => "command-help",
            Command::Info => "command-info",
            Command::Acquaintance | Command::GetAcquainted => "command-acquaintance",
        }
    }

    /// Commands listed in the Telegram command menu
    pub fn menu() -> [Command; 4] {
        [
            Command::Start,
            Command::Help,
            Command::Info,
            Command::GetAcquainted,
        ]
    }
}

/// Build the command menu entries for a language
pub fn localized_bot_commands(language_code: Option<&str>) -> Vec<BotCommand> {
    Command::menu()
        .iter()
        .map(|command| BotCommand::new(command.name(), t_lang(command.description_key(), language_code)))
        .collect()
}
