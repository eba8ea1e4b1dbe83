//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import database types
use crate::db::User;

// Import callback identifiers
use super::router::{CALLBACK_SHOW_ACQUAINTANCE, CALLBACK_SHOW_HELP, CALLBACK_SHOW_INFO};

/// The screen an inline menu is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuScreen {
    Info,
    Help,
    Acquaintance,
}

/// Create the persistent reply keyboard shown after /start
pub fn create_main_menu_keyboard(language_code: Option<&str>) -> KeyboardMarkup {
    let buttons = vec![
        vec![
            KeyboardButton::new(t_lang("menu-show-info", language_code)),
            KeyboardButton::new(t_lang("menu-help", language_code)),
        ],
        vec![KeyboardButton::new(t_lang("menu-acquaintance", language_code))],
    ];

    KeyboardMarkup::new(buttons).resize_keyboard()
}

/// Create the inline menu for a screen; the button of the current screen reads "again"
pub fn create_inline_menu(screen: MenuScreen, language_code: Option<&str>) -> InlineKeyboardMarkup {
    let label = |key: &str, again_key: &str, this_screen: MenuScreen| {
        if screen == this_screen {
            t_lang(again_key, language_code)
        } else {
            t_lang(key, language_code)
        }
    };

    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            label("inline-info", "inline-info-again", MenuScreen::Info),
            CALLBACK_SHOW_INFO,
        ),
        InlineKeyboardButton::callback(
            label("inline-help", "inline-help-again", MenuScreen::Help),
            CALLBACK_SHOW_HELP,
        ),
        InlineKeyboardButton::callback(
            label(
                "inline-acquaintance",
                "inline-acquaintance-again",
                MenuScreen::Acquaintance,
            ),
            CALLBACK_SHOW_ACQUAINTANCE,
        ),
    ]])
}

/// Format the /info reply: the stored user record (if any) followed by the bot description
pub fn format_info_message(user: Option<&User>, language_code: Option<&str>) -> String {
    let user_info = match user {
        Some(user) => {
            let id = user.id.to_string();
            let telegram_id = user.telegram_id.to_string();
            format!(
                "{}\n{}\n{}\n{}\n",
                t_lang("info-user-header", language_code),
                t_args_lang("info-user-id", &[("id", id.as_str())], language_code),
                t_args_lang("info-user-name", &[("name", user.name.as_str())], language_code),
                t_args_lang(
                    "info-user-telegram-id",
                    &[("telegram_id", telegram_id.as_str())],
                    language_code
                ),
            )
        }
        None => t_lang("info-user-not-found", language_code),
    };

    format!(
        "{}\n\n{}",
        user_info,
        t_args_lang(
            "info-about",
            &[("version", env!("CARGO_PKG_VERSION"))],
            language_code
        )
    )
}
