//! # Butterfly Telegram Bot
//!
//! A Telegram bot that greets users with a menu, learns their name through a
//! short acquaintance dialogue and keeps a Postgres log of users and messages.

pub mod bot;
pub mod config;
pub mod config_errors;
pub mod db;
pub mod dialogue;
pub mod localization;
pub mod store;
