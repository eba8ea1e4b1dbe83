//! # Conversation Tests
//!
//! Drives the router and the conversation layer against an in-memory
//! record store, checking the behaviour users observe without Telegram
//! or Postgres.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use teloxide::types::{InlineKeyboardButtonKind, ReplyMarkup};

use butterfly::bot::conversation::{perform, Outcome, Sender};
use butterfly::bot::router::{route_callback, route_command, route_text, Action};
use butterfly::bot::Command;
use butterfly::db::User;
use butterfly::dialogue::ChatState;
use butterfly::store::RecordStore;

#[derive(Default)]
struct MemoryStore {
    users: Mutex<Vec<User>>,
    messages: Mutex<Vec<(i64, String)>>,
    upserts: Mutex<usize>,
}

impl MemoryStore {
    fn user_count(&self, telegram_id: i64) -> usize {
        self.users
            .lock()
            .unwrap()
            .iter()
            .filter(|user| user.telegram_id == telegram_id)
            .count()
    }

    fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    fn upsert_count(&self) -> usize {
        *self.upserts.lock().unwrap()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_user(&self, id: i32) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.telegram_id == telegram_id)
            .cloned())
    }

    async fn upsert_user(&self, telegram_id: i64, name: &str) -> Result<User> {
        *self.upserts.lock().unwrap() += 1;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.telegram_id == telegram_id) {
            user.name = name.to_string();
            return Ok(user.clone());
        }
        let user = User {
            id: users.len() as i32 + 1,
            name: name.to_string(),
            telegram_id,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn insert_message(&self, telegram_id: i64, text: &str) -> Result<i64> {
        let mut messages = self.messages.lock().unwrap();
        messages.push((telegram_id, text.to_string()));
        Ok(messages.len() as i64)
    }
}

/// A store whose every call fails, standing in for a lost database
struct BrokenStore;

#[async_trait]
impl RecordStore for BrokenStore {
    async fn get_user(&self, _id: i32) -> Result<Option<User>> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn get_user_by_telegram_id(&self, _telegram_id: i64) -> Result<Option<User>> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn upsert_user(&self, _telegram_id: i64, _name: &str) -> Result<User> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn insert_message(&self, _telegram_id: i64, _text: &str) -> Result<i64> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

fn sender(chat_id: i64, first_name: &str) -> Sender<'_> {
    Sender {
        chat_id,
        first_name,
        language_code: None,
    }
}

/// Route a text message and perform it, returning the outcome
async fn send_text(
    store: &MemoryStore,
    state: ChatState,
    chat_id: i64,
    text: &str,
) -> Result<Outcome> {
    let from = sender(chat_id, "Ana");
    perform(store, state, route_text(state, text, from.language_code), from).await
}

fn reply_text(outcome: &Outcome) -> &str {
    outcome
        .reply
        .as_ref()
        .map(|reply| reply.text.as_str())
        .unwrap_or_default()
}

fn inline_callbacks(outcome: &Outcome) -> Vec<String> {
    match outcome.reply.as_ref().and_then(|reply| reply.markup.as_ref()) {
        Some(ReplyMarkup::InlineKeyboard(markup)) => markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[tokio::test]
async fn test_start_creates_user_with_main_menu() -> Result<()> {
    let store = MemoryStore::default();

    let outcome = perform(
        &store,
        ChatState::Idle,
        route_command(&Command::Start),
        sender(42, "Ana"),
    )
    .await?;

    let user = store.get_user_by_telegram_id(42).await?.expect("user created");
    assert_eq!(user.telegram_id, 42);
    assert_eq!(user.name, "Ana");

    match outcome.reply.and_then(|reply| reply.markup) {
        Some(ReplyMarkup::Keyboard(markup)) => {
            assert_eq!(markup.keyboard.iter().flatten().count(), 3);
        }
        other => panic!("expected reply keyboard, got {other:?}"),
    }
    assert_eq!(outcome.next_state, ChatState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_start_twice_keeps_one_user() -> Result<()> {
    let store = MemoryStore::default();

    perform(&store, ChatState::Idle, Action::Start, sender(42, "Ana")).await?;
    perform(&store, ChatState::Idle, Action::Start, sender(42, "Anna")).await?;

    assert_eq!(store.user_count(42), 1);
    let user = store.get_user_by_telegram_id(42).await?.unwrap();
    assert_eq!(user.name, "Anna");
    Ok(())
}

#[tokio::test]
async fn test_acquaintance_flow() -> Result<()> {
    let store = MemoryStore::default();
    perform(&store, ChatState::Idle, Action::Start, sender(42, "Ana")).await?;

    let prompt = perform(
        &store,
        ChatState::Idle,
        route_command(&Command::Acquaintance),
        sender(42, "Ana"),
    )
    .await?;
    assert_eq!(prompt.next_state, ChatState::AwaitingName);
    assert_eq!(reply_text(&prompt), "Напишите ваше имя");

    let upserts_before = store.upsert_count();
    let greeting = send_text(&store, prompt.next_state, 42, "Bob").await?;
    assert_eq!(reply_text(&greeting), "Привет - Bob!");
    assert_eq!(greeting.next_state, ChatState::Idle);
    assert_eq!(store.upsert_count(), upserts_before + 1);
    assert_eq!(store.user_count(42), 1);
    assert_eq!(store.get_user_by_telegram_id(42).await?.unwrap().name, "Bob");
    assert_eq!(store.message_count(), 0);

    // The next message is an ordinary message again
    let after = send_text(&store, greeting.next_state, 42, "Carl").await?;
    assert!(after.reply.is_none());
    assert_eq!(store.message_count(), 1);
    assert_eq!(store.get_user_by_telegram_id(42).await?.unwrap().name, "Bob");
    Ok(())
}

#[tokio::test]
async fn test_lowercase_acquaintance_command_arms_state() -> Result<()> {
    use teloxide::utils::command::BotCommands;

    let store = MemoryStore::default();
    let command = Command::parse("/acquaintance", "butterfly_bot")?;

    let outcome = perform(&store, ChatState::Idle, route_command(&command), sender(5, "Eve")).await?;
    assert_eq!(outcome.next_state, ChatState::AwaitingName);
    assert_eq!(reply_text(&outcome), "Напишите ваше имя");
    Ok(())
}

#[tokio::test]
async fn test_acquaintance_callback_arms_state() -> Result<()> {
    let store = MemoryStore::default();
    let action = route_callback("show_Acquaintance").expect("known callback");

    let outcome = perform(&store, ChatState::Idle, action, sender(5, "Eve")).await?;
    assert_eq!(outcome.next_state, ChatState::AwaitingName);
    assert_eq!(
        inline_callbacks(&outcome),
        vec!["show_info", "show_help", "show_Acquaintance"]
    );
    Ok(())
}

#[tokio::test]
async fn test_menu_label_is_taken_as_name_while_awaiting() -> Result<()> {
    let store = MemoryStore::default();

    let outcome = send_text(&store, ChatState::AwaitingName, 9, "Помощь").await?;
    assert_eq!(reply_text(&outcome), "Привет - Помощь!");
    assert_eq!(outcome.next_state, ChatState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_info_for_unknown_user() -> Result<()> {
    let store = MemoryStore::default();

    let outcome = perform(&store, ChatState::Idle, Action::Info, sender(7, "Ivan")).await?;
    assert!(reply_text(&outcome).contains("Пользователь не найден"));
    assert_eq!(
        inline_callbacks(&outcome),
        vec!["show_info", "show_help", "show_Acquaintance"]
    );
    assert_eq!(store.user_count(7), 0);
    Ok(())
}

#[tokio::test]
async fn test_info_for_known_user() -> Result<()> {
    let store = MemoryStore::default();
    perform(&store, ChatState::Idle, Action::Start, sender(42, "Ana")).await?;

    let outcome = perform(&store, ChatState::Idle, Action::Info, sender(42, "Ana")).await?;
    let text = reply_text(&outcome);
    assert!(text.contains("Name: Ana"));
    assert!(text.contains("telegram_id: 42"));
    Ok(())
}

#[tokio::test]
async fn test_plain_messages_are_logged_once_each() -> Result<()> {
    let store = MemoryStore::default();

    for (expected, text) in ["one", "two", "two"].iter().enumerate() {
        let outcome = send_text(&store, ChatState::Idle, 42, text).await?;
        assert!(outcome.reply.is_none());
        assert_eq!(store.message_count(), expected + 1);
    }
    Ok(())
}

#[tokio::test]
async fn test_menu_labels_are_not_logged() -> Result<()> {
    let store = MemoryStore::default();

    let info = send_text(&store, ChatState::Idle, 42, "Показать инфо").await?;
    assert!(reply_text(&info).contains("Пользователь не найден"));

    let help = send_text(&store, ChatState::Idle, 42, "Помощь").await?;
    assert!(reply_text(&help).contains("/Acquaintance"));

    assert_eq!(store.message_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_labels_of_other_languages_are_logged() -> Result<()> {
    let store = MemoryStore::default();

    for text in ["Help", "Show info", "Acquaintance"] {
        let outcome = send_text(&store, ChatState::Idle, 42, text).await?;
        assert!(outcome.reply.is_none());
        assert_eq!(outcome.next_state, ChatState::Idle);
    }
    assert_eq!(store.message_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_english_label_from_english_sender() -> Result<()> {
    let store = MemoryStore::default();
    let english = Sender {
        chat_id: 42,
        first_name: "Ana",
        language_code: Some("en"),
    };

    let action = route_text(ChatState::Idle, "Help", english.language_code);
    let outcome = perform(&store, ChatState::Idle, action, english).await?;
    assert!(reply_text(&outcome).starts_with("Here are my commands:"));
    assert_eq!(store.message_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_english_replies() -> Result<()> {
    let store = MemoryStore::default();
    let english = Sender {
        chat_id: 42,
        first_name: "Ana",
        language_code: Some("en-GB"),
    };

    let outcome = perform(&store, ChatState::Idle, Action::BeginAcquaintance, english).await?;
    assert_eq!(reply_text(&outcome), "Write your name");
    Ok(())
}

#[tokio::test]
async fn test_store_errors_propagate() {
    let result = perform(
        &BrokenStore,
        ChatState::AwaitingName,
        Action::CompleteAcquaintance {
            name: "Bob".to_string(),
        },
        sender(42, "Ana"),
    )
    .await;

    let error = result.expect_err("store failure must surface");
    assert!(error.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_help_needs_no_store() -> Result<()> {
    let outcome = perform(&BrokenStore, ChatState::Idle, Action::Help, sender(1, "A")).await?;
    assert!(reply_text(&outcome).contains("/start"));
    Ok(())
}
