use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::payloads::SetMyCommandsSetters;
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use butterfly::bot::{localized_bot_commands, schema};
use butterfly::config::BotConfig;
use butterfly::db::init_database_schema;
use butterfly::dialogue::ChatStorage;
use butterfly::store::{PgRecordStore, RecordStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // LOG_FORMAT=json switches to structured output
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn register_commands(bot: &Bot) -> Result<()> {
    bot.set_my_commands(localized_bot_commands(None)).await?;
    bot.set_my_commands(localized_bot_commands(Some("en")))
        .language_code("en")
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    // Missing configuration stops the process before any network activity
    let config = BotConfig::from_env().context("Invalid bot configuration")?;

    info!(database = ?config.database, "Starting Butterfly Telegram Bot");

    let pool = config
        .pool_options()
        .connect_with(config.connect_options())
        .await
        .context("Failed to connect to Postgres")?;

    init_database_schema(&pool).await?;

    let store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool.clone()));

    let bot = Bot::new(&config.bot_token);

    if let Err(e) = register_commands(&bot).await {
        warn!(error = %e, "Failed to register the command menu");
    }

    info!("Bot started, starting dispatcher");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![store, ChatStorage::new()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped, closing database pool");
    pool.close().await;

    Ok(())
}
