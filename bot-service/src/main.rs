mod dispatcher;
mod engine;
mod quota;
mod rate_limiter;
mod state;
mod telegram;

use std::env;
use std::sync::Arc;

use dispatcher::AdminDispatcher;
use engine::Engine;
use shared::config::{AdminConfig, EngineConfig};
use state::ConversationState;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let metrics_port: u16 = env::var("METRICS_PORT")
        .unwrap_or_else(|_| "9091".to_string())
        .parse()
        .expect("METRICS_PORT must be a valid port number");

    shared::init_tracing("bot-service")?;

    shared::init_metrics(metrics_port)?;

    tracing::info!("Starting Bot Service...");

    let bot_token =
        env::var("TELOXIDE_TOKEN").expect("TELOXIDE_TOKEN environment variable not set");

    let engine_config = EngineConfig::from_env()?;
    let admin_config = AdminConfig::from_env()?;

    tracing::info!("Configuration:");
    tracing::info!("  Admin chat id: {}", admin_config.admin_chat_id);
    tracing::info!("  Cooldown: {:?}", engine_config.cooldown);
    tracing::info!("  Submission quota: {}", engine_config.submission_quota);
    tracing::info!(
        "  Field limits: alias {} / name {} / body {}",
        engine_config.limits.sender_alias_max,
        engine_config.limits.recipient_name_max,
        engine_config.limits.body_max
    );

    let bot = Bot::new(bot_token);
    let engine = Arc::new(Mutex::new(Engine::new(engine_config)));
    let admin = Arc::new(AdminDispatcher::new(
        bot.clone(),
        admin_config.admin_chat_id,
        engine_config.submission_quota,
    ));

    run_telegram_bot(bot, engine, admin, engine_config).await;

    Ok(())
}

async fn run_telegram_bot(
    bot: Bot,
    engine: Arc<Mutex<Engine>>,
    admin: Arc<AdminDispatcher>,
    config: EngineConfig,
) {
    tracing::info!("Starting Telegram bot...");

    let storage = InMemStorage::<ConversationState>::new();

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Update, InMemStorage<ConversationState>, ConversationState>()
                .branch(
                    dptree::case![ConversationState::Idle]
                        .endpoint(telegram::handlers::handle_idle_state),
                )
                .branch(
                    dptree::case![ConversationState::AwaitingSenderAlias { draft }]
                        .endpoint(telegram::handlers::handle_sender_alias_step),
                )
                .branch(
                    dptree::case![ConversationState::AwaitingRecipientHandle { draft }]
                        .endpoint(telegram::handlers::handle_recipient_handle_step),
                )
                .branch(
                    dptree::case![ConversationState::AwaitingRecipientName { draft }]
                        .endpoint(telegram::handlers::handle_recipient_name_step),
                )
                .branch(
                    dptree::case![ConversationState::AwaitingBody { draft }]
                        .endpoint(telegram::handlers::handle_body_step),
                ),
        )
        .branch(
            Update::filter_callback_query()
                .enter_dialogue::<Update, InMemStorage<ConversationState>, ConversationState>()
                .endpoint(telegram::handlers::handle_callback_query),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![storage, engine, admin, config])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
