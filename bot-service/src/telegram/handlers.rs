use std::sync::Arc;
use std::time::Instant;

use shared::config::EngineConfig;
use shared::errors::{Result, ServiceError};
use shared::types::{SenderHandle, UserId};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{CallbackQuery, ChatId, Me, Message},
    utils::command::BotCommands,
};
use tokio::sync::Mutex;

use super::{keyboards, messages};
use crate::dispatcher::AdminDispatcher;
use crate::engine::{Effect, Engine, Event, Reason};
use crate::state::{ConversationState, Draft};

pub type MyDialogue = Dialogue<ConversationState, InMemStorage<ConversationState>>;

fn map_teloxide_err<E: std::fmt::Display>(e: E) -> ServiceError {
    ServiceError::Telegram(e.to_string())
}

fn map_dialogue_err<E: std::fmt::Display>(e: E) -> ServiceError {
    ServiceError::Internal(format!("Failed to update dialogue: {}", e))
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Show the welcome message and menu")]
    Start,
    #[command(description = "Show the rules")]
    Help,
    #[command(description = "Drop the card you are writing")]
    Cancel,
}

pub async fn handle_idle_state(
    bot: Bot,
    msg: Message,
    dialogue: MyDialogue,
    me: Me,
    engine: Arc<Mutex<Engine>>,
    admin: Arc<AdminDispatcher>,
    config: EngineConfig,
) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    match BotCommands::parse(text, me.username()) {
        Ok(Command::Start) => {
            bot.send_message(msg.chat.id, messages::welcome())
                .reply_markup(keyboards::make_main_menu_keyboard())
                .await
                .map_err(map_teloxide_err)?;
        }
        Ok(Command::Help) => {
            bot.send_message(msg.chat.id, messages::rules(&config))
                .reply_markup(keyboards::make_main_menu_keyboard())
                .await
                .map_err(map_teloxide_err)?;
        }
        Ok(Command::Cancel) => {
            run_event(
                &bot,
                &msg,
                &dialogue,
                &engine,
                &admin,
                &config,
                ConversationState::Idle,
                Event::Cancel,
            )
            .await?;
        }
        Err(_) => {
            run_event(
                &bot,
                &msg,
                &dialogue,
                &engine,
                &admin,
                &config,
                ConversationState::Idle,
                Event::Text(text),
            )
            .await?;
        }
    }

    Ok(())
}

pub async fn handle_sender_alias_step(
    bot: Bot,
    msg: Message,
    dialogue: MyDialogue,
    draft: Draft,
    engine: Arc<Mutex<Engine>>,
    admin: Arc<AdminDispatcher>,
    config: EngineConfig,
) -> Result<()> {
    let state = ConversationState::AwaitingSenderAlias { draft };
    run_flow_step(&bot, &msg, &dialogue, &engine, &admin, &config, state).await
}

pub async fn handle_recipient_handle_step(
    bot: Bot,
    msg: Message,
    dialogue: MyDialogue,
    draft: Draft,
    engine: Arc<Mutex<Engine>>,
    admin: Arc<AdminDispatcher>,
    config: EngineConfig,
) -> Result<()> {
    let state = ConversationState::AwaitingRecipientHandle { draft };
    run_flow_step(&bot, &msg, &dialogue, &engine, &admin, &config, state).await
}

pub async fn handle_recipient_name_step(
    bot: Bot,
    msg: Message,
    dialogue: MyDialogue,
    draft: Draft,
    engine: Arc<Mutex<Engine>>,
    admin: Arc<AdminDispatcher>,
    config: EngineConfig,
) -> Result<()> {
    let state = ConversationState::AwaitingRecipientName { draft };
    run_flow_step(&bot, &msg, &dialogue, &engine, &admin, &config, state).await
}

pub async fn handle_body_step(
    bot: Bot,
    msg: Message,
    dialogue: MyDialogue,
    draft: Draft,
    engine: Arc<Mutex<Engine>>,
    admin: Arc<AdminDispatcher>,
    config: EngineConfig,
) -> Result<()> {
    let state = ConversationState::AwaitingBody { draft };
    run_flow_step(&bot, &msg, &dialogue, &engine, &admin, &config, state).await
}

pub async fn handle_callback_query(
    bot: Bot,
    q: CallbackQuery,
    dialogue: MyDialogue,
    engine: Arc<Mutex<Engine>>,
    admin: Arc<AdminDispatcher>,
    config: EngineConfig,
) -> Result<()> {
    if let Some(data) = &q.data {
        if let Some(msg) = &q.message {
            let chat = msg.chat();

            match data.as_str() {
                keyboards::CREATE_CARD_CALLBACK => {
                    let state = dialogue
                        .get()
                        .await
                        .map_err(map_dialogue_err)?
                        .unwrap_or_default();
                    let user_id = UserId(q.from.id.0);
                    let sender_handle = SenderHandle::from_username(q.from.username.as_deref());

                    let transition = {
                        let mut engine = engine.lock().await;
                        engine.advance(
                            user_id,
                            &sender_handle,
                            state,
                            Event::StartCard,
                            Instant::now(),
                        )?
                    };
                    dialogue
                        .update(transition.next)
                        .await
                        .map_err(map_dialogue_err)?;

                    apply_effect(
                        &bot,
                        chat.id,
                        user_id,
                        transition.effect,
                        &engine,
                        &admin,
                        &config,
                    )
                    .await?;
                }
                keyboards::RULES_CALLBACK => {
                    bot.send_message(chat.id, messages::rules(&config))
                        .await
                        .map_err(map_teloxide_err)?;
                }
                _ => {}
            }
        }

        bot.answer_callback_query(q.id.clone())
            .await
            .map_err(map_teloxide_err)?;
    }

    Ok(())
}

/// Common path for the four in-flow states: text in, `/cancel` escape hatch,
/// everything else is step input.
async fn run_flow_step(
    bot: &Bot,
    msg: &Message,
    dialogue: &MyDialogue,
    engine: &Arc<Mutex<Engine>>,
    admin: &AdminDispatcher,
    config: &EngineConfig,
    state: ConversationState,
) -> Result<()> {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, messages::text_only())
            .await
            .map_err(map_teloxide_err)?;
        return Ok(());
    };

    let event = if text.trim() == "/cancel" {
        Event::Cancel
    } else {
        Event::Text(text)
    };

    run_event(bot, msg, dialogue, engine, admin, config, state, event).await
}

async fn run_event(
    bot: &Bot,
    msg: &Message,
    dialogue: &MyDialogue,
    engine: &Arc<Mutex<Engine>>,
    admin: &AdminDispatcher,
    config: &EngineConfig,
    state: ConversationState,
    event: Event<'_>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = UserId(user.id.0);
    let sender_handle = SenderHandle::from_username(user.username.as_deref());

    let transition = {
        let mut engine = engine.lock().await;
        engine.advance(user_id, &sender_handle, state, event, Instant::now())?
    };
    dialogue
        .update(transition.next)
        .await
        .map_err(map_dialogue_err)?;

    apply_effect(
        bot,
        msg.chat.id,
        user_id,
        transition.effect,
        engine,
        admin,
        config,
    )
    .await
}

/// Turns an engine effect into the reply owed for the event. Delivery is
/// awaited before the quota commit and before the confirmation, so a failed
/// send never consumes quota.
async fn apply_effect(
    bot: &Bot,
    chat_id: ChatId,
    user_id: UserId,
    effect: Effect,
    engine: &Arc<Mutex<Engine>>,
    admin: &AdminDispatcher,
    config: &EngineConfig,
) -> Result<()> {
    match effect {
        Effect::Silent => {}
        Effect::Help => {
            bot.send_message(chat_id, messages::help())
                .reply_markup(keyboards::make_main_menu_keyboard())
                .await
                .map_err(map_teloxide_err)?;
        }
        Effect::Cancelled => {
            bot.send_message(chat_id, messages::cancelled())
                .reply_markup(keyboards::make_main_menu_keyboard())
                .await
                .map_err(map_teloxide_err)?;
        }
        Effect::Prompt(step) => {
            bot.send_message(chat_id, messages::prompt(step, config))
                .await
                .map_err(map_teloxide_err)?;
        }
        Effect::Reject(reason) => {
            if matches!(reason, Reason::TooFast) {
                shared::record_counter("rate_limited_events", 1);
            }
            bot.send_message(chat_id, messages::rejection(reason, config))
                .await
                .map_err(map_teloxide_err)?;
        }
        Effect::Ready(submission) => match admin.deliver(&submission).await {
            Ok(()) => {
                let remaining = {
                    let mut engine = engine.lock().await;
                    engine.commit(user_id);
                    engine.remaining(user_id)
                };
                shared::record_counter("cards_delivered", 1);
                bot.send_message(
                    chat_id,
                    messages::success(&submission, remaining, config.submission_quota),
                )
                .reply_markup(keyboards::make_main_menu_keyboard())
                .await
                .map_err(map_teloxide_err)?;
            }
            Err(e) => {
                shared::record_counter("card_delivery_failures", 1);
                tracing::error!(user = %user_id, error = %e, "card delivery failed");
                bot.send_message(chat_id, messages::delivery_failed())
                    .await
                    .map_err(map_teloxide_err)?;
            }
        },
    }

    Ok(())
}
