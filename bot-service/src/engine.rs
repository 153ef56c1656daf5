use std::time::Instant;

use shared::config::EngineConfig;
use shared::errors::Result;
use shared::types::{RecipientHandle, SenderHandle, Submission, UserId};

use crate::quota::QuotaTracker;
use crate::rate_limiter::RateLimiter;
use crate::state::{ConversationState, Draft};

/// What the user did, as seen by the engine. The transport layer maps
/// commands, menu callbacks and plain text onto these.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    StartCard,
    Text(&'a str),
    Cancel,
}

/// The prompt owed to the user after a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStep {
    SenderAlias,
    RecipientHandle,
    RecipientName,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    TooFast,
    TooLong { max: usize },
    QuotaExceeded,
}

/// Side effect the transport layer must perform after a transition. The
/// engine itself never sends messages or talks to the admin chat.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Same-state retry; render the reason and re-prompt.
    Reject(Reason),
    /// Step accepted; show the prompt for the next step.
    Prompt(PromptStep),
    /// Terminal step accepted; deliver, then `commit` on success.
    Ready(Submission),
    /// Draft dropped on explicit cancellation.
    Cancelled,
    /// No active conversation; show the generic menu hint.
    Help,
    /// Drop the event without a reply (rate-limited idle chatter).
    Silent,
}

#[derive(Debug)]
pub struct Transition {
    pub next: ConversationState,
    pub effect: Effect,
}

impl Transition {
    fn stay(state: ConversationState, effect: Effect) -> Self {
        Self { next: state, effect }
    }
}

/// Drives the 4-step submission flow for every user. Decisions are
/// synchronous and in-memory; the caller owns all I/O, including the
/// delivery attempt that gates `commit`.
pub struct Engine {
    limiter: RateLimiter,
    quota: QuotaTracker,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            limiter: RateLimiter::new(config.cooldown),
            quota: QuotaTracker::new(config.submission_quota),
            config,
        }
    }

    pub fn remaining(&self, user_id: UserId) -> u32 {
        self.quota.limit().saturating_sub(self.quota.count(user_id))
    }

    /// Records a successful delivery and returns the user's new submission
    /// count. Called by the transport layer only after the dispatcher
    /// reported success, so a failed delivery never consumes quota.
    pub fn commit(&mut self, user_id: UserId) -> u32 {
        let count = self.quota.increment(user_id);
        tracing::info!(user = %user_id, count, "submission committed");
        count
    }

    /// Single decision point of the conversation. The rate-limit gate runs
    /// before anything else: a rejected event never advances state, never
    /// touches the draft and never consumes quota.
    pub fn advance(
        &mut self,
        user_id: UserId,
        sender_handle: &SenderHandle,
        state: ConversationState,
        event: Event<'_>,
        now: Instant,
    ) -> Result<Transition> {
        if self.limiter.is_too_fast(user_id, now) {
            tracing::debug!(user = %user_id, "event dropped: cooldown");
            let effect = match (&state, &event) {
                // The original bot ignores rate-limited chatter outside a flow.
                (ConversationState::Idle, Event::Text(_)) => Effect::Silent,
                _ => Effect::Reject(Reason::TooFast),
            };
            return Ok(Transition::stay(state, effect));
        }

        match event {
            Event::StartCard => Ok(self.start_card(user_id, state)),
            Event::Cancel => Ok(self.cancel(state)),
            Event::Text(text) => self.step_input(user_id, sender_handle, state, text),
        }
    }

    fn start_card(&self, user_id: UserId, state: ConversationState) -> Transition {
        match state {
            ConversationState::Idle => {
                if !self.quota.has_remaining(user_id) {
                    tracing::debug!(user = %user_id, "start rejected: quota exhausted");
                    return Transition::stay(state, Effect::Reject(Reason::QuotaExceeded));
                }
                Transition {
                    next: ConversationState::AwaitingSenderAlias {
                        draft: Draft::default(),
                    },
                    effect: Effect::Prompt(PromptStep::SenderAlias),
                }
            }
            // A stray menu press mid-flow re-prompts the current step rather
            // than wiping the draft.
            other => {
                let step = current_step(&other);
                Transition::stay(other, Effect::Prompt(step))
            }
        }
    }

    fn cancel(&self, state: ConversationState) -> Transition {
        match state {
            ConversationState::Idle => Transition::stay(state, Effect::Help),
            _ => Transition {
                next: ConversationState::Idle,
                effect: Effect::Cancelled,
            },
        }
    }

    fn step_input(
        &self,
        user_id: UserId,
        sender_handle: &SenderHandle,
        state: ConversationState,
        text: &str,
    ) -> Result<Transition> {
        let limits = self.config.limits;

        let transition = match state {
            ConversationState::Idle => Transition::stay(state, Effect::Help),

            ConversationState::AwaitingSenderAlias { mut draft } => {
                if char_len(text) > limits.sender_alias_max {
                    return Ok(Transition::stay(
                        ConversationState::AwaitingSenderAlias { draft },
                        Effect::Reject(Reason::TooLong {
                            max: limits.sender_alias_max,
                        }),
                    ));
                }
                draft.sender_alias = Some(text.to_string());
                Transition {
                    next: ConversationState::AwaitingRecipientHandle { draft },
                    effect: Effect::Prompt(PromptStep::RecipientHandle),
                }
            }

            ConversationState::AwaitingRecipientHandle { mut draft } => {
                // Normalization never fails: anything that is not an opt-out
                // literal is taken as a handle.
                draft.recipient_handle = Some(RecipientHandle::parse(text));
                Transition {
                    next: ConversationState::AwaitingRecipientName { draft },
                    effect: Effect::Prompt(PromptStep::RecipientName),
                }
            }

            ConversationState::AwaitingRecipientName { mut draft } => {
                if char_len(text) > limits.recipient_name_max {
                    return Ok(Transition::stay(
                        ConversationState::AwaitingRecipientName { draft },
                        Effect::Reject(Reason::TooLong {
                            max: limits.recipient_name_max,
                        }),
                    ));
                }
                draft.recipient_name = Some(text.to_string());
                Transition {
                    next: ConversationState::AwaitingBody { draft },
                    effect: Effect::Prompt(PromptStep::Body),
                }
            }

            ConversationState::AwaitingBody { mut draft } => {
                if char_len(text) > limits.body_max {
                    return Ok(Transition::stay(
                        ConversationState::AwaitingBody { draft },
                        Effect::Reject(Reason::TooLong {
                            max: limits.body_max,
                        }),
                    ));
                }
                draft.body = Some(text.to_string());

                // Sequence number is taken from the current count and only
                // persisted by `commit` after delivery succeeds, so a failed
                // delivery does not burn it.
                let sequence_number = self.quota.count(user_id) + 1;
                let submission = draft.assemble(sender_handle.clone(), sequence_number)?;
                tracing::info!(user = %user_id, sequence_number, "submission assembled");
                Transition {
                    next: ConversationState::Idle,
                    effect: Effect::Ready(submission),
                }
            }
        };

        Ok(transition)
    }
}

fn current_step(state: &ConversationState) -> PromptStep {
    match state {
        ConversationState::Idle | ConversationState::AwaitingSenderAlias { .. } => {
            PromptStep::SenderAlias
        }
        ConversationState::AwaitingRecipientHandle { .. } => PromptStep::RecipientHandle,
        ConversationState::AwaitingRecipientName { .. } => PromptStep::RecipientName,
        ConversationState::AwaitingBody { .. } => PromptStep::Body,
    }
}

/// Lengths are checked in characters, not bytes, so Cyrillic and emoji
/// input counts the way users expect.
fn char_len(text: &str) -> usize {
    text.chars().count()
}
