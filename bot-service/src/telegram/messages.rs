use shared::config::EngineConfig;
use shared::types::Submission;

use crate::engine::{PromptStep, Reason};

pub fn welcome() -> String {
    "💘 Greeting Card Bot 💘\n\n\
    Send an anonymous greeting card to a friend!\n\n\
    ✨ How it works:\n\
    1. You write a message\n\
    2. You tell us who it's for\n\
    3. We deliver the card\n\
    4. The recipient smiles!\n\n\
    Everything is anonymous — your name stays secret."
        .to_string()
}

pub fn help() -> &'static str {
    "Use the menu buttons below, or send /help."
}

pub fn rules(config: &EngineConfig) -> String {
    format!(
        "📋 Rules\n\n\
        • Up to {} cards per person\n\
        • Alias up to {} characters, recipient name up to {}, text up to {}\n\
        • Leave at least {} second(s) between actions\n\
        • No insults: cards are reviewed before delivery\n\
        • /cancel drops the card you are writing",
        config.submission_quota,
        config.limits.sender_alias_max,
        config.limits.recipient_name_max,
        config.limits.body_max,
        config.cooldown.as_secs(),
    )
}

pub fn prompt(step: PromptStep, config: &EngineConfig) -> String {
    match step {
        PromptStep::SenderAlias => format!(
            "✏️ Step 1 of 4: What name should the card show instead of yours?\n\n\
            📝 Examples:\n\
            • \"Your secret admirer\"\n\
            • \"An anonymous friend\"\n\
            • \"Someone from your class\"\n\n\
            ℹ️ The recipient sees this name, never your real one. \
            Up to {} characters.",
            config.limits.sender_alias_max
        ),
        PromptStep::RecipientHandle => "✏️ Step 2 of 4: Send the recipient's @username.\n\n\
            📝 Example: @username, or just username\n\n\
            ℹ️ If you don't know it, reply \"don't know\" and we'll move on."
            .to_string(),
        PromptStep::RecipientName => format!(
            "✏️ Step 3 of 4: Send the recipient's full name.\n\n\
            📝 Examples:\n\
            • \"Alice Smith\"\n\
            • \"Alice\" (if you don't know the last name)\n\n\
            ℹ️ This is what we use to deliver the card. Up to {} characters.",
            config.limits.recipient_name_max
        ),
        PromptStep::Body => format!(
            "✏️ Step 4 of 4: Write the card text.\n\n\
            📝 Example:\n\
            \"Hi! Just wanted to say you're a wonderful person. Good luck with your exams!\"\n\n\
            ⚠️ Limits:\n\
            - At most {} characters\n\
            - No insults",
            config.limits.body_max
        ),
    }
}

pub fn rejection(reason: Reason, config: &EngineConfig) -> String {
    match reason {
        Reason::TooFast => format!(
            "⏳ Slow down a little. Leave at least {} second(s) between actions.",
            config.cooldown.as_secs()
        ),
        Reason::TooLong { max } => format!(
            "❌ That's too long (maximum {} characters). Please shorten it and try again.",
            max
        ),
        Reason::QuotaExceeded => format!(
            "❌ You've already sent the maximum number of cards ({}).",
            config.submission_quota
        ),
    }
}

pub fn success(submission: &Submission, remaining: u32, quota_limit: u32) -> String {
    format!(
        "🎉 Card sent!\n\n\
        Your name in the card: {}\n\
        Recipient: {}\n\
        Recipient handle: {}\n\n\
        📜 Text:\n{}\n\n\
        💌 The card will be delivered shortly.\n\
        🔄 Cards left: {}/{}",
        submission.sender_alias,
        submission.recipient_name,
        submission.recipient_handle,
        submission.body,
        remaining,
        quota_limit,
    )
}

pub fn delivery_failed() -> &'static str {
    "❌ Couldn't send your card. Please try again later."
}

pub fn cancelled() -> &'static str {
    "❌ Card cancelled. Your draft was discarded."
}

pub fn text_only() -> &'static str {
    "❌ Please send text, not other content."
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::config::FieldLimits;
    use shared::types::{RecipientHandle, SenderHandle};
    use std::time::Duration;

    fn test_config() -> EngineConfig {
        EngineConfig {
            cooldown: Duration::from_secs(1),
            submission_quota: 2,
            limits: FieldLimits::default(),
        }
    }

    #[test]
    fn test_rejection_copy_quotes_configured_cooldown() {
        let mut config = test_config();
        config.cooldown = Duration::from_secs(10);

        let text = rejection(Reason::TooFast, &config);
        assert!(text.contains("10 second(s)"));
    }

    #[test]
    fn test_rejection_too_long_quotes_limit() {
        let text = rejection(Reason::TooLong { max: 500 }, &test_config());
        assert!(text.contains("500"));
    }

    #[test]
    fn test_prompts_mention_step_numbers() {
        let config = test_config();
        assert!(prompt(PromptStep::SenderAlias, &config).contains("Step 1 of 4"));
        assert!(prompt(PromptStep::RecipientHandle, &config).contains("Step 2 of 4"));
        assert!(prompt(PromptStep::RecipientName, &config).contains("Step 3 of 4"));
        assert!(prompt(PromptStep::Body, &config).contains("Step 4 of 4"));
    }

    #[test]
    fn test_success_summary() {
        let submission = Submission {
            sender_alias: "Secret Admirer".to_string(),
            sender_handle: SenderHandle::Missing,
            recipient_handle: RecipientHandle::Handle("alice".to_string()),
            recipient_name: "Alice Smith".to_string(),
            body: "You're great!".to_string(),
            sequence_number: 1,
        };

        let text = success(&submission, 1, 2);
        assert!(text.contains("Secret Admirer"));
        assert!(text.contains("Alice Smith"));
        assert!(text.contains("@alice"));
        assert!(text.contains("1/2"));
    }
}
