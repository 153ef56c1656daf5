use shared::errors::{Result, ServiceError};
use shared::types::Submission;
use teloxide::prelude::*;
use teloxide::types::ChatId;

/// Forwards finished submissions to the admin chat. One attempt per
/// submission; the caller decides what a failure means for the user.
pub struct AdminDispatcher {
    bot: Bot,
    admin_chat: ChatId,
    quota_limit: u32,
}

impl AdminDispatcher {
    pub fn new(bot: Bot, admin_chat_id: i64, quota_limit: u32) -> Self {
        Self {
            bot,
            admin_chat: ChatId(admin_chat_id),
            quota_limit,
        }
    }

    pub async fn deliver(&self, submission: &Submission) -> Result<()> {
        let started = std::time::Instant::now();
        let text = format_admin_message(submission, self.quota_limit);

        self.bot
            .send_message(self.admin_chat, text)
            .await
            .map_err(|e| ServiceError::Delivery(e.to_string()))?;

        shared::record_timing("card_dispatch_seconds", started.elapsed().as_secs_f64());
        tracing::info!(
            sequence = submission.sequence_number,
            "card delivered to admin chat"
        );
        Ok(())
    }
}

fn format_admin_message(submission: &Submission, quota_limit: u32) -> String {
    format!(
        "💌 New card!\n\n\
        📩 Sender: {}\n\
        👤 Alias in the card: {}\n\
        🎯 Recipient: {}\n\
        📱 Recipient handle: {}\n\
        ✉️ Text:\n{}\n\n\
        📊 Cards from this sender: {}/{}\n\
        🕒 {}",
        submission.sender_handle,
        submission.sender_alias,
        submission.recipient_name,
        submission.recipient_handle,
        submission.body,
        submission.sequence_number,
        quota_limit,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{RecipientHandle, SenderHandle};

    fn sample_submission() -> Submission {
        Submission {
            sender_alias: "Secret Admirer".to_string(),
            sender_handle: SenderHandle::Username("sender".to_string()),
            recipient_handle: RecipientHandle::Handle("alice".to_string()),
            recipient_name: "Alice Smith".to_string(),
            body: "You're great!".to_string(),
            sequence_number: 1,
        }
    }

    #[test]
    fn test_format_admin_message() {
        let text = format_admin_message(&sample_submission(), 2);

        assert!(text.contains("@sender"));
        assert!(text.contains("Secret Admirer"));
        assert!(text.contains("Alice Smith"));
        assert!(text.contains("@alice"));
        assert!(text.contains("You're great!"));
        assert!(text.contains("1/2"));
    }

    #[test]
    fn test_format_admin_message_unspecified_recipient() {
        let mut submission = sample_submission();
        submission.recipient_handle = RecipientHandle::Unspecified;
        submission.sender_handle = SenderHandle::Missing;

        let text = format_admin_message(&submission, 2);

        assert!(text.contains("Recipient handle: unspecified"));
        assert!(text.contains("Sender: no username"));
    }
}
