use shared::errors::{Result, ServiceError};
use shared::types::{RecipientHandle, SenderHandle, Submission};

/// In-progress submission. Fields are filled one per step and stay absent
/// until the matching step succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub sender_alias: Option<String>,
    pub recipient_handle: Option<RecipientHandle>,
    pub recipient_name: Option<String>,
    pub body: Option<String>,
}

impl Draft {
    /// Builds the final submission. The engine only calls this from the
    /// terminal step, after every field has been stored; a missing field
    /// here is a bug, not bad user input.
    pub fn assemble(self, sender_handle: SenderHandle, sequence_number: u32) -> Result<Submission> {
        Ok(Submission {
            sender_alias: require(self.sender_alias, "sender_alias")?,
            sender_handle,
            recipient_handle: require(self.recipient_handle, "recipient_handle")?,
            recipient_name: require(self.recipient_name, "recipient_name")?,
            body: require(self.body, "body")?,
            sequence_number,
        })
    }
}

fn require<T>(field: Option<T>, name: &str) -> Result<T> {
    field.ok_or_else(|| {
        ServiceError::Internal(format!("draft field `{}` missing at assembly", name))
    })
}

/// Per-user dialogue state. Non-idle variants carry the draft accumulated so
/// far. In-memory only; a restart drops every in-flight conversation.
#[derive(Clone, Debug, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingSenderAlias {
        draft: Draft,
    },
    AwaitingRecipientHandle {
        draft: Draft,
    },
    AwaitingRecipientName {
        draft: Draft,
    },
    AwaitingBody {
        draft: Draft,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> Draft {
        Draft {
            sender_alias: Some("Secret Admirer".to_string()),
            recipient_handle: Some(RecipientHandle::Handle("alice".to_string())),
            recipient_name: Some("Alice Smith".to_string()),
            body: Some("You're great!".to_string()),
        }
    }

    #[test]
    fn test_assemble_complete_draft() {
        let submission = full_draft()
            .assemble(SenderHandle::from_username(Some("sender")), 1)
            .unwrap();

        assert_eq!(submission.sender_alias, "Secret Admirer");
        assert_eq!(submission.recipient_name, "Alice Smith");
        assert_eq!(submission.body, "You're great!");
        assert_eq!(submission.sequence_number, 1);
    }

    #[test]
    fn test_assemble_missing_field_is_internal_error() {
        let mut draft = full_draft();
        draft.recipient_name = None;

        let err = draft
            .assemble(SenderHandle::Missing, 1)
            .unwrap_err();

        assert!(matches!(err, ServiceError::Internal(_)));
        assert!(err.to_string().contains("recipient_name"));
    }
}
