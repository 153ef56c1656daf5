use serde::{Deserialize, Serialize};

/// Telegram numeric user id. Key for all per-user state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform identity of the actual sender, derived from the Telegram account.
/// Never asked from the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SenderHandle {
    Username(String),
    Missing,
}

impl SenderHandle {
    pub fn from_username(username: Option<&str>) -> Self {
        match username {
            Some(name) => Self::Username(name.to_string()),
            None => Self::Missing,
        }
    }
}

impl std::fmt::Display for SenderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Username(name) => write!(f, "@{}", name),
            Self::Missing => write!(f, "no username"),
        }
    }
}

/// Recipient handle as entered by the sender, normalized: a leading `@` is
/// stripped, and the opt-out literals map to `Unspecified`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientHandle {
    Handle(String),
    Unspecified,
}

impl RecipientHandle {
    const OPT_OUT_LITERALS: [&'static str; 2] = ["не знаю", "don't know"];

    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lowered = trimmed.to_lowercase();
        if Self::OPT_OUT_LITERALS.contains(&lowered.as_str()) {
            return Self::Unspecified;
        }
        Self::Handle(trimmed.strip_prefix('@').unwrap_or(trimmed).to_string())
    }
}

impl std::fmt::Display for RecipientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Handle(handle) => write!(f, "@{}", handle),
            Self::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// A finished greeting card, immutable once assembled and ready for delivery
/// to the admin chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub sender_alias: String,
    pub sender_handle: SenderHandle,
    pub recipient_handle: RecipientHandle,
    pub recipient_name: String,
    pub body: String,
    /// This sender's Nth completed submission, 1-based.
    pub sequence_number: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_handle_strips_at_prefix() {
        assert_eq!(
            RecipientHandle::parse("@alice"),
            RecipientHandle::Handle("alice".to_string())
        );
        assert_eq!(
            RecipientHandle::parse("alice"),
            RecipientHandle::Handle("alice".to_string())
        );
    }

    #[test]
    fn test_recipient_handle_opt_out_literals() {
        assert_eq!(RecipientHandle::parse("не знаю"), RecipientHandle::Unspecified);
        assert_eq!(RecipientHandle::parse("Не знаю"), RecipientHandle::Unspecified);
        assert_eq!(
            RecipientHandle::parse("don't know"),
            RecipientHandle::Unspecified
        );
    }

    #[test]
    fn test_recipient_handle_trims_whitespace() {
        assert_eq!(
            RecipientHandle::parse("  @bob  "),
            RecipientHandle::Handle("bob".to_string())
        );
    }

    #[test]
    fn test_sender_handle_display() {
        assert_eq!(
            SenderHandle::from_username(Some("carol")).to_string(),
            "@carol"
        );
        assert_eq!(SenderHandle::from_username(None).to_string(), "no username");
    }
}
