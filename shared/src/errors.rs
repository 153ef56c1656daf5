use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
