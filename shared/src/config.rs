use std::env;
use std::time::Duration;

use crate::errors::{Result, ServiceError};

/// Maximum lengths (in characters) for the user-provided submission fields.
#[derive(Debug, Clone, Copy)]
pub struct FieldLimits {
    pub sender_alias_max: usize,
    pub recipient_name_max: usize,
    pub body_max: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            sender_alias_max: 50,
            recipient_name_max: 100,
            body_max: 500,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub cooldown: Duration,
    pub submission_quota: u32,
    pub limits: FieldLimits,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let cooldown_secs: u64 = env::var("RATE_LIMIT_COOLDOWN_SECS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .map_err(|e| {
                ServiceError::Config(format!("Invalid RATE_LIMIT_COOLDOWN_SECS: {}", e))
            })?;

        let submission_quota: u32 = env::var("SUBMISSION_QUOTA")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .map_err(|e| ServiceError::Config(format!("Invalid SUBMISSION_QUOTA: {}", e)))?;

        Ok(Self {
            cooldown: Duration::from_secs(cooldown_secs),
            submission_quota,
            limits: FieldLimits {
                sender_alias_max: parse_limit("MAX_SENDER_ALIAS_CHARS", 50)?,
                recipient_name_max: parse_limit("MAX_RECIPIENT_NAME_CHARS", 100)?,
                body_max: parse_limit("MAX_BODY_CHARS", 500)?,
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub admin_chat_id: i64,
}

impl AdminConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            admin_chat_id: env::var("ADMIN_CHAT_ID")
                .map_err(|_| ServiceError::Config("ADMIN_CHAT_ID not set".to_string()))?
                .parse()
                .map_err(|e| ServiceError::Config(format!("Invalid ADMIN_CHAT_ID: {}", e)))?,
        })
    }
}

fn parse_limit(var: &str, default: usize) -> Result<usize> {
    env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e| ServiceError::Config(format!("Invalid {}: {}", var, e)))
}
