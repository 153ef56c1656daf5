pub mod config;
pub mod errors;
pub mod telemetry;
pub mod types;

pub use config::{AdminConfig, EngineConfig, FieldLimits};
pub use errors::{Result, ServiceError};
pub use telemetry::{init_metrics, init_tracing, record_counter, record_timing};
pub use types::{RecipientHandle, SenderHandle, Submission, UserId};
