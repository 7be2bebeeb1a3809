//! Core domain logic for LazyDesk, a personal study and inbox assistant.
//! This crate is the single source of truth for business invariants.

pub mod assistant;
pub mod clock;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod mailbox;
pub mod model;
pub mod repo;
pub mod scheduler;
pub mod service;

pub use assistant::Assistant;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{AssistantConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, Gateway};
pub use logging::{default_log_level, init_logging, init_logging_at, logging_status};
pub use mailbox::{GmailClient, MailboxClient, MailboxError, MailboxPoller};
pub use model::notification::Priority;
pub use repo::{RepoError, RepoResult};
pub use scheduler::{Orchestrator, Trigger};
pub use service::notification_service::{rank, NotificationService, PriorityRules};
pub use service::study_service::{AdvisorError, StudyService, TopicSuggestion};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
