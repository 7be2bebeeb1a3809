//! Notification records and priority labels.
//!
//! # Invariants
//! - `priority` defaults to `Priority::Medium`.
//! - `is_read` is the only field mutated after creation.

use super::{require_text, RecordId, ValidationError};
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Display priority attached to a notification.
///
/// Labels written by older tools or by hand that are not one of the four
/// known values are preserved in `Other` and rank after `Low`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
    Other(String),
}

impl Priority {
    /// Sort rank: urgent=1 .. low=4, unrecognised labels last.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 1,
            Self::High => 2,
            Self::Medium => 3,
            Self::Low => 4,
            Self::Other(_) => 5,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Other(label) => label.as_str(),
        }
    }

    /// Parses a stored label. Never fails.
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "urgent" => Self::Urgent,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Origin tag of a notification.
///
/// Kept as free text in storage; these are the tags core writes itself.
pub mod kind {
    pub const EMAIL: &str = "email";
    pub const EMAIL_SUMMARY: &str = "email_summary";
    pub const STUDY_REMINDER: &str = "study_reminder";
    pub const STUDY_ACHIEVEMENT: &str = "study_achievement";
    pub const CODING_REMINDER: &str = "coding_reminder";
    pub const DAILY_SUMMARY: &str = "daily_summary";
    pub const REMINDER: &str = "reminder";
}

/// Insert payload for a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub kind: String,
    pub title: String,
    pub message: Option<String>,
    pub priority: Priority,
    pub scheduled_for: Option<i64>,
    pub action_required: bool,
    /// Epoch milliseconds; supplied by the caller's clock.
    pub created_at: i64,
}

impl NewNotification {
    /// Creates a medium-priority notification with no schedule.
    pub fn new(
        kind: impl Into<String>,
        title: impl Into<String>,
        message: Option<String>,
        created_at: i64,
    ) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            message,
            priority: Priority::default(),
            scheduled_for: None,
            action_required: false,
            created_at,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_action_required(mut self, action_required: bool) -> Self {
        self.action_required = action_required;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("kind", &self.kind)?;
        require_text("title", &self.title)
    }
}

/// Stored notification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: RecordId,
    pub kind: String,
    pub title: String,
    pub message: Option<String>,
    pub priority: Priority,
    pub is_read: bool,
    pub scheduled_for: Option<i64>,
    pub action_required: bool,
    pub created_at: i64,
}
