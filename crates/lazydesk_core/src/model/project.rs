//! Coding projects and NLP experiment records.

use super::{require_text, RecordId, ValidationError};
use chrono::NaiveDate;
use serde::Serialize;

/// Coding project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    #[default]
    Active,
    Paused,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "planning" => Some(Self::Planning),
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Insert payload for a coding project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCodingProject {
    pub name: String,
    pub description: Option<String>,
    pub language: String,
    pub local_path: Option<String>,
    pub status: ProjectStatus,
}

impl NewCodingProject {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            language: language.into(),
            local_path: None,
            status: ProjectStatus::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("language", &self.language)
    }
}

/// Stored coding project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodingProject {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub language: String,
    pub local_path: Option<String>,
    pub status: ProjectStatus,
    pub created_date: NaiveDate,
}

/// NLP task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NlpTaskStatus {
    Planning,
    #[default]
    InProgress,
    Completed,
    Failed,
}

impl NlpTaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "planning" => Some(Self::Planning),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Insert payload for an NLP task or experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNlpTask {
    pub task_name: String,
    /// e.g. `sentiment_analysis`, `ner`, `text_classification`.
    pub task_type: String,
    pub dataset_name: Option<String>,
    pub model_used: Option<String>,
    pub status: NlpTaskStatus,
}

impl NewNlpTask {
    pub fn new(task_name: impl Into<String>, task_type: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            task_type: task_type.into(),
            dataset_name: None,
            model_used: None,
            status: NlpTaskStatus::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("task_name", &self.task_name)?;
        require_text("task_type", &self.task_type)
    }
}

/// Stored NLP task. Completion fields stay `None` until set externally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NlpTask {
    pub id: RecordId,
    pub task_name: String,
    pub task_type: String,
    pub dataset_name: Option<String>,
    pub model_used: Option<String>,
    pub accuracy_score: Option<f64>,
    pub status: NlpTaskStatus,
    pub created_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
}
