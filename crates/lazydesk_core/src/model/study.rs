//! Study sessions, learning resources and curriculum levels.

use super::{require_range, require_text, RecordId, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Curriculum difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    /// Tiers in curriculum order.
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a study session was spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyType {
    #[default]
    Reading,
    Practice,
    Video,
    Coding,
    Nlp,
}

impl StudyType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Practice => "practice",
            Self::Video => "video",
            Self::Coding => "coding",
            Self::Nlp => "nlp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reading" => Some(Self::Reading),
            "practice" => Some(Self::Practice),
            "video" => Some(Self::Video),
            "coding" => Some(Self::Coding),
            "nlp" => Some(Self::Nlp),
            _ => None,
        }
    }
}

/// Insert payload for one logged study session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudySession {
    pub subject: String,
    pub topic: String,
    /// Expected to be positive; not enforced.
    pub duration_minutes: i64,
    pub study_type: StudyType,
    pub notes: Option<String>,
    pub difficulty_rating: Option<u8>,
    pub session_date: NaiveDate,
}

impl NewStudySession {
    pub fn new(
        subject: impl Into<String>,
        topic: impl Into<String>,
        duration_minutes: i64,
        session_date: NaiveDate,
    ) -> Self {
        Self {
            subject: subject.into(),
            topic: topic.into(),
            duration_minutes,
            study_type: StudyType::default(),
            notes: None,
            difficulty_rating: None,
            session_date,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("subject", &self.subject)?;
        require_text("topic", &self.topic)?;
        if let Some(rating) = self.difficulty_rating {
            require_range("difficulty_rating", i64::from(rating), 1, 5)?;
        }
        Ok(())
    }
}

/// Stored study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudySession {
    pub id: RecordId,
    pub subject: String,
    pub topic: String,
    pub duration_minutes: i64,
    pub study_type: StudyType,
    pub notes: Option<String>,
    pub difficulty_rating: Option<u8>,
    pub session_date: NaiveDate,
}

/// Per-subject aggregate over a date window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectProgress {
    pub subject: String,
    pub sessions: i64,
    pub total_minutes: i64,
    pub average_minutes: f64,
    pub last_session: NaiveDate,
}

/// Kind of learning material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Book,
    Video,
    Article,
    Course,
    Tutorial,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Video => "video",
            Self::Article => "article",
            Self::Course => "course",
            Self::Tutorial => "tutorial",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "book" => Some(Self::Book),
            "video" => Some(Self::Video),
            "article" => Some(Self::Article),
            "course" => Some(Self::Course),
            "tutorial" => Some(Self::Tutorial),
            _ => None,
        }
    }
}

/// Insert payload for a learning resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLearningResource {
    pub title: String,
    pub kind: ResourceKind,
    pub subject: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub progress_percent: u8,
    pub rating: Option<u8>,
}

impl NewLearningResource {
    pub fn new(title: impl Into<String>, kind: ResourceKind, subject: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
            subject: subject.into(),
            url: None,
            description: None,
            progress_percent: 0,
            rating: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_range("progress_percent", i64::from(self.progress_percent), 0, 100)?;
        if let Some(rating) = self.rating {
            require_range("rating", i64::from(rating), 1, 5)?;
        }
        Ok(())
    }
}

/// Stored learning resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearningResource {
    pub id: RecordId,
    pub title: String,
    pub kind: ResourceKind,
    pub subject: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub progress_percent: u8,
    pub rating: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::{Level, NewLearningResource, NewStudySession, ResourceKind};
    use crate::model::ValidationError;
    use chrono::NaiveDate;

    #[test]
    fn level_parse_accepts_mixed_case() {
        assert_eq!(Level::parse(" Advanced "), Some(Level::Advanced));
        assert_eq!(Level::parse("expert"), None);
    }

    #[test]
    fn session_rejects_out_of_range_difficulty() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut session = NewStudySession::new("python", "Functions", 30, date);
        session.difficulty_rating = Some(6);
        assert!(matches!(
            session.validate(),
            Err(ValidationError::OutOfRange { field: "difficulty_rating", .. })
        ));
    }

    #[test]
    fn resource_rejects_progress_over_hundred() {
        let mut resource = NewLearningResource::new("Book", ResourceKind::Book, "nlp");
        resource.progress_percent = 101;
        assert!(resource.validate().is_err());
    }
}
