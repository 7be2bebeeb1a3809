//! Progress export for external assistant tools.
//!
//! Writes three files into one directory, replacing earlier copies:
//! `current_progress.json`, `notifications.json` and `quick_commands.md`.

use crate::db::DbError;
use crate::model::study::SubjectProgress;
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::resource_repo::ResourceRepository;
use crate::repo::study_repo::StudyRepository;
use crate::repo::RepoError;
use crate::service::dashboard_service::{DashboardService, QuickStats};
use crate::service::study_service::AdvisorError;
use chrono::{DateTime, Local, NaiveDate};
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const PROGRESS_FILE: &str = "current_progress.json";
pub const NOTIFICATIONS_FILE: &str = "notifications.json";
pub const COMMANDS_FILE: &str = "quick_commands.md";

const PROGRESS_DAYS: u32 = 14;
const RECENT_SESSION_DAYS: u32 = 7;

const QUICK_COMMANDS_MD: &str = "# Quick Commands

## Study Assistance
- `analyze_progress`: Review my recent study activity
- `suggest_topic`: Recommend next topic to study
- `create_quiz`: Generate quiz questions
- `study_plan`: Create a learning schedule

## Project Help
- `code_review`: Help review my code
- `debug_help`: Assist with debugging
- `project_ideas`: Suggest coding projects
- `best_practices`: Share coding best practices

## NLP Specific
- `nlp_concepts`: Explain NLP concepts
- `nlp_projects`: Suggest NLP project ideas
- `nlp_resources`: Recommend learning resources
- `nlp_practice`: Provide practice exercises

## Data Analysis
- `progress_insights`: Analyze my learning patterns
- `time_optimization`: Suggest time management improvements
- `goal_setting`: Help set realistic learning goals
";

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Serialize(serde_json::Error),
    Advisor(AdvisorError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to encode export: {err}"),
            Self::Advisor(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::Advisor(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

impl From<AdvisorError> for ExportError {
    fn from(value: AdvisorError) -> Self {
        Self::Advisor(value)
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Advisor(AdvisorError::Repo(value))
    }
}

impl From<DbError> for ExportError {
    fn from(value: DbError) -> Self {
        Self::Advisor(AdvisorError::from(value))
    }
}

#[derive(Debug, Serialize)]
struct ProgressDocument {
    last_updated: String,
    study_progress: Vec<SubjectProgress>,
    quick_stats: QuickStats,
    recent_sessions: Vec<SessionEntry>,
}

#[derive(Debug, Serialize)]
struct SessionEntry {
    subject: String,
    topic: String,
    duration_minutes: i64,
    date: NaiveDate,
    notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct NotificationEntry<'a> {
    id: i64,
    #[serde(rename = "type")]
    kind: &'a str,
    title: &'a str,
    message: Option<&'a str>,
    priority: &'a str,
    created_at: i64,
}

/// Writes the export set into `output_dir`, creating it when missing.
///
/// Returns the directory written to.
pub fn export_progress<N, S, P, Q>(
    dashboard: &DashboardService<N, S, P, Q>,
    output_dir: &Path,
    now: DateTime<Local>,
) -> ExportResult<PathBuf>
where
    N: NotificationRepository,
    S: StudyRepository,
    P: ProjectRepository,
    Q: ResourceRepository,
{
    let result = write_export(dashboard, output_dir, now);
    match &result {
        Ok(_) => info!(
            "event=export module=export status=ok dir={}",
            output_dir.display()
        ),
        Err(err) => error!(
            "event=export module=export status=error dir={} error={}",
            output_dir.display(),
            err
        ),
    }
    result
}

fn write_export<N, S, P, Q>(
    dashboard: &DashboardService<N, S, P, Q>,
    output_dir: &Path,
    now: DateTime<Local>,
) -> ExportResult<PathBuf>
where
    N: NotificationRepository,
    S: StudyRepository,
    P: ProjectRepository,
    Q: ResourceRepository,
{
    std::fs::create_dir_all(output_dir).map_err(|source| ExportError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let study = dashboard.study();
    let progress = ProgressDocument {
        last_updated: now.to_rfc3339(),
        study_progress: study.study_progress(None, PROGRESS_DAYS)?,
        quick_stats: dashboard.quick_stats()?,
        recent_sessions: study
            .recent_sessions(RECENT_SESSION_DAYS)?
            .into_iter()
            .map(|session| SessionEntry {
                subject: session.subject,
                topic: session.topic,
                duration_minutes: session.duration_minutes,
                date: session.session_date,
                notes: session.notes,
            })
            .collect(),
    };
    write_file(
        &output_dir.join(PROGRESS_FILE),
        serde_json::to_string_pretty(&progress)?.as_bytes(),
    )?;

    let pending = dashboard.notifications().pending()?;
    let entries: Vec<NotificationEntry<'_>> = pending
        .iter()
        .map(|notification| NotificationEntry {
            id: notification.id,
            kind: &notification.kind,
            title: &notification.title,
            message: notification.message.as_deref(),
            priority: notification.priority.as_str(),
            created_at: notification.created_at,
        })
        .collect();
    write_file(
        &output_dir.join(NOTIFICATIONS_FILE),
        serde_json::to_string_pretty(&entries)?.as_bytes(),
    )?;

    write_file(&output_dir.join(COMMANDS_FILE), QUICK_COMMANDS_MD.as_bytes())?;
    Ok(output_dir.to_path_buf())
}

fn write_file(path: &Path, contents: &[u8]) -> ExportResult<()> {
    std::fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
