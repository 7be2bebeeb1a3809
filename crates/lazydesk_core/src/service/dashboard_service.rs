//! Dashboard aggregation and daily review jobs.
//!
//! # Responsibility
//! - Collect quick stats and the dashboard snapshot shown on every menu
//!   redraw.
//! - Emit the goal-gated study reminder and the evening summary.

use crate::clock::SharedClock;
use crate::model::notification::{kind, Notification, Priority};
use crate::model::project::ProjectStatus;
use crate::model::study::SubjectProgress;
use crate::model::RecordId;
use crate::repo::notification_repo::{NotificationRepository, SqliteNotificationRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::resource_repo::{ResourceRepository, SqliteResourceRepository};
use crate::repo::study_repo::{SqliteStudyRepository, StudyRepository};
use crate::service::curriculum::SUBJECTS;
use crate::service::notification_service::{NotificationService, PriorityRules};
use crate::service::study_service::{
    round_one_decimal, AdvisorResult, StudyService, TopicSuggestion,
};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::fmt;

/// Pending notifications shown on the dashboard.
pub const DASHBOARD_NOTIFICATIONS: usize = 5;
const DASHBOARD_PROGRESS_DAYS: u32 = 7;
const GOAL_REMINDER_SUBJECT: &str = "General Study";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickStats {
    /// Hours over the last seven days, one decimal.
    pub week_study_hours: f64,
    pub unread_notifications: i64,
    pub active_projects: i64,
    pub learning_resources: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub notifications: Vec<Notification>,
    pub recent_study: Vec<SubjectProgress>,
    /// Beginner-level suggestion per curriculum subject; `None` when the
    /// lookup found nothing.
    pub study_suggestions: Vec<(String, Option<TopicSuggestion>)>,
    pub quick_stats: QuickStats,
}

/// Console rendering; shows the first three notifications.
impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.quick_stats;
        writeln!(f, "QUICK STATS:")?;
        writeln!(f, "   Study Hours (This Week): {}h", stats.week_study_hours)?;
        writeln!(f, "   Unread Notifications: {}", stats.unread_notifications)?;
        writeln!(f, "   Active Projects: {}", stats.active_projects)?;
        writeln!(f, "   Learning Resources: {}", stats.learning_resources)?;

        writeln!(f, "\nRECENT NOTIFICATIONS:")?;
        if self.notifications.is_empty() {
            writeln!(f, "   No pending notifications!")?;
        }
        for notification in self.notifications.iter().take(3) {
            writeln!(
                f,
                "   [{}] {} ({})",
                notification.priority, notification.title, notification.kind
            )?;
        }

        writeln!(f, "\nRECENT STUDY ACTIVITY:")?;
        if self.recent_study.is_empty() {
            writeln!(f, "   No recent study sessions")?;
        }
        for progress in &self.recent_study {
            writeln!(
                f,
                "   - {}: {} sessions, {:.1}h",
                progress.subject,
                progress.sessions,
                progress.total_minutes as f64 / 60.0
            )?;
        }

        writeln!(f, "\nSTUDY SUGGESTIONS:")?;
        for (subject, suggestion) in &self.study_suggestions {
            let subject = subject.to_uppercase();
            match suggestion {
                Some(suggestion) => writeln!(f, "   - {subject}: {suggestion}")?,
                None => writeln!(f, "   - {subject}: no topics available")?,
            }
        }
        Ok(())
    }
}

/// Dashboard service over one SQLite connection.
pub type SqliteDashboard<'conn> = DashboardService<
    SqliteNotificationRepository<'conn>,
    SqliteStudyRepository<'conn>,
    SqliteProjectRepository<'conn>,
    SqliteResourceRepository<'conn>,
>;

/// Wires every SQLite repository onto `conn`.
pub fn sqlite_dashboard(
    conn: &Connection,
    clock: SharedClock,
    rules: PriorityRules,
) -> SqliteDashboard<'_> {
    DashboardService::new(
        NotificationService::new(SqliteNotificationRepository::new(conn), clock.clone())
            .with_rules(rules),
        StudyService::new(SqliteStudyRepository::new(conn), clock),
        SqliteProjectRepository::new(conn),
        SqliteResourceRepository::new(conn),
    )
}

/// Cross-entity read model over the four repositories it summarizes.
pub struct DashboardService<N, S, P, Q>
where
    N: NotificationRepository,
    S: StudyRepository,
    P: ProjectRepository,
    Q: ResourceRepository,
{
    notifications: NotificationService<N>,
    study: StudyService<S>,
    projects: P,
    resources: Q,
}

impl<N, S, P, Q> DashboardService<N, S, P, Q>
where
    N: NotificationRepository,
    S: StudyRepository,
    P: ProjectRepository,
    Q: ResourceRepository,
{
    pub fn new(
        notifications: NotificationService<N>,
        study: StudyService<S>,
        projects: P,
        resources: Q,
    ) -> Self {
        Self {
            notifications,
            study,
            projects,
            resources,
        }
    }

    pub fn notifications(&self) -> &NotificationService<N> {
        &self.notifications
    }

    pub fn study(&self) -> &StudyService<S> {
        &self.study
    }

    pub fn projects(&self) -> &P {
        &self.projects
    }

    pub fn resources(&self) -> &Q {
        &self.resources
    }

    pub fn quick_stats(&self) -> AdvisorResult<QuickStats> {
        let week_minutes = self.study.minutes_this_week()?;
        Ok(QuickStats {
            week_study_hours: round_one_decimal(week_minutes as f64 / 60.0),
            unread_notifications: self.notifications.unread_count()?,
            active_projects: self.projects.count_projects(Some(ProjectStatus::Active))?,
            learning_resources: self.resources.count_resources()?,
        })
    }

    pub fn collect(&self) -> AdvisorResult<Dashboard> {
        let mut study_suggestions = Vec::with_capacity(SUBJECTS.len());
        for subject in SUBJECTS {
            let suggestion = self.study.suggest_topic(subject, "beginner")?;
            study_suggestions.push((subject.to_string(), suggestion));
        }

        Ok(Dashboard {
            notifications: self.notifications.pending_top(DASHBOARD_NOTIFICATIONS)?,
            recent_study: self.study.study_progress(None, DASHBOARD_PROGRESS_DAYS)?,
            study_suggestions,
            quick_stats: self.quick_stats()?,
        })
    }

    /// Posts a reminder when today's minutes are below `goal_minutes`.
    /// Returns the notification id, or `None` when the goal is met.
    pub fn goal_reminder(&self, goal_minutes: i64) -> AdvisorResult<Option<RecordId>> {
        let today_minutes = self.study.minutes_today()?;
        if today_minutes >= goal_minutes {
            info!(
                "event=goal_reminder module=dashboard status=skipped minutes={} goal={}",
                today_minutes, goal_minutes
            );
            return Ok(None);
        }

        let remaining = goal_minutes - today_minutes;
        let id = self.notifications.study_reminder(
            GOAL_REMINDER_SUBJECT,
            Some(&format!(
                "You need {remaining} more minutes to reach your daily goal!"
            )),
        )?;
        info!(
            "event=goal_reminder module=dashboard status=ok minutes={} goal={}",
            today_minutes, goal_minutes
        );
        Ok(Some(id))
    }

    /// Posts the low-priority evening summary of today's sessions.
    pub fn daily_summary(&self) -> AdvisorResult<RecordId> {
        let progress = self.study.study_progress(None, 0)?;
        let message = daily_summary_message(&progress);
        let id = self.notifications.notify(
            kind::DAILY_SUMMARY,
            "Daily Progress Review",
            message,
            Priority::Low,
        )?;
        info!(
            "event=daily_summary module=dashboard status=ok subjects={}",
            progress.len()
        );
        Ok(id)
    }
}

fn daily_summary_message(progress: &[SubjectProgress]) -> String {
    if progress.is_empty() {
        return "Daily Summary: No study sessions today. Tomorrow is a new day!".to_string();
    }
    let minutes: i64 = progress.iter().map(|p| p.total_minutes).sum();
    let subjects: Vec<&str> = progress.iter().map(|p| p.subject.as_str()).collect();
    format!(
        "Daily Summary: {:.1}h studied across {}",
        minutes as f64 / 60.0,
        subjects.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::{daily_summary_message, Dashboard, QuickStats};
    use crate::model::notification::{Notification, Priority};
    use crate::model::study::SubjectProgress;
    use chrono::NaiveDate;

    fn stats() -> QuickStats {
        QuickStats {
            week_study_hours: 3.2,
            unread_notifications: 4,
            active_projects: 2,
            learning_resources: 1,
        }
    }

    fn notification(id: i64, title: &str) -> Notification {
        Notification {
            id,
            kind: "reminder".to_string(),
            title: title.to_string(),
            message: None,
            priority: Priority::High,
            is_read: false,
            scheduled_for: None,
            action_required: false,
            created_at: 0,
        }
    }

    #[test]
    fn empty_dashboard_renders_placeholders() {
        let dashboard = Dashboard {
            notifications: Vec::new(),
            recent_study: Vec::new(),
            study_suggestions: vec![("nlp".to_string(), None)],
            quick_stats: stats(),
        };
        let rendered = dashboard.to_string();
        assert!(rendered.starts_with("QUICK STATS:\n   Study Hours (This Week): 3.2h\n"));
        assert!(rendered.contains("No pending notifications!"));
        assert!(rendered.contains("No recent study sessions"));
        assert!(rendered.contains("   - NLP: no topics available\n"));
    }

    #[test]
    fn dashboard_shows_at_most_three_notifications() {
        let dashboard = Dashboard {
            notifications: (1..=5).map(|id| notification(id, &format!("n{id}"))).collect(),
            recent_study: Vec::new(),
            study_suggestions: Vec::new(),
            quick_stats: stats(),
        };
        let rendered = dashboard.to_string();
        assert!(rendered.contains("   [high] n3 (reminder)"));
        assert!(!rendered.contains("n4"));
        assert!(!rendered.contains("No pending notifications!"));
    }

    #[test]
    fn summary_message_lists_subjects_and_hours() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let progress = vec![
            SubjectProgress {
                subject: "nlp".to_string(),
                sessions: 1,
                total_minutes: 60,
                average_minutes: 60.0,
                last_session: date,
            },
            SubjectProgress {
                subject: "python".to_string(),
                sessions: 2,
                total_minutes: 30,
                average_minutes: 15.0,
                last_session: date,
            },
        ];
        assert_eq!(
            daily_summary_message(&progress),
            "Daily Summary: 1.5h studied across nlp, python"
        );
        assert!(daily_summary_message(&[]).contains("No study sessions today"));
    }
}
