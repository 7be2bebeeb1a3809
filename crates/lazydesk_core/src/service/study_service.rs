//! Study advisor use-case service.
//!
//! # Responsibility
//! - Suggest the next topic, build multi-week plans and derive
//!   recommendations from logged study activity.
//! - Serve the static quiz, challenge and NLP project catalogues.
//! - Log sessions and emit achievement notifications.
//!
//! # Invariants
//! - Lookups for unknown subjects or levels return `None`, never a
//!   placeholder string.
//! - A plan always has exactly `weeks` entries and never schedules more
//!   topics than the curriculum holds.
//! - Every random choice has a `*_with_rng` form so tests can seed it.

use crate::clock::SharedClock;
use crate::db::DbError;
use crate::model::notification::{kind, Priority};
use crate::model::study::{Level, NewStudySession, StudySession, SubjectProgress};
use crate::model::RecordId;
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::study_repo::StudyRepository;
use crate::repo::RepoError;
use crate::service::curriculum::{self, LearningPhase, ProjectIdea, NLP_LEARNING_PATH};
use crate::service::notification_service::NotificationService;
use chrono::{Duration, NaiveDate};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Window in days that counts a topic as recently studied.
pub const RECENT_TOPIC_DAYS: i64 = 7;
/// Window in days scanned for recommendations.
pub const RECOMMENDATION_DAYS: i64 = 14;
const STALE_SUBJECT_DAYS: i64 = 3;
const SHORT_SESSION_MINUTES: f64 = 30.0;

pub type AdvisorResult<T> = Result<T, AdvisorError>;

/// Service error for advisor use-cases.
#[derive(Debug)]
pub enum AdvisorError {
    /// Caller-supplied argument outside the accepted domain.
    InvalidInput(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for AdvisorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AdvisorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<RepoError> for AdvisorError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for AdvisorError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

/// Outcome of [`StudyService::suggest_topic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicSuggestion {
    /// Curriculum topic not studied in the recent window.
    Fresh(String),
    /// Every tier topic was studied recently; revisit one of them.
    Review(String),
}

impl TopicSuggestion {
    pub fn topic(&self) -> &str {
        match self {
            Self::Fresh(topic) | Self::Review(topic) => topic,
        }
    }
}

impl Display for TopicSuggestion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh(topic) => f.write_str(topic),
            Self::Review(topic) => write!(f, "Consider reviewing: {topic}"),
        }
    }
}

/// One week of a [`StudyPlan`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekPlan {
    /// 1-based week number.
    pub week: u32,
    pub topics: Vec<(String, Level)>,
    pub estimated_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyPlan {
    pub subject: String,
    pub duration_weeks: u32,
    pub hours_per_week: f64,
    /// Rounded to one decimal.
    pub hours_per_topic: f64,
    pub weekly_schedule: Vec<WeekPlan>,
}

impl StudyPlan {
    pub fn scheduled_topics(&self) -> usize {
        self.weekly_schedule.iter().map(|week| week.topics.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    StartStudying,
    Consistency,
    Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub action: String,
}

/// Derives recommendations from per-subject activity.
///
/// Staleness and short-session checks are independent, so one subject can
/// yield both. No activity yields a single start-studying entry.
pub fn recommendations(activity: &[SubjectProgress], today: NaiveDate) -> Vec<Recommendation> {
    if activity.is_empty() {
        return vec![Recommendation {
            kind: RecommendationKind::StartStudying,
            message: "Start your learning journey! Try studying NLP or Python basics.".to_string(),
            action: "Begin with beginner topics".to_string(),
        }];
    }

    let mut recommendations = Vec::new();
    for progress in activity {
        let days_since = (today - progress.last_session).num_days();
        if days_since > STALE_SUBJECT_DAYS {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Consistency,
                message: format!(
                    "You haven't studied {} for {days_since} days. Keep the momentum!",
                    progress.subject
                ),
                action: format!("Schedule a {} session today", progress.subject),
            });
        }
        if progress.average_minutes < SHORT_SESSION_MINUTES {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Duration,
                message: format!(
                    "Consider longer {} sessions (current avg: {:.0}min)",
                    progress.subject, progress.average_minutes
                ),
                action: "Aim for 45-60 minute sessions".to_string(),
            });
        }
    }
    recommendations
}

/// Study advisor facade over a study repository.
pub struct StudyService<R: StudyRepository> {
    repo: R,
    clock: SharedClock,
}

impl<R: StudyRepository> StudyService<R> {
    pub fn new(repo: R, clock: SharedClock) -> Self {
        Self { repo, clock }
    }

    pub fn suggest_topic(
        &self,
        subject: &str,
        level: &str,
    ) -> AdvisorResult<Option<TopicSuggestion>> {
        self.suggest_topic_with_rng(subject, level, &mut rand::thread_rng())
    }

    /// Picks a topic of the tier not studied in the last seven days, or a
    /// review of a recent one when the whole tier is covered.
    pub fn suggest_topic_with_rng<G: Rng + ?Sized>(
        &self,
        subject: &str,
        level: &str,
        rng: &mut G,
    ) -> AdvisorResult<Option<TopicSuggestion>> {
        let Some(level) = Level::parse(level) else {
            return Ok(None);
        };
        let Some(available) = curriculum::topics(subject, level) else {
            return Ok(None);
        };

        let since = self.clock.today() - Duration::days(RECENT_TOPIC_DAYS);
        let recent = self.repo.recent_topics(subject, since)?;
        let unstudied: Vec<&str> = available
            .iter()
            .copied()
            .filter(|topic| !recent.iter().any(|seen| seen == topic))
            .collect();

        let suggestion = match unstudied.choose(rng) {
            Some(topic) => Some(TopicSuggestion::Fresh((*topic).to_string())),
            None => recent
                .choose(rng)
                .map(|topic| TopicSuggestion::Review(topic.clone())),
        };
        debug!(
            "event=topic_suggest module=advisor status=ok level={} recent={} unstudied={}",
            level,
            recent.len(),
            unstudied.len()
        );
        Ok(suggestion)
    }

    /// Spreads the full curriculum over `weeks`.
    ///
    /// `topics_per_week` is `total / weeks` with the remainder dropped, so
    /// trailing advanced topics can go unscheduled.
    ///
    /// # Errors
    /// - `weeks == 0` or a negative/non-finite `hours_per_week`.
    pub fn build_plan(
        &self,
        subject: &str,
        hours_per_week: f64,
        weeks: u32,
    ) -> AdvisorResult<Option<StudyPlan>> {
        build_plan(subject, hours_per_week, weeks)
    }

    pub fn quiz_questions(
        &self,
        subject: &str,
        level: &str,
        count: usize,
    ) -> Option<Vec<String>> {
        quiz_questions_with_rng(subject, level, count, &mut rand::thread_rng())
    }

    pub fn coding_challenge(&self, level: &str) -> &'static str {
        coding_challenge_with_rng(level, &mut rand::thread_rng())
    }

    pub fn nlp_project(&self, level: &str) -> Option<ProjectIdea> {
        nlp_project_with_rng(level, &mut rand::thread_rng())
    }

    pub fn nlp_learning_path(&self) -> &'static [LearningPhase] {
        NLP_LEARNING_PATH
    }

    /// Stores a session without any notification.
    pub fn log_session(&self, session: &NewStudySession) -> AdvisorResult<RecordId> {
        Ok(self.repo.insert_session(session)?)
    }

    /// Logs a session and posts a low-priority achievement notification.
    pub fn track_session<N: NotificationRepository>(
        &self,
        session: &NewStudySession,
        notifications: &NotificationService<N>,
    ) -> AdvisorResult<RecordId> {
        let session_id = self.log_session(session)?;
        let hours = session.duration_minutes as f64 / 60.0;
        notifications.notify(
            kind::STUDY_ACHIEVEMENT,
            "Study Session Completed!",
            format!(
                "Great job! You studied {} ({}) for {hours:.1} hours",
                session.topic.trim(),
                session.subject.trim()
            ),
            Priority::Low,
        )?;

        info!(
            "event=study_track module=advisor status=ok session_id={} minutes={}",
            session_id, session.duration_minutes
        );
        Ok(session_id)
    }

    /// Per-subject totals for the last `days` days.
    pub fn study_progress(
        &self,
        subject: Option<&str>,
        days: u32,
    ) -> AdvisorResult<Vec<SubjectProgress>> {
        let since = self.clock.today() - Duration::days(i64::from(days));
        Ok(self.repo.progress_since(subject, since)?)
    }

    /// Sessions from the last `days` days, newest first.
    pub fn recent_sessions(&self, days: u32) -> AdvisorResult<Vec<StudySession>> {
        let since = self.clock.today() - Duration::days(i64::from(days));
        Ok(self.repo.list_sessions_since(None, since)?)
    }

    /// Recommendations over the last fourteen days of activity.
    pub fn study_recommendations(&self) -> AdvisorResult<Vec<Recommendation>> {
        let today = self.clock.today();
        let activity = self
            .repo
            .progress_since(None, today - Duration::days(RECOMMENDATION_DAYS))?;
        Ok(recommendations(&activity, today))
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Minutes logged today.
    pub fn minutes_today(&self) -> AdvisorResult<i64> {
        let today = self.clock.today();
        Ok(self.repo.minutes_between(today, today)?)
    }

    /// Minutes logged in the last seven days including today.
    pub fn minutes_this_week(&self) -> AdvisorResult<i64> {
        let today = self.clock.today();
        Ok(self
            .repo
            .minutes_between(today - Duration::days(RECENT_TOPIC_DAYS), today)?)
    }
}

/// Longest plan [`build_plan`] accepts, about ten years.
pub const MAX_PLAN_WEEKS: u32 = 520;

/// Pure plan builder behind [`StudyService::build_plan`].
pub fn build_plan(
    subject: &str,
    hours_per_week: f64,
    weeks: u32,
) -> AdvisorResult<Option<StudyPlan>> {
    if weeks == 0 {
        return Err(AdvisorError::InvalidInput(
            "weeks must be at least 1".to_string(),
        ));
    }
    if weeks > MAX_PLAN_WEEKS {
        return Err(AdvisorError::InvalidInput(format!(
            "weeks must be at most {MAX_PLAN_WEEKS}, got {weeks}"
        )));
    }
    if !hours_per_week.is_finite() || hours_per_week < 0.0 {
        return Err(AdvisorError::InvalidInput(format!(
            "hours_per_week must be a non-negative number, got {hours_per_week}"
        )));
    }
    let Some(topics) = curriculum::all_topics(subject) else {
        return Ok(None);
    };

    let weeks_len = weeks as usize;
    let topics_per_week = topics.len() / weeks_len;
    let hours_per_topic = if topics_per_week == 0 {
        hours_per_week
    } else {
        hours_per_week / topics_per_week as f64
    };

    let weekly_schedule = (0..weeks_len)
        .map(|index| {
            let start = (index * topics_per_week).min(topics.len());
            let end = ((index + 1) * topics_per_week).min(topics.len());
            let week_topics: Vec<(String, Level)> = topics[start..end]
                .iter()
                .map(|(topic, level)| ((*topic).to_string(), *level))
                .collect();
            WeekPlan {
                week: index as u32 + 1,
                estimated_hours: week_topics.len() as f64 * hours_per_topic,
                topics: week_topics,
            }
        })
        .collect();

    Ok(Some(StudyPlan {
        subject: subject.trim().to_string(),
        duration_weeks: weeks,
        hours_per_week,
        hours_per_topic: round_one_decimal(hours_per_topic),
        weekly_schedule,
    }))
}

/// Samples up to `count` distinct questions from the bank.
pub fn quiz_questions_with_rng<G: Rng + ?Sized>(
    subject: &str,
    level: &str,
    count: usize,
    rng: &mut G,
) -> Option<Vec<String>> {
    let level = Level::parse(level)?;
    let bank = curriculum::quiz_bank(subject, level)?;
    Some(
        bank.choose_multiple(rng, count)
            .map(|question| (*question).to_string())
            .collect(),
    )
}

/// Unknown levels fall back to the beginner list.
pub fn coding_challenge_with_rng<G: Rng + ?Sized>(level: &str, rng: &mut G) -> &'static str {
    let level = Level::parse(level).unwrap_or(Level::Beginner);
    curriculum::coding_challenges(level)
        .choose(rng)
        .copied()
        .unwrap_or_default()
}

/// Unknown levels fall back to the beginner list.
pub fn nlp_project_with_rng<G: Rng + ?Sized>(level: &str, rng: &mut G) -> Option<ProjectIdea> {
    let level = Level::parse(level).unwrap_or(Level::Beginner);
    curriculum::nlp_projects(level).choose(rng).copied()
}

/// One decimal place, halves to even: 1.25 becomes 1.2.
pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::{
        build_plan, coding_challenge_with_rng, quiz_questions_with_rng, recommendations,
        round_one_decimal, AdvisorError, RecommendationKind, TopicSuggestion, MAX_PLAN_WEEKS,
    };
    use crate::model::study::SubjectProgress;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn progress(subject: &str, average: f64, last: NaiveDate) -> SubjectProgress {
        SubjectProgress {
            subject: subject.to_string(),
            sessions: 2,
            total_minutes: (average * 2.0) as i64,
            average_minutes: average,
            last_session: last,
        }
    }

    #[test]
    fn plan_has_one_entry_per_week_and_drops_remainder() {
        let plan = build_plan("python", 5.0, 4).unwrap().unwrap();
        assert_eq!(plan.weekly_schedule.len(), 4);
        // 18 topics / 4 weeks = 4 per week, 2 left unscheduled.
        assert_eq!(plan.scheduled_topics(), 16);
        assert_eq!(plan.hours_per_topic, 1.2);
        assert_eq!(plan.weekly_schedule[3].week, 4);
    }

    #[test]
    fn plan_with_more_weeks_than_topics_keeps_weekly_hours() {
        let plan = build_plan("nlp", 3.0, 40).unwrap().unwrap();
        assert_eq!(plan.weekly_schedule.len(), 40);
        assert_eq!(plan.scheduled_topics(), 0);
        assert_eq!(plan.hours_per_topic, 3.0);
    }

    #[test]
    fn plan_rejects_zero_weeks_and_unknown_subject_is_none() {
        assert!(matches!(
            build_plan("python", 5.0, 0),
            Err(AdvisorError::InvalidInput(_))
        ));
        assert!(build_plan("cooking", 5.0, 4).unwrap().is_none());
    }

    #[test]
    fn plan_rejects_week_counts_past_the_cap() {
        assert!(build_plan("python", 5.0, MAX_PLAN_WEEKS).unwrap().is_some());
        for weeks in [MAX_PLAN_WEEKS + 1, u32::MAX] {
            assert!(matches!(
                build_plan("python", 5.0, weeks),
                Err(AdvisorError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn one_decimal_rounding_sends_halves_to_even() {
        assert_eq!(round_one_decimal(1.25), 1.2);
        assert_eq!(round_one_decimal(3.75), 3.8);
        assert_eq!(round_one_decimal(1.26), 1.3);
        assert_eq!(round_one_decimal(5.0 / 3.0), 1.7);
    }

    #[test]
    fn recommendations_flag_stale_and_short_subjects_independently() {
        let today = day(20);
        let recs = recommendations(
            &[
                progress("nlp", 20.0, day(10)),
                progress("python", 50.0, day(19)),
            ],
            today,
        );
        let kinds: Vec<RecommendationKind> = recs.iter().map(|rec| rec.kind).collect();
        assert_eq!(
            kinds,
            vec![RecommendationKind::Consistency, RecommendationKind::Duration]
        );
        assert!(recs[0].message.contains("10 days"));
    }

    #[test]
    fn no_activity_recommends_starting() {
        let recs = recommendations(&[], day(1));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::StartStudying);
    }

    #[test]
    fn quiz_samples_without_replacement() {
        let mut rng = StdRng::seed_from_u64(7);
        let questions = quiz_questions_with_rng("NLP", "beginner", 10, &mut rng).unwrap();
        assert_eq!(questions.len(), 5);
        let mut unique = questions.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);
        assert!(quiz_questions_with_rng("nlp", "advanced", 3, &mut rng).is_none());
    }

    #[test]
    fn unknown_challenge_level_uses_beginner_list() {
        let mut rng = StdRng::seed_from_u64(1);
        let challenge = coding_challenge_with_rng("wizard", &mut rng);
        assert!(crate::service::curriculum::coding_challenges(
            crate::model::study::Level::Beginner
        )
        .contains(&challenge));
    }

    #[test]
    fn review_suggestion_displays_prefix() {
        let suggestion = TopicSuggestion::Review("Functions".to_string());
        assert_eq!(suggestion.to_string(), "Consider reviewing: Functions");
        assert_eq!(suggestion.topic(), "Functions");
    }
}
