//! Study session repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Subject filters compare case-insensitively.
//! - Date windows are inclusive on both ends and use ISO text dates.

use crate::model::study::{NewStudySession, StudySession, StudyType, SubjectProgress};
use crate::model::RecordId;
use crate::repo::{date_to_db, parse_date, parse_small, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const SESSION_SELECT_SQL: &str = "SELECT
    id,
    subject,
    topic,
    duration_minutes,
    study_type,
    notes,
    difficulty_rating,
    session_date
FROM study_sessions";

/// Repository interface for study sessions.
pub trait StudyRepository {
    fn insert_session(&self, session: &NewStudySession) -> RepoResult<RecordId>;
    /// Lists sessions on or after `since`, newest first.
    fn list_sessions_since(
        &self,
        subject: Option<&str>,
        since: NaiveDate,
    ) -> RepoResult<Vec<StudySession>>;
    /// Topics logged for `subject` on or after `since`, newest first.
    fn recent_topics(&self, subject: &str, since: NaiveDate) -> RepoResult<Vec<String>>;
    /// Per-subject aggregates on or after `since`, most minutes first.
    fn progress_since(
        &self,
        subject: Option<&str>,
        since: NaiveDate,
    ) -> RepoResult<Vec<SubjectProgress>>;
    /// Sum of minutes for sessions dated within `from..=to`.
    fn minutes_between(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<i64>;
}

/// SQLite-backed study session repository.
pub struct SqliteStudyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudyRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StudyRepository for SqliteStudyRepository<'_> {
    fn insert_session(&self, session: &NewStudySession) -> RepoResult<RecordId> {
        session.validate()?;

        self.conn.execute(
            "INSERT INTO study_sessions (
                subject,
                topic,
                duration_minutes,
                study_type,
                notes,
                difficulty_rating,
                session_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                session.subject.trim(),
                session.topic.trim(),
                session.duration_minutes,
                session.study_type.as_str(),
                session.notes.as_deref(),
                session.difficulty_rating,
                date_to_db(session.session_date),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_sessions_since(
        &self,
        subject: Option<&str>,
        since: NaiveDate,
    ) -> RepoResult<Vec<StudySession>> {
        let mut sql = format!("{SESSION_SELECT_SQL} WHERE session_date >= ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(date_to_db(since))];

        if let Some(subject) = subject {
            sql.push_str(" AND subject = ? COLLATE NOCASE");
            bind_values.push(Value::Text(subject.trim().to_string()));
        }

        sql.push_str(" ORDER BY session_date DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(parse_session_row(row)?);
        }
        Ok(sessions)
    }

    fn recent_topics(&self, subject: &str, since: NaiveDate) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT topic
             FROM study_sessions
             WHERE subject = ?1 COLLATE NOCASE
               AND session_date >= ?2
             ORDER BY session_date DESC, id DESC;",
        )?;
        let mut rows = stmt.query(params![subject.trim(), date_to_db(since)])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(row.get(0)?);
        }
        Ok(topics)
    }

    fn progress_since(
        &self,
        subject: Option<&str>,
        since: NaiveDate,
    ) -> RepoResult<Vec<SubjectProgress>> {
        let mut sql = String::from(
            "SELECT
                subject,
                COUNT(*) AS sessions,
                COALESCE(SUM(duration_minutes), 0) AS total_minutes,
                COALESCE(AVG(duration_minutes), 0.0) AS average_minutes,
                MAX(session_date) AS last_session
             FROM study_sessions
             WHERE session_date >= ?",
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(date_to_db(since))];

        if let Some(subject) = subject {
            sql.push_str(" AND subject = ? COLLATE NOCASE");
            bind_values.push(Value::Text(subject.trim().to_string()));
        }

        sql.push_str(" GROUP BY subject ORDER BY total_minutes DESC, subject ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut progress = Vec::new();
        while let Some(row) = rows.next()? {
            let last_session: String = row.get("last_session")?;
            progress.push(SubjectProgress {
                subject: row.get("subject")?,
                sessions: row.get("sessions")?,
                total_minutes: row.get("total_minutes")?,
                average_minutes: row.get("average_minutes")?,
                last_session: parse_date("study_sessions.session_date", &last_session)?,
            });
        }
        Ok(progress)
    }

    fn minutes_between(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<i64> {
        let minutes = self.conn.query_row(
            "SELECT COALESCE(SUM(duration_minutes), 0)
             FROM study_sessions
             WHERE session_date >= ?1 AND session_date <= ?2;",
            params![date_to_db(from), date_to_db(to)],
            |row| row.get(0),
        )?;
        Ok(minutes)
    }
}

fn parse_session_row(row: &Row<'_>) -> RepoResult<StudySession> {
    let type_text: String = row.get("study_type")?;
    let study_type = StudyType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid study type `{type_text}` in study_sessions.study_type"
        ))
    })?;
    let date_text: String = row.get("session_date")?;

    Ok(StudySession {
        id: row.get("id")?,
        subject: row.get("subject")?,
        topic: row.get("topic")?,
        duration_minutes: row.get("duration_minutes")?,
        study_type,
        notes: row.get("notes")?,
        difficulty_rating: parse_small(
            "study_sessions.difficulty_rating",
            row.get("difficulty_rating")?,
        )?,
        session_date: parse_date("study_sessions.session_date", &date_text)?,
    })
}
