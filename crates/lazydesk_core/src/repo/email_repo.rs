//! Email repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Inserts are `INSERT OR IGNORE` keyed by `remote_id`; a duplicate fetch
//!   leaves exactly one row and reports `None`.
//! - Labels are stored as a JSON array.

use crate::model::email::{Email, ParsedEmail};
use crate::model::RecordId;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const EMAIL_SELECT_SQL: &str = "SELECT
    id,
    remote_id,
    sender,
    subject,
    snippet,
    body,
    labels,
    date_header,
    received_at
FROM emails";

/// Repository interface for fetched emails.
pub trait EmailRepository {
    /// Stores one email. Returns `None` when `remote_id` already exists.
    fn insert_email(&self, email: &ParsedEmail, received_at: i64) -> RepoResult<Option<RecordId>>;
    fn get_email_by_remote_id(&self, remote_id: &str) -> RepoResult<Option<Email>>;
    /// Lists newest emails first.
    fn list_emails(&self, limit: u32) -> RepoResult<Vec<Email>>;
    fn count_emails(&self) -> RepoResult<i64>;
}

/// SQLite-backed email repository.
pub struct SqliteEmailRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmailRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmailRepository for SqliteEmailRepository<'_> {
    fn insert_email(&self, email: &ParsedEmail, received_at: i64) -> RepoResult<Option<RecordId>> {
        if email.remote_id.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "email remote id must not be blank".to_string(),
            ));
        }

        let labels = serde_json::to_string(&email.labels)
            .map_err(|err| RepoError::InvalidData(format!("unencodable labels: {err}")))?;
        let date_header = if email.date_header.is_empty() {
            None
        } else {
            Some(email.date_header.as_str())
        };

        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO emails (
                remote_id,
                sender,
                subject,
                snippet,
                body,
                labels,
                date_header,
                received_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                email.remote_id.as_str(),
                email.sender.as_str(),
                email.subject.as_str(),
                email.snippet.as_str(),
                email.body.as_str(),
                labels,
                date_header,
                received_at,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(self.conn.last_insert_rowid()))
    }

    fn get_email_by_remote_id(&self, remote_id: &str) -> RepoResult<Option<Email>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMAIL_SELECT_SQL} WHERE remote_id = ?1;"))?;
        let mut rows = stmt.query([remote_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_email_row(row)?));
        }
        Ok(None)
    }

    fn list_emails(&self, limit: u32) -> RepoResult<Vec<Email>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMAIL_SELECT_SQL} ORDER BY received_at DESC, id DESC LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut emails = Vec::new();
        while let Some(row) = rows.next()? {
            emails.push(parse_email_row(row)?);
        }
        Ok(emails)
    }

    fn count_emails(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM emails;", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn parse_email_row(row: &Row<'_>) -> RepoResult<Email> {
    let labels_text: String = row.get("labels")?;
    let labels = serde_json::from_str::<Vec<String>>(&labels_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid labels `{labels_text}` in emails.labels"))
    })?;

    Ok(Email {
        id: row.get("id")?,
        remote_id: row.get("remote_id")?,
        sender: row.get("sender")?,
        subject: row.get("subject")?,
        snippet: row.get("snippet")?,
        body: row.get("body")?,
        labels,
        date_header: row.get("date_header")?,
        received_at: row.get("received_at")?,
    })
}
