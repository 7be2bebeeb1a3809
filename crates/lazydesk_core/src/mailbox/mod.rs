//! Remote mailbox polling.
//!
//! # Responsibility
//! - Fetch recent messages through a [`MailboxClient`], parse them into
//!   [`ParsedEmail`] values and persist them keyed by remote id.
//! - Contain every mailbox failure: callers get an empty batch and a log
//!   line, never an error.
//!
//! # Invariants
//! - Re-fetching a stored remote id never creates a second row.
//! - Email bodies never reach the log.

use crate::clock::SharedClock;
use crate::db::{DbError, Gateway};
use crate::model::email::ParsedEmail;
use crate::repo::email_repo::{EmailRepository, SqliteEmailRepository};
use crate::repo::RepoError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod auth;
pub mod client;
pub mod gmail;
pub mod parse;

pub use client::{MailboxClient, MessageBody, MessageHeader, MessagePart, RemoteMessage};
pub use gmail::GmailClient;
pub use parse::parse_message;

pub type MailboxResult<T> = Result<T, MailboxError>;

#[derive(Debug)]
pub enum MailboxError {
    /// Local prerequisites missing, e.g. the OAuth client secrets file.
    Setup(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Http(reqwest::Error),
    /// Token exchange, refresh or consent failed.
    Auth(String),
    Json(serde_json::Error),
    /// Message body could not be decoded.
    Decode(String),
    Repo(RepoError),
}

impl Display for MailboxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup(message) => write!(f, "mailbox setup: {message}"),
            Self::Io { path, source } => write!(f, "i/o on `{}`: {source}", path.display()),
            Self::Http(err) => write!(f, "mailbox request failed: {err}"),
            Self::Auth(message) => write!(f, "mailbox auth failed: {message}"),
            Self::Json(err) => write!(f, "unexpected mailbox payload: {err}"),
            Self::Decode(message) => write!(f, "undecodable message body: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MailboxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Http(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Setup(_) | Self::Auth(_) | Self::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for MailboxError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for MailboxError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<RepoError> for MailboxError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for MailboxError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

/// Fetches, parses and stores recent mailbox messages.
pub struct MailboxPoller<C: MailboxClient> {
    client: C,
    gateway: Gateway,
    clock: SharedClock,
}

impl<C: MailboxClient> MailboxPoller<C> {
    pub fn new(client: C, gateway: Gateway, clock: SharedClock) -> Self {
        Self {
            client,
            gateway,
            clock,
        }
    }

    /// Returns up to `max_results` messages matching `query`.
    ///
    /// Every fetched message is returned, including ones already stored;
    /// storage skips the duplicates. Any failure yields an empty batch.
    pub fn fetch_recent(&mut self, max_results: u32, query: &str) -> Vec<ParsedEmail> {
        match self.try_fetch_recent(max_results, query) {
            Ok(emails) => {
                info!(
                    "event=mailbox_poll module=mailbox status=ok fetched={}",
                    emails.len()
                );
                emails
            }
            Err(err) => {
                error!(
                    "event=mailbox_poll module=mailbox status=error error={}",
                    err
                );
                Vec::new()
            }
        }
    }

    fn try_fetch_recent(
        &mut self,
        max_results: u32,
        query: &str,
    ) -> MailboxResult<Vec<ParsedEmail>> {
        let ids = self.client.list_message_ids(query, max_results)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.gateway.connect()?;
        let repo = SqliteEmailRepository::new(&conn);
        let received_at = self.clock.now_ms();
        let mut emails = Vec::with_capacity(ids.len());
        let mut stored = 0usize;
        for id in ids {
            let message = self.client.get_message(&id)?;
            let parsed = parse_message(message)?;
            if repo.insert_email(&parsed, received_at)?.is_some() {
                stored += 1;
            }
            emails.push(parsed);
        }

        info!(
            "event=mailbox_store module=mailbox status=ok fetched={} stored={}",
            emails.len(),
            stored
        );
        Ok(emails)
    }
}
