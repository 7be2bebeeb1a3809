//! Mailbox message records.
//!
//! # Invariants
//! - `remote_id` is unique across all stored emails.
//! - Stored emails are never updated or deleted.

use super::RecordId;
use serde::{Deserialize, Serialize};

/// Email parsed from the remote mailbox, before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEmail {
    /// Provider message id; the dedup key.
    pub remote_id: String,
    /// Raw `From` header value, e.g. `Jane <jane@work.com>`.
    pub sender: String,
    pub subject: String,
    pub snippet: String,
    /// Plain-text body, truncated; falls back to `snippet` when empty.
    pub body: String,
    pub labels: Vec<String>,
    /// Raw `Date` header, kept as provided.
    pub date_header: String,
}

/// Stored email row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub id: RecordId,
    pub remote_id: String,
    pub sender: String,
    pub subject: String,
    pub snippet: String,
    pub body: String,
    pub labels: Vec<String>,
    pub date_header: Option<String>,
    /// Epoch milliseconds of the fetch that stored this email.
    pub received_at: i64,
}
