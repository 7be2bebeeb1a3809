//! Notification ranking use-case service.
//!
//! # Responsibility
//! - Classify fetched emails into priority labels with keyword and sender
//!   domain heuristics.
//! - Create notifications for emails, reminders and summaries.
//! - Order pending notifications for display.
//!
//! # Invariants
//! - Classification is pure: same email, same rules, same result.
//! - Display order is priority rank first, newest first second, and stable
//!   for equal keys.
//! - No deduplication: every qualifying email yields its own notification.

use crate::clock::SharedClock;
use crate::config::{AssistantConfig, DEFAULT_PRIORITY_DOMAINS, DEFAULT_PRIORITY_KEYWORDS};
use crate::model::email::ParsedEmail;
use crate::model::notification::{kind, NewNotification, Notification, Priority};
use crate::model::RecordId;
use crate::repo::notification_repo::{NotificationListQuery, NotificationRepository};
use crate::repo::RepoResult;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;

const EMAIL_TITLE_SUBJECT_CHARS: usize = 50;
const EMAIL_MESSAGE_SNIPPET_CHARS: usize = 100;

static SENDER_DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([^\s<>@,;]+)").expect("valid sender domain regex"));

/// Priority decision for one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub priority: Priority,
    /// Set only when a keyword matched.
    pub action_required: bool,
}

/// Keyword and domain heuristics used by [`PriorityRules::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityRules {
    keywords: Vec<String>,
    domains: Vec<String>,
}

impl Default for PriorityRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_PRIORITY_KEYWORDS.iter().copied(),
            DEFAULT_PRIORITY_DOMAINS.iter().copied(),
        )
    }
}

impl PriorityRules {
    /// Builds rules; inputs are lowercased and blanks dropped.
    pub fn new<K, D>(keywords: K, domains: D) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            keywords: normalize_terms(keywords),
            domains: normalize_terms(domains),
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(&config.priority_keywords, &config.priority_domains)
    }

    /// `high` when subject+snippet holds a keyword or the sender domain is
    /// allow-listed, otherwise `medium`.
    pub fn classify(&self, email: &ParsedEmail) -> Classification {
        let text = format!("{} {}", email.subject, email.snippet).to_lowercase();
        let keyword_hit = self
            .keywords
            .iter()
            .any(|keyword| text.contains(keyword.as_str()));
        let domain_hit = sender_domain(&email.sender)
            .map(|domain| self.domain_allowed(&domain))
            .unwrap_or(false);

        Classification {
            priority: if keyword_hit || domain_hit {
                Priority::High
            } else {
                Priority::Medium
            },
            action_required: keyword_hit,
        }
    }

    fn domain_allowed(&self, domain: &str) -> bool {
        self.domains.iter().any(|allowed| {
            domain == allowed
                || domain
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// Extracts the lowercase domain of the last address in a `From` header.
pub fn sender_domain(sender: &str) -> Option<String> {
    SENDER_DOMAIN_RE
        .captures_iter(sender)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_ascii_lowercase())
        .filter(|domain| !domain.is_empty())
}

/// Orders notifications for display.
///
/// Sort keys: priority rank (urgent=1 .. low=4, unrecognised=5), then the
/// creation second descending, then id ascending. Rows created within the
/// same second therefore keep insertion order.
pub fn rank(mut notifications: Vec<Notification>) -> Vec<Notification> {
    notifications.sort_by(|left, right| {
        left.priority
            .rank()
            .cmp(&right.priority.rank())
            .then_with(|| created_second(right).cmp(&created_second(left)))
            .then_with(|| left.id.cmp(&right.id))
    });
    notifications
}

fn created_second(notification: &Notification) -> i64 {
    notification.created_at.div_euclid(1000)
}

/// Notification service facade over a repository implementation.
pub struct NotificationService<R: NotificationRepository> {
    repo: R,
    clock: SharedClock,
    rules: PriorityRules,
}

impl<R: NotificationRepository> NotificationService<R> {
    /// Creates a service with the default priority rules.
    pub fn new(repo: R, clock: SharedClock) -> Self {
        Self {
            repo,
            clock,
            rules: PriorityRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: PriorityRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &PriorityRules {
        &self.rules
    }

    /// Persists a fully specified notification.
    pub fn create(&self, notification: &NewNotification) -> RepoResult<RecordId> {
        self.repo.insert_notification(notification)
    }

    /// Creates a notification stamped with the current clock time.
    pub fn notify(
        &self,
        kind: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
    ) -> RepoResult<RecordId> {
        let notification =
            NewNotification::new(kind, title, Some(message.into()), self.clock.now_ms())
                .with_priority(priority);
        self.repo.insert_notification(&notification)
    }

    /// Creates one notification per email plus a summary for a non-empty
    /// batch. Returns ids in creation order.
    pub fn notify_emails(&self, emails: &[ParsedEmail]) -> RepoResult<Vec<RecordId>> {
        let mut ids = Vec::with_capacity(emails.len() + 1);
        if emails.is_empty() {
            return Ok(ids);
        }

        let now = self.clock.now_ms();
        let mut high = 0usize;
        for email in emails {
            let classification = self.rules.classify(email);
            if classification.priority == Priority::High {
                high += 1;
            }
            let notification = NewNotification::new(
                kind::EMAIL,
                format!(
                    "New email: {}",
                    truncate_with_ellipsis(&email.subject, EMAIL_TITLE_SUBJECT_CHARS)
                ),
                Some(format!(
                    "From: {}\n{}",
                    email.sender,
                    truncate_with_ellipsis(&email.snippet, EMAIL_MESSAGE_SNIPPET_CHARS)
                )),
                now,
            )
            .with_priority(classification.priority)
            .with_action_required(classification.action_required);
            ids.push(self.repo.insert_notification(&notification)?);
        }

        let summary = NewNotification::new(
            kind::EMAIL_SUMMARY,
            format!("Email Summary: {} new emails", emails.len()),
            Some(format!(
                "You have {} new unread emails in the last hour",
                emails.len()
            )),
            now,
        );
        ids.push(self.repo.insert_notification(&summary)?);

        info!(
            "event=email_notify module=ranker status=ok emails={} high={}",
            emails.len(),
            high
        );
        Ok(ids)
    }

    /// Unread notifications in display order.
    pub fn pending(&self) -> RepoResult<Vec<Notification>> {
        let unread = self.repo.list_notifications(&NotificationListQuery::default())?;
        Ok(rank(unread))
    }

    /// First `limit` unread notifications in display order.
    pub fn pending_top(&self, limit: usize) -> RepoResult<Vec<Notification>> {
        let mut ranked = self.pending()?;
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Marks one notification read; repeating the call is harmless.
    pub fn mark_read(&self, id: RecordId) -> RepoResult<()> {
        self.repo.mark_read(id)
    }

    pub fn mark_all_read(&self) -> RepoResult<usize> {
        self.repo.mark_all_read()
    }

    pub fn unread_count(&self) -> RepoResult<i64> {
        self.repo.count_unread()
    }

    /// Study reminder; `message` overrides the per-subject template.
    pub fn study_reminder(&self, subject: &str, message: Option<&str>) -> RepoResult<RecordId> {
        let message = message
            .map(str::to_string)
            .unwrap_or_else(|| study_reminder_template(subject));
        self.notify(
            kind::STUDY_REMINDER,
            format!("Study Reminder: {subject}"),
            message,
            Priority::Medium,
        )
    }

    pub fn coding_reminder(&self, project_name: &str) -> RepoResult<RecordId> {
        self.notify(
            kind::CODING_REMINDER,
            format!("Coding Reminder: {project_name}"),
            format!("Continue working on your {project_name} project"),
            Priority::Medium,
        )
    }
}

fn study_reminder_template(subject: &str) -> String {
    match subject.trim().to_lowercase().replace(' ', "_").as_str() {
        "nlp" => "Time for your NLP learning session!".to_string(),
        "coding" => "Time to code! Start your programming session".to_string(),
        "python" => "Python practice time!".to_string(),
        "machine_learning" => "ML study time!".to_string(),
        _ => format!("Time to study {subject}!"),
    }
}

/// Keeps the first `max_chars` characters, marking a cut with `...`.
pub(crate) fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

fn normalize_terms<I>(terms: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    terms
        .into_iter()
        .map(|term| term.as_ref().trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}
