//! Notification repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `created_at DESC, id ASC`; rows created in the same
//!   millisecond keep insertion order.
//! - `is_read` is the only column updated after insert.

use crate::model::notification::{NewNotification, Notification, Priority};
use crate::model::RecordId;
use crate::repo::{bool_to_int, parse_bool, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    id,
    kind,
    title,
    message,
    priority,
    is_read,
    scheduled_for,
    action_required,
    created_at
FROM notifications";

/// Query options for listing notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationListQuery {
    pub include_read: bool,
    pub limit: Option<u32>,
}

/// Repository interface for notifications.
pub trait NotificationRepository {
    fn insert_notification(&self, notification: &NewNotification) -> RepoResult<RecordId>;
    fn get_notification(&self, id: RecordId) -> RepoResult<Option<Notification>>;
    fn list_notifications(&self, query: &NotificationListQuery) -> RepoResult<Vec<Notification>>;
    /// Sets `is_read`. Repeating the call for the same id is a no-op.
    fn mark_read(&self, id: RecordId) -> RepoResult<()>;
    /// Marks every unread row read and returns how many changed.
    fn mark_all_read(&self) -> RepoResult<usize>;
    fn count_unread(&self) -> RepoResult<i64>;
}

/// SQLite-backed notification repository.
pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn insert_notification(&self, notification: &NewNotification) -> RepoResult<RecordId> {
        notification.validate()?;

        self.conn.execute(
            "INSERT INTO notifications (
                kind,
                title,
                message,
                priority,
                scheduled_for,
                action_required,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                notification.kind.as_str(),
                notification.title.as_str(),
                notification.message.as_deref(),
                notification.priority.as_str(),
                notification.scheduled_for,
                bool_to_int(notification.action_required),
                notification.created_at,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_notification(&self, id: RecordId) -> RepoResult<Option<Notification>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTIFICATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_notification_row(row)?));
        }
        Ok(None)
    }

    fn list_notifications(&self, query: &NotificationListQuery) -> RepoResult<Vec<Notification>> {
        let mut sql = format!("{NOTIFICATION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_read {
            sql.push_str(" AND is_read = 0");
        }

        sql.push_str(" ORDER BY created_at DESC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }
        Ok(notifications)
    }

    fn mark_read(&self, id: RecordId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE id = ?1;",
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "notifications",
                id,
            });
        }
        Ok(())
    }

    fn mark_all_read(&self) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("UPDATE notifications SET is_read = 1 WHERE is_read = 0;", [])?;
        Ok(changed)
    }

    fn count_unread(&self) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE is_read = 0;",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    let priority_text: String = row.get("priority")?;

    Ok(Notification {
        id: row.get("id")?,
        kind: row.get("kind")?,
        title: row.get("title")?,
        message: row.get("message")?,
        priority: Priority::from_label(&priority_text),
        is_read: parse_bool("notifications.is_read", row.get("is_read")?)?,
        scheduled_for: row.get("scheduled_for")?,
        action_required: parse_bool(
            "notifications.action_required",
            row.get("action_required")?,
        )?,
        created_at: row.get("created_at")?,
    })
}
