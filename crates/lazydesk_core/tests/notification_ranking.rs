use chrono::{Duration, Local, TimeZone};
use lazydesk_core::model::email::ParsedEmail;
use lazydesk_core::model::notification::{kind, NewNotification};
use lazydesk_core::repo::notification_repo::SqliteNotificationRepository;
use lazydesk_core::{
    open_db_in_memory, Clock, ManualClock, NotificationService, Priority, RepoError, SharedClock,
};
use rusqlite::Connection;
use std::sync::Arc;

fn shared_clock() -> SharedClock {
    let start = Local.with_ymd_and_hms(2026, 6, 10, 8, 0, 0).single().unwrap();
    Arc::new(ManualClock::new(start))
}

fn service(conn: &Connection) -> NotificationService<SqliteNotificationRepository<'_>> {
    NotificationService::new(SqliteNotificationRepository::new(conn), shared_clock())
}

fn email(remote_id: &str, sender: &str, subject: &str) -> ParsedEmail {
    ParsedEmail {
        remote_id: remote_id.to_string(),
        sender: sender.to_string(),
        subject: subject.to_string(),
        snippet: "see attached".to_string(),
        body: "see attached".to_string(),
        labels: vec!["UNREAD".to_string()],
        date_header: String::new(),
    }
}

fn pending_titles(
    notifications: &NotificationService<SqliteNotificationRepository<'_>>,
) -> Vec<String> {
    notifications
        .pending()
        .unwrap()
        .into_iter()
        .map(|notification| notification.title)
        .collect()
}

#[test]
fn pending_keeps_insertion_order_for_equal_priority() {
    let conn = open_db_in_memory().unwrap();
    let start = Local.with_ymd_and_hms(2026, 6, 10, 8, 0, 0).single().unwrap();
    let clock = ManualClock::new(start);
    let notifications = NotificationService::new(
        SqliteNotificationRepository::new(&conn),
        Arc::new(clock.clone()),
    );

    for (title, priority) in [
        ("low", Priority::Low),
        ("high1", Priority::High),
        ("medium", Priority::Medium),
        ("high2", Priority::High),
    ] {
        notifications
            .notify(kind::REMINDER, title, "check in", priority)
            .unwrap();
        clock.advance(Duration::milliseconds(1));
    }

    assert_eq!(
        pending_titles(&notifications),
        ["high1", "high2", "medium", "low"]
    );
    assert_eq!(notifications.pending_top(2).unwrap().len(), 2);
}

#[test]
fn pending_puts_newer_seconds_first_within_a_priority() {
    let conn = open_db_in_memory().unwrap();
    let notifications = service(&conn);

    let inputs = [
        ("low", Priority::Low, 1_000),
        ("high-old", Priority::High, 2_000),
        ("medium", Priority::Medium, 3_000),
        ("high-new", Priority::High, 4_000),
    ];
    for (title, priority, created_at) in inputs {
        let notification = NewNotification::new(kind::REMINDER, title, None, created_at)
            .with_priority(priority);
        notifications.create(&notification).unwrap();
    }

    assert_eq!(
        pending_titles(&notifications),
        ["high-new", "high-old", "medium", "low"]
    );
}

#[test]
fn mark_read_is_repeatable_and_hides_the_row() {
    let conn = open_db_in_memory().unwrap();
    let notifications = service(&conn);
    let id = notifications
        .notify(kind::REMINDER, "Stretch", "Stand up", Priority::Medium)
        .unwrap();

    notifications.mark_read(id).unwrap();
    notifications.mark_read(id).unwrap();

    assert!(notifications.pending().unwrap().is_empty());
    assert_eq!(notifications.unread_count().unwrap(), 0);
}

#[test]
fn mark_read_unknown_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let notifications = service(&conn);

    let err = notifications.mark_read(42).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id: 42, .. }));
}

#[test]
fn mark_all_read_reports_changed_rows() {
    let conn = open_db_in_memory().unwrap();
    let notifications = service(&conn);
    for title in ["one", "two", "three"] {
        notifications
            .notify(kind::REMINDER, title, "body", Priority::Low)
            .unwrap();
    }

    assert_eq!(notifications.mark_all_read().unwrap(), 3);
    assert_eq!(notifications.mark_all_read().unwrap(), 0);
}

#[test]
fn email_batch_creates_one_notification_each_plus_summary() {
    let conn = open_db_in_memory().unwrap();
    let notifications = service(&conn);
    let batch = [
        email("m1", "Boss <boss@work.com>", "Quarterly numbers"),
        email("m2", "shop@deals.example", "Weekend sale"),
        email("m3", "friend@mail.example", "URGENT: call me"),
    ];

    let ids = notifications.notify_emails(&batch).unwrap();
    assert_eq!(ids.len(), 4);

    let pending = notifications.pending().unwrap();
    let summary = pending
        .iter()
        .find(|notification| notification.kind == kind::EMAIL_SUMMARY)
        .unwrap();
    assert_eq!(summary.title, "Email Summary: 3 new emails");

    let by_title = |title: &str| {
        pending
            .iter()
            .find(|notification| notification.title == title)
            .unwrap()
            .clone()
    };
    let boss = by_title("New email: Quarterly numbers");
    assert_eq!(boss.priority, Priority::High);
    assert!(!boss.action_required);

    let sale = by_title("New email: Weekend sale");
    assert_eq!(sale.priority, Priority::Medium);

    let urgent = by_title("New email: URGENT: call me");
    assert_eq!(urgent.priority, Priority::High);
    assert!(urgent.action_required);
    assert_eq!(
        urgent.message.as_deref(),
        Some("From: friend@mail.example\nsee attached")
    );
    assert_eq!(urgent.created_at, shared_clock().now_ms());
}

#[test]
fn empty_email_batch_creates_nothing() {
    let conn = open_db_in_memory().unwrap();
    let notifications = service(&conn);

    assert!(notifications.notify_emails(&[]).unwrap().is_empty());
    assert_eq!(notifications.unread_count().unwrap(), 0);
}
