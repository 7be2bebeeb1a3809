use chrono::{Duration, Local, NaiveTime, TimeZone};
use lazydesk_core::export::{COMMANDS_FILE, NOTIFICATIONS_FILE, PROGRESS_FILE};
use lazydesk_core::mailbox::{
    MailboxClient, MailboxResult, MessageHeader, MessagePart, RemoteMessage,
};
use lazydesk_core::model::notification::kind;
use lazydesk_core::model::study::NewStudySession;
use lazydesk_core::service::sample_data::seed_sample_data;
use lazydesk_core::repo::email_repo::{EmailRepository, SqliteEmailRepository};
use lazydesk_core::{
    Assistant, AssistantConfig, Clock, Gateway, ManualClock, Priority, SharedClock,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

struct CannedMailbox {
    messages: Vec<RemoteMessage>,
}

impl MailboxClient for CannedMailbox {
    fn list_message_ids(&mut self, _query: &str, max_results: u32) -> MailboxResult<Vec<String>> {
        Ok(self
            .messages
            .iter()
            .take(max_results as usize)
            .map(|message| message.id.clone())
            .collect())
    }

    fn get_message(&mut self, id: &str) -> MailboxResult<RemoteMessage> {
        Ok(self
            .messages
            .iter()
            .find(|message| message.id == id)
            .cloned()
            .unwrap_or_default())
    }
}

fn remote(id: &str, from: &str, subject: &str) -> RemoteMessage {
    RemoteMessage {
        id: id.to_string(),
        snippet: "short preview".to_string(),
        payload: MessagePart {
            mime_type: "text/plain".to_string(),
            headers: vec![
                MessageHeader {
                    name: "From".to_string(),
                    value: from.to_string(),
                },
                MessageHeader {
                    name: "Subject".to_string(),
                    value: subject.to_string(),
                },
            ],
            ..MessagePart::default()
        },
        ..RemoteMessage::default()
    }
}

struct Fixture {
    dir: TempDir,
    clock: ManualClock,
    assistant: Assistant,
}

fn fixture(messages: Vec<RemoteMessage>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config = AssistantConfig {
        database_path: dir.path().join("assistant.db"),
        export_dir: dir.path().join("assistant_data"),
        ..AssistantConfig::default()
    };
    let gateway = Gateway::open(&config.database_path).unwrap();
    let start = Local.with_ymd_and_hms(2026, 6, 10, 8, 0, 0).single().unwrap();
    let clock = ManualClock::new(start);
    let shared: SharedClock = Arc::new(clock.clone());
    let client = Box::new(CannedMailbox { messages });
    let assistant = Assistant::new(config, gateway, shared, client);
    Fixture {
        dir,
        clock,
        assistant,
    }
}

fn log_minutes(assistant: &Assistant, minutes: i64) {
    assistant
        .with_services(|services| {
            let study = services.study();
            let session = NewStudySession::new("Python", "Decorators", minutes, study.today());
            study.log_session(&session)
        })
        .unwrap();
}

#[test]
fn default_job_table_is_registered_in_order() {
    let fx = fixture(Vec::new());
    let names: Vec<String> = fx
        .assistant
        .orchestrator()
        .schedule()
        .into_iter()
        .map(|(name, _)| name)
        .collect();

    assert_eq!(
        names,
        [
            "email_check",
            "study_reminder_0900",
            "study_reminder_1400",
            "study_reminder_1900",
            "daily_summary",
        ]
    );
}

#[test]
fn due_jobs_run_when_the_clock_passes_them() {
    let fx = fixture(Vec::new());
    let mut orchestrator = fx.assistant.orchestrator();
    assert_eq!(orchestrator.run_pending(), 0);

    fx.clock.advance(Duration::minutes(61));
    // email_check at 08:30 and the 09:00 reminder.
    assert_eq!(orchestrator.run_pending(), 2);

    let pending = fx
        .assistant
        .with_services(|services| services.notifications().pending())
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, kind::STUDY_REMINDER);
    assert_eq!(pending[0].title, "Study Reminder: General Study");
    assert_eq!(
        pending[0].message.as_deref(),
        Some("You need 60 more minutes to reach your daily goal!")
    );

    let next = orchestrator
        .schedule()
        .into_iter()
        .find(|(name, _)| name == "study_reminder_0900")
        .map(|(_, at)| at)
        .unwrap();
    assert_eq!(next.date_naive(), fx.clock.today() + Duration::days(1));
    assert_eq!(next.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
}

#[test]
fn goal_reminder_is_skipped_once_goal_is_met() {
    let fx = fixture(Vec::new());
    log_minutes(&fx.assistant, 45);
    let id = fx.assistant.study_reminder().unwrap();
    assert!(id.is_some());

    log_minutes(&fx.assistant, 15);
    assert_eq!(fx.assistant.study_reminder().unwrap(), None);
}

#[test]
fn daily_summary_covers_todays_sessions() {
    let fx = fixture(Vec::new());
    log_minutes(&fx.assistant, 90);

    fx.assistant.daily_summary().unwrap();
    let pending = fx
        .assistant
        .with_services(|services| services.notifications().pending())
        .unwrap();
    let summary = pending
        .iter()
        .find(|notification| notification.kind == kind::DAILY_SUMMARY)
        .unwrap();
    assert_eq!(summary.priority, Priority::Low);
    assert_eq!(
        summary.message.as_deref(),
        Some("Daily Summary: 1.5h studied across Python")
    );
}

#[test]
fn checking_emails_notifies_and_deduplicates() {
    let fx = fixture(vec![
        remote("a1", "Dean <dean@university.edu>", "Office hours"),
        remote("a2", "promo@shop.example", "Invoice overdue"),
    ]);

    assert_eq!(fx.assistant.check_emails().unwrap(), 2);
    assert_eq!(fx.assistant.check_emails().unwrap(), 2);

    // Two polls, each with two email notifications and a summary.
    let pending = fx
        .assistant
        .with_services(|services| services.notifications().pending())
        .unwrap();
    assert_eq!(pending.len(), 6);
    let high = pending
        .iter()
        .filter(|notification| notification.priority == Priority::High)
        .count();
    assert_eq!(high, 4);

    let gateway = Gateway::open(fx.dir.path().join("assistant.db")).unwrap();
    let conn = gateway.connect().unwrap();
    assert_eq!(SqliteEmailRepository::new(&conn).count_emails().unwrap(), 2);
}

#[test]
fn export_writes_three_files_with_sample_data() {
    let fx = fixture(Vec::new());
    let created_at = fx.clock.now_ms();
    let summary = fx
        .assistant
        .with_services(|services| seed_sample_data(services, created_at))
        .unwrap();
    assert_eq!(summary.sessions, 3);

    let dir = fx.assistant.export().unwrap();
    assert_eq!(dir, fx.dir.path().join("assistant_data"));

    let progress: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join(PROGRESS_FILE)).unwrap()).unwrap();
    assert_eq!(progress["recent_sessions"].as_array().unwrap().len(), 3);
    assert_eq!(progress["quick_stats"]["active_projects"], 2);
    assert_eq!(progress["quick_stats"]["learning_resources"], 2);
    // 195 minutes is 3.25 h; halves round to even.
    assert_eq!(progress["quick_stats"]["week_study_hours"], 3.2);

    let notifications: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join(NOTIFICATIONS_FILE)).unwrap())
            .unwrap();
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 3);
    assert_eq!(notifications[0]["priority"], "high");
    assert_eq!(notifications[0]["type"], "reminder");
    assert_eq!(notifications[0]["created_at"], created_at);

    let commands = std::fs::read_to_string(dir.join(COMMANDS_FILE)).unwrap();
    assert!(commands.starts_with("# Quick Commands"));
}
