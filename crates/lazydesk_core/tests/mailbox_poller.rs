use chrono::{Local, TimeZone};
use lazydesk_core::mailbox::{
    MailboxClient, MailboxError, MailboxPoller, MailboxResult, MessageBody, MessageHeader,
    MessagePart, RemoteMessage,
};
use lazydesk_core::repo::email_repo::{EmailRepository, SqliteEmailRepository};
use lazydesk_core::{Gateway, ManualClock, SharedClock};
use std::sync::Arc;

#[derive(Default)]
struct FakeMailbox {
    messages: Vec<RemoteMessage>,
    fail_get: bool,
}

impl MailboxClient for FakeMailbox {
    fn list_message_ids(&mut self, _query: &str, max_results: u32) -> MailboxResult<Vec<String>> {
        Ok(self
            .messages
            .iter()
            .take(max_results as usize)
            .map(|message| message.id.clone())
            .collect())
    }

    fn get_message(&mut self, id: &str) -> MailboxResult<RemoteMessage> {
        if self.fail_get {
            return Err(MailboxError::Auth("token revoked".to_string()));
        }
        self.messages
            .iter()
            .find(|message| message.id == id)
            .cloned()
            .ok_or_else(|| MailboxError::Setup(format!("no message {id}")))
    }
}

fn message(id: &str, from: &str, subject: &str, body: Option<&str>) -> RemoteMessage {
    RemoteMessage {
        id: id.to_string(),
        label_ids: vec!["UNREAD".to_string(), "INBOX".to_string()],
        snippet: format!("snippet of {id}"),
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
            body: MessageBody {
                data: body.map(str::to_string),
            },
            parts: None,
        },
    }
}

fn clock() -> SharedClock {
    let start = Local.with_ymd_and_hms(2026, 6, 10, 8, 0, 0).single().unwrap();
    Arc::new(ManualClock::new(start))
}

fn stored_count(gateway: &Gateway) -> i64 {
    let conn = gateway.connect().unwrap();
    SqliteEmailRepository::new(&conn).count_emails().unwrap()
}

#[test]
fn refetching_the_same_ids_stores_each_email_once() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Gateway::open(dir.path().join("assistant.db")).unwrap();
    let client = FakeMailbox {
        messages: vec![
            // "Hello there" in base64url, unpadded.
            message("m1", "Ann <ann@work.com>", "Standup", Some("SGVsbG8gdGhlcmU")),
            message("m2", "bob@example.org", "Lunch?", None),
        ],
        ..FakeMailbox::default()
    };
    let mut poller = MailboxPoller::new(client, gateway.clone(), clock());

    let first = poller.fetch_recent(5, "is:unread");
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].body, "Hello there");
    assert_eq!(first[1].body, "snippet of m2");

    let second = poller.fetch_recent(5, "is:unread");
    assert_eq!(second.len(), 2);
    assert_eq!(stored_count(&gateway), 2);

    let conn = gateway.connect().unwrap();
    let stored = SqliteEmailRepository::new(&conn)
        .get_email_by_remote_id("m1")
        .unwrap()
        .unwrap();
    assert_eq!(stored.sender, "Ann <ann@work.com>");
    assert_eq!(stored.subject, "Standup");
    assert_eq!(stored.labels, ["UNREAD", "INBOX"]);
}

#[test]
fn max_results_limits_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Gateway::open(dir.path().join("assistant.db")).unwrap();
    let client = FakeMailbox {
        messages: (1..=4)
            .map(|n| message(&format!("m{n}"), "x@example.org", "hi", None))
            .collect(),
        ..FakeMailbox::default()
    };
    let mut poller = MailboxPoller::new(client, gateway.clone(), clock());

    assert_eq!(poller.fetch_recent(3, "").len(), 3);
    assert_eq!(stored_count(&gateway), 3);
}

#[test]
fn transport_failure_yields_empty_batch() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Gateway::open(dir.path().join("assistant.db")).unwrap();
    let client = FakeMailbox {
        messages: vec![message("m1", "x@example.org", "hi", None)],
        fail_get: true,
        ..FakeMailbox::default()
    };
    let mut poller = MailboxPoller::new(client, gateway.clone(), clock());

    assert!(poller.fetch_recent(5, "").is_empty());
    assert_eq!(stored_count(&gateway), 0);
}

#[test]
fn undecodable_body_yields_empty_batch() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Gateway::open(dir.path().join("assistant.db")).unwrap();
    let client = FakeMailbox {
        messages: vec![message("m1", "x@example.org", "hi", Some("%%%not-base64%%%"))],
        ..FakeMailbox::default()
    };
    let mut poller = MailboxPoller::new(client, gateway, clock());

    assert!(poller.fetch_recent(5, "").is_empty());
}

#[test]
fn empty_listing_skips_storage() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Gateway::open(dir.path().join("assistant.db")).unwrap();
    let mut poller = MailboxPoller::new(FakeMailbox::default(), gateway.clone(), clock());

    assert!(poller.fetch_recent(5, "").is_empty());
    assert_eq!(stored_count(&gateway), 0);
}
