//! Mailbox transport seam and the wire shapes it returns.
//!
//! Field names follow the Gmail `users.messages` JSON resource.

use super::MailboxResult;
use serde::{Deserialize, Serialize};

/// Read-only access to a remote mailbox.
pub trait MailboxClient {
    /// Ids of messages matching `query`, at most `max_results`.
    fn list_message_ids(&mut self, query: &str, max_results: u32) -> MailboxResult<Vec<String>>;
    /// Full message including headers and body parts.
    fn get_message(&mut self, id: &str) -> MailboxResult<RemoteMessage>;
}

impl<C: MailboxClient + ?Sized> MailboxClient for Box<C> {
    fn list_message_ids(&mut self, query: &str, max_results: u32) -> MailboxResult<Vec<String>> {
        (**self).list_message_ids(query, max_results)
    }

    fn get_message(&mut self, id: &str) -> MailboxResult<RemoteMessage> {
        (**self).get_message(id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMessage {
    pub id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub payload: MessagePart,
}

/// One MIME part; the message payload is the root part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<MessageHeader>,
    #[serde(default)]
    pub body: MessageBody,
    /// `None` for single-part payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    /// Base64url content; absent for attachments and empty bodies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// `users.messages.list` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MessageList {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessageRef {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::{MessageList, RemoteMessage};

    #[test]
    fn decodes_gmail_message_resource() {
        let message: RemoteMessage = serde_json::from_str(
            r#"{
                "id": "18c1",
                "threadId": "18c0",
                "labelIds": ["UNREAD", "INBOX"],
                "snippet": "hi there",
                "payload": {
                    "mimeType": "multipart/alternative",
                    "headers": [{ "name": "From", "value": "a@b.com" }],
                    "body": { "size": 0 },
                    "parts": [
                        { "mimeType": "text/plain", "body": { "size": 2, "data": "aGk" } }
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(message.label_ids, vec!["UNREAD", "INBOX"]);
        let parts = message.payload.parts.unwrap();
        assert_eq!(parts[0].body.data.as_deref(), Some("aGk"));
    }

    #[test]
    fn empty_list_response_has_no_messages() {
        let list: MessageList = serde_json::from_str(r#"{ "resultSizeEstimate": 0 }"#).unwrap();
        assert!(list.messages.is_empty());
    }
}
