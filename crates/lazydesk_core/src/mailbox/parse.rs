//! Message resource to [`ParsedEmail`] conversion.
//!
//! Body extraction walks one level of parts only. Nested multiparts,
//! HTML-only messages and messages without a `text/plain` part produce an
//! empty body, which then falls back to the snippet.

use super::client::{MessagePart, RemoteMessage};
use super::{MailboxError, MailboxResult};
use crate::model::email::ParsedEmail;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

/// Stored body length in characters.
pub const MAX_BODY_CHARS: usize = 1000;

const DEFAULT_SENDER: &str = "Unknown";
const DEFAULT_SUBJECT: &str = "No Subject";

// Providers emit both padded and unpadded base64url.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn parse_message(message: RemoteMessage) -> MailboxResult<ParsedEmail> {
    let payload = &message.payload;
    let sender = header(payload, "From").unwrap_or(DEFAULT_SENDER).to_string();
    let subject = header(payload, "Subject")
        .unwrap_or(DEFAULT_SUBJECT)
        .to_string();
    let date_header = header(payload, "Date").unwrap_or_default().to_string();

    let body = extract_plain_body(payload)?;
    let body = if body.is_empty() {
        message.snippet.clone()
    } else {
        body.chars().take(MAX_BODY_CHARS).collect()
    };

    Ok(ParsedEmail {
        remote_id: message.id,
        sender,
        subject,
        snippet: message.snippet,
        body,
        labels: message.label_ids,
        date_header,
    })
}

/// First header named `name`, compared case-insensitively.
fn header<'a>(part: &'a MessagePart, name: &str) -> Option<&'a str> {
    part.headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case(name))
        .map(|header| header.value.as_str())
}

fn extract_plain_body(payload: &MessagePart) -> MailboxResult<String> {
    let plain = match &payload.parts {
        Some(parts) => parts.iter().find(|part| is_plain_text(part)),
        None if is_plain_text(payload) => Some(payload),
        None => None,
    };
    match plain.and_then(|part| part.body.data.as_deref()) {
        Some(data) => decode_body(data),
        None => Ok(String::new()),
    }
}

fn is_plain_text(part: &MessagePart) -> bool {
    part.mime_type.eq_ignore_ascii_case("text/plain")
}

fn decode_body(data: &str) -> MailboxResult<String> {
    let bytes = URL_SAFE_LENIENT
        .decode(data.trim())
        .map_err(|err| MailboxError::Decode(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| MailboxError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_message, MAX_BODY_CHARS};
    use crate::mailbox::client::{MessageBody, MessageHeader, MessagePart, RemoteMessage};
    use crate::mailbox::MailboxError;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    fn header(name: &str, value: &str) -> MessageHeader {
        MessageHeader {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn part(mime_type: &str, text: Option<&str>) -> MessagePart {
        MessagePart {
            mime_type: mime_type.to_string(),
            headers: Vec::new(),
            body: MessageBody {
                data: text.map(|t| URL_SAFE_NO_PAD.encode(t)),
            },
            parts: None,
        }
    }

    fn message(payload: MessagePart) -> RemoteMessage {
        RemoteMessage {
            id: "m-1".to_string(),
            label_ids: vec!["UNREAD".to_string()],
            snippet: "snippet text".to_string(),
            payload,
        }
    }

    #[test]
    fn headers_default_when_missing_and_first_match_wins() {
        let mut payload = part("text/plain", Some("hello"));
        payload.headers = vec![
            header("subject", "first"),
            header("Subject", "second"),
        ];
        let parsed = parse_message(message(payload)).unwrap();

        assert_eq!(parsed.subject, "first");
        assert_eq!(parsed.sender, "Unknown");
        assert_eq!(parsed.date_header, "");
        assert_eq!(parsed.body, "hello");
        assert_eq!(parsed.labels, vec!["UNREAD"]);
    }

    #[test]
    fn multipart_uses_first_plain_part() {
        let mut payload = part("multipart/alternative", None);
        payload.parts = Some(vec![
            part("text/html", Some("<p>html</p>")),
            part("text/plain", Some("plain one")),
            part("text/plain", Some("plain two")),
        ]);
        let parsed = parse_message(message(payload)).unwrap();
        assert_eq!(parsed.body, "plain one");
    }

    #[test]
    fn nested_multipart_falls_back_to_snippet() {
        let mut inner = part("multipart/alternative", None);
        inner.parts = Some(vec![part("text/plain", Some("deep"))]);
        let mut payload = part("multipart/mixed", None);
        payload.parts = Some(vec![inner]);

        let parsed = parse_message(message(payload)).unwrap();
        assert_eq!(parsed.body, "snippet text");
    }

    #[test]
    fn long_body_is_cut_without_marker() {
        let long = "x".repeat(MAX_BODY_CHARS + 50);
        let parsed = parse_message(message(part("text/plain", Some(&long)))).unwrap();
        assert_eq!(parsed.body.chars().count(), MAX_BODY_CHARS);
    }

    #[test]
    fn padded_data_decodes_and_garbage_is_an_error() {
        let mut payload = part("text/plain", None);
        payload.body.data = Some("aGk=".to_string());
        assert_eq!(parse_message(message(payload)).unwrap().body, "hi");

        let mut payload = part("text/plain", None);
        payload.body.data = Some("!!!".to_string());
        assert!(matches!(
            parse_message(message(payload)),
            Err(MailboxError::Decode(_))
        ));
    }
}
