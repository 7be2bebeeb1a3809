//! Gmail REST implementation of [`MailboxClient`].

use super::auth::Authenticator;
use super::client::{MailboxClient, MessageList, RemoteMessage};
use super::MailboxResult;
use crate::clock::SharedClock;
use crate::config::AssistantConfig;
use log::debug;
use reqwest::blocking::Client;

pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Blocking client for `users/me/messages`.
pub struct GmailClient {
    http: Client,
    auth: Authenticator,
    base_url: String,
}

impl GmailClient {
    pub fn new(http: Client, auth: Authenticator) -> Self {
        Self {
            http,
            auth,
            base_url: GMAIL_API_BASE.to_string(),
        }
    }

    /// Client using the credential and token paths from `config`.
    pub fn from_config(config: &AssistantConfig, clock: SharedClock) -> Self {
        let http = Client::new();
        let auth = Authenticator::new(
            config.credentials_path.clone(),
            config.token_path.clone(),
            http.clone(),
            clock,
        );
        Self::new(http, auth)
    }

    /// Overrides the API root, e.g. for a local stub server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl MailboxClient for GmailClient {
    fn list_message_ids(&mut self, query: &str, max_results: u32) -> MailboxResult<Vec<String>> {
        let token = self.auth.access_token()?;
        let max_results = max_results.to_string();
        let list: MessageList = self
            .http
            .get(format!("{}/users/me/messages", self.base_url))
            .bearer_auth(token)
            .query(&[("q", query), ("maxResults", max_results.as_str())])
            .send()?
            .error_for_status()?
            .json()?;

        debug!(
            "event=mailbox_list module=mailbox status=ok count={}",
            list.messages.len()
        );
        Ok(list.messages.into_iter().map(|message| message.id).collect())
    }

    fn get_message(&mut self, id: &str) -> MailboxResult<RemoteMessage> {
        let token = self.auth.access_token()?;
        let message = self
            .http
            .get(format!("{}/users/me/messages/{id}", self.base_url))
            .bearer_auth(token)
            .query(&[("format", "full")])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(message)
    }
}
