//! OAuth installed-app flow for the mailbox API.
//!
//! # Responsibility
//! - Read client secrets downloaded from the provider console.
//! - Cache the access/refresh token pair on disk and refresh it on expiry.
//! - Run the interactive loopback consent flow when no usable token exists.
//!
//! # Invariants
//! - A missing client secrets file is a setup error, reported before any
//!   network traffic.
//! - The consent redirect is accepted only when its `state` matches.
//! - Token values are never logged.

use super::{MailboxError, MailboxResult};
use crate::clock::SharedClock;
use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";
/// Tokens this close to expiry are refreshed early.
const EXPIRY_SLACK_SECS: i64 = 60;

/// OAuth client registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Reads a provider credentials file (`installed` or `web` section).
    pub fn load(path: &Path) -> MailboxResult<Self> {
        if !path.exists() {
            return Err(MailboxError::Setup(format!(
                "`{}` not found; create OAuth desktop credentials in the provider console, \
                 enable the Gmail API and save the downloaded file there",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|source| MailboxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> MailboxResult<Self> {
        let file: CredentialsFile = serde_json::from_str(text)?;
        file.installed.or(file.web).ok_or_else(|| {
            MailboxError::Setup("credentials file has no `installed` or `web` section".to_string())
        })
    }
}

/// On-disk token cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCache {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    pub expires_at: i64,
}

impl TokenCache {
    pub fn is_fresh(&self, now_secs: i64) -> bool {
        now_secs + EXPIRY_SLACK_SECS < self.expires_at
    }

    pub fn load(path: &Path) -> MailboxResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|source| MailboxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match serde_json::from_str(&text) {
            Ok(cache) => Ok(Some(cache)),
            Err(err) => {
                warn!(
                    "event=token_load module=mailbox status=error path={} error={}",
                    path.display(),
                    err
                );
                Ok(None)
            }
        }
    }

    pub fn save(&self, path: &Path) -> MailboxResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| MailboxError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Receives the consent URL the user must open.
pub type ConsentPrompt = Box<dyn Fn(&str) + Send>;

fn default_prompt() -> ConsentPrompt {
    Box::new(|url| {
        println!("Open this URL in your browser to authorize mailbox access:\n\n{url}\n");
    })
}

/// Supplies bearer tokens, refreshing or re-consenting as needed.
pub struct Authenticator {
    credentials_path: PathBuf,
    token_path: PathBuf,
    http: Client,
    clock: SharedClock,
    prompt: ConsentPrompt,
    cached: Option<TokenCache>,
}

impl Authenticator {
    pub fn new(
        credentials_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
        http: Client,
        clock: SharedClock,
    ) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            token_path: token_path.into(),
            http,
            clock,
            prompt: default_prompt(),
            cached: None,
        }
    }

    pub fn with_prompt(mut self, prompt: ConsentPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    /// Returns a usable access token.
    ///
    /// Order: in-memory token, token file, refresh grant, interactive
    /// consent. A failed refresh is an error; it does not fall through to
    /// consent.
    pub fn access_token(&mut self) -> MailboxResult<String> {
        let now = self.clock.now().timestamp();
        if self.cached.is_none() {
            self.cached = TokenCache::load(&self.token_path)?;
        }
        if let Some(cache) = self.cached.as_ref().filter(|cache| cache.is_fresh(now)) {
            return Ok(cache.access_token.clone());
        }

        let secrets = ClientSecrets::load(&self.credentials_path)?;
        let refresh_token = self
            .cached
            .as_ref()
            .and_then(|cache| cache.refresh_token.clone());
        let cache = match refresh_token {
            Some(refresh_token) => self.refresh(&secrets, &refresh_token, now)?,
            None => self.consent(&secrets, now)?,
        };
        cache.save(&self.token_path)?;
        let token = cache.access_token.clone();
        self.cached = Some(cache);
        Ok(token)
    }

    fn refresh(
        &self,
        secrets: &ClientSecrets,
        refresh_token: &str,
        now: i64,
    ) -> MailboxResult<TokenCache> {
        let response: TokenResponse = self
            .http
            .post(&secrets.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", secrets.client_id.as_str()),
                ("client_secret", secrets.client_secret.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        info!("event=token_refresh module=mailbox status=ok");
        Ok(TokenCache {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            expires_at: now + response.expires_in.unwrap_or(0),
        })
    }

    fn consent(&self, secrets: &ClientSecrets, now: i64) -> MailboxResult<TokenCache> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).map_err(|source| MailboxError::Io {
            path: PathBuf::from("127.0.0.1:0"),
            source,
        })?;
        let port = listener
            .local_addr()
            .map_err(|source| MailboxError::Io {
                path: PathBuf::from("127.0.0.1:0"),
                source,
            })?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{port}");
        let state = Uuid::new_v4().to_string();
        let consent_url = consent_url(secrets, &redirect_uri, &state)?;

        info!(
            "event=oauth_consent module=mailbox status=start port={}",
            port
        );
        (self.prompt)(consent_url.as_str());
        let code = accept_redirect(&listener, &state)?;

        let response: TokenResponse = self
            .http
            .post(&secrets.token_uri)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("client_id", secrets.client_id.as_str()),
                ("client_secret", secrets.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        info!("event=oauth_consent module=mailbox status=ok");
        Ok(TokenCache {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: now + response.expires_in.unwrap_or(0),
        })
    }
}

fn consent_url(secrets: &ClientSecrets, redirect_uri: &str, state: &str) -> MailboxResult<Url> {
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", GMAIL_READONLY_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .map_err(|err| MailboxError::Setup(format!("invalid auth_uri `{}`: {err}", secrets.auth_uri)))
}

/// Serves exactly one loopback request and returns its authorization code.
fn accept_redirect(listener: &TcpListener, expected_state: &str) -> MailboxResult<String> {
    let io_error = |source: std::io::Error| MailboxError::Io {
        path: PathBuf::from("oauth redirect"),
        source,
    };
    let (mut stream, _) = listener.accept().map_err(io_error)?;
    let mut request_line = String::new();
    BufReader::new(&stream)
        .read_line(&mut request_line)
        .map_err(io_error)?;

    let outcome = parse_redirect(&request_line, expected_state);
    let reply = match &outcome {
        Ok(_) => "Authorization complete. You can close this window.",
        Err(_) => "Authorization failed. Return to the terminal for details.",
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
        reply.len()
    );
    stream.write_all(response.as_bytes()).map_err(io_error)?;
    outcome
}

/// Extracts `code` from a request line such as
/// `GET /?state=..&code=.. HTTP/1.1`.
pub(crate) fn parse_redirect(request_line: &str, expected_state: &str) -> MailboxResult<String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| MailboxError::Auth("malformed redirect request".to_string()))?;
    let url = Url::parse(&format!("http://127.0.0.1{target}"))
        .map_err(|err| MailboxError::Auth(format!("malformed redirect target: {err}")))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(MailboxError::Auth(format!("consent denied: {value}")));
            }
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(MailboxError::Auth("redirect state mismatch".to_string()));
    }
    code.ok_or_else(|| MailboxError::Auth("redirect carried no authorization code".to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_redirect, ClientSecrets, TokenCache};
    use crate::mailbox::MailboxError;

    #[test]
    fn redirect_with_matching_state_yields_code() {
        let code = parse_redirect("GET /?state=abc&code=4%2F0xyz HTTP/1.1\r\n", "abc").unwrap();
        assert_eq!(code, "4/0xyz");
    }

    #[test]
    fn redirect_rejects_state_mismatch_and_denial() {
        assert!(matches!(
            parse_redirect("GET /?state=evil&code=1 HTTP/1.1", "abc"),
            Err(MailboxError::Auth(_))
        ));
        let denied = parse_redirect("GET /?error=access_denied&state=abc HTTP/1.1", "abc")
            .unwrap_err();
        assert!(denied.to_string().contains("access_denied"));
    }

    #[test]
    fn credentials_accept_installed_section() {
        let secrets = ClientSecrets::from_json(
            r#"{ "installed": {
                "client_id": "id",
                "client_secret": "secret",
                "auth_uri": "https://accounts.example.com/o/oauth2/auth",
                "token_uri": "https://oauth2.example.com/token",
                "redirect_uris": ["http://localhost"]
            } }"#,
        )
        .unwrap();
        assert_eq!(secrets.client_id, "id");
    }

    #[test]
    fn missing_credentials_file_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientSecrets::load(&dir.path().join("credentials.json")).unwrap_err();
        assert!(matches!(err, MailboxError::Setup(_)));
    }

    #[test]
    fn token_cache_round_trips_and_expires_early() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let cache = TokenCache {
            access_token: "a".to_string(),
            refresh_token: Some("r".to_string()),
            expires_at: 1_000,
        };
        cache.save(&path).unwrap();

        assert_eq!(TokenCache::load(&path).unwrap(), Some(cache.clone()));
        assert!(cache.is_fresh(900));
        assert!(!cache.is_fresh(950));
    }
}
