//! Assistant settings.
//!
//! # Responsibility
//! - Hold every tunable the assistant reads: paths, poll cadence, reminder
//!   times, study goal and priority heuristics.
//! - Load overrides from an optional JSON file.
//!
//! # Invariants
//! - Every field has a default, so a partial file is valid.
//! - A missing file yields defaults; a malformed file is an error.

use chrono::NaiveTime;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "lazydesk.json";

/// Keywords that raise an email to `high` priority.
pub const DEFAULT_PRIORITY_KEYWORDS: &[&str] = &[
    "urgent",
    "important",
    "asap",
    "deadline",
    "meeting",
    "interview",
    "project",
    "submit",
    "payment",
    "invoice",
];

/// Sender domains that raise an email to `high` priority.
pub const DEFAULT_PRIORITY_DOMAINS: &[&str] = &["work.com", "university.edu", "bank.com"];

/// Longest accepted mailbox poll interval: one week.
pub const MAX_EMAIL_CHECK_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "malformed config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Runtime settings for the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub database_path: PathBuf,
    pub log_dir: PathBuf,
    /// `None` selects the build-mode default.
    pub log_level: Option<String>,
    pub export_dir: PathBuf,
    /// OAuth client secrets downloaded from the provider console.
    pub credentials_path: PathBuf,
    /// Cached access/refresh token written after consent.
    pub token_path: PathBuf,
    pub email_check_interval_minutes: u64,
    pub email_max_results: u32,
    pub email_query: String,
    #[serde(with = "hh_mm_list")]
    pub study_reminder_times: Vec<NaiveTime>,
    pub daily_study_goal_minutes: i64,
    #[serde(with = "hh_mm")]
    pub daily_summary_time: NaiveTime,
    pub priority_keywords: Vec<String>,
    pub priority_domains: Vec<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("personal_assistant.db"),
            log_dir: PathBuf::from("logs"),
            log_level: None,
            export_dir: PathBuf::from("assistant_data"),
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            email_check_interval_minutes: 30,
            email_max_results: 5,
            email_query: "is:unread newer_than:1h".to_string(),
            study_reminder_times: vec![hm(9, 0), hm(14, 0), hm(19, 0)],
            daily_study_goal_minutes: 60,
            daily_summary_time: hm(20, 0),
            priority_keywords: DEFAULT_PRIORITY_KEYWORDS
                .iter()
                .map(|value| value.to_string())
                .collect(),
            priority_domains: DEFAULT_PRIORITY_DOMAINS
                .iter()
                .map(|value| value.to_string())
                .collect(),
        }
    }
}

impl AssistantConfig {
    /// Loads `path` when it exists, otherwise returns defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "event=config_load module=config status=ok source=defaults path={}",
                path.display()
            );
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        info!(
            "event=config_load module=config status=ok source=file path={}",
            path.display()
        );
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.email_check_interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "email_check_interval_minutes must be positive".to_string(),
            ));
        }
        if self.email_check_interval_minutes > MAX_EMAIL_CHECK_INTERVAL_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "email_check_interval_minutes must be at most {MAX_EMAIL_CHECK_INTERVAL_MINUTES}"
            )));
        }
        if self.email_max_results == 0 {
            return Err(ConfigError::Invalid(
                "email_max_results must be positive".to_string(),
            ));
        }
        if self.daily_study_goal_minutes < 0 {
            return Err(ConfigError::Invalid(
                "daily_study_goal_minutes must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

const TIME_FORMAT: &str = "%H:%M";

mod hh_mm {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(text.trim(), TIME_FORMAT)
            .map_err(|_| de::Error::custom(format!("expected HH:MM, got `{text}`")))
    }
}

mod hh_mm_list {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::ser::SerializeSeq;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        times: &[NaiveTime],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(times.len()))?;
        for time in times {
            seq.serialize_element(&time.format(TIME_FORMAT).to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NaiveTime>, D::Error> {
        let texts = Vec::<String>::deserialize(deserializer)?;
        texts
            .iter()
            .map(|text| {
                NaiveTime::parse_from_str(text.trim(), TIME_FORMAT)
                    .map_err(|_| de::Error::custom(format!("expected HH:MM, got `{text}`")))
            })
            .collect()
    }
}
