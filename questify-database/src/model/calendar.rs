use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Client-managed calendar payloads kept as opaque JSON text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarStore {
    pub store_local_events: String,
    pub store_tasks: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarProvider {
    Google,
    Microsoft,
}

impl CalendarProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
        }
    }
}

impl fmt::Display for CalendarProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarProvider {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "microsoft" | "ms" => Ok(Self::Microsoft),
            other => Err(anyhow::anyhow!("unknown calendar provider `{other}`")),
        }
    }
}

/// Stored OAuth tokens for a user's connected calendar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarAccount {
    pub user_id: i64,
    pub provider: CalendarProvider,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<u64>,
}

impl CalendarAccount {
    pub fn is_expired(&self, now_unix_secs: u64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now_unix_secs)
    }
}

/// Event imported from a provider, before it is stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedEvent {
    pub external_id: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub provider: CalendarProvider,
    pub title: String,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{CalendarAccount, CalendarProvider};

    #[test]
    fn providers_parse_short_names() {
        assert_eq!(
            "ms".parse::<CalendarProvider>().unwrap(),
            CalendarProvider::Microsoft
        );
        assert_eq!(
            "Google".parse::<CalendarProvider>().unwrap(),
            CalendarProvider::Google
        );
        assert!("yahoo".parse::<CalendarProvider>().is_err());
    }

    #[test]
    fn expiry_is_inclusive() {
        let account = CalendarAccount {
            user_id: 1,
            provider: CalendarProvider::Google,
            access_token: "token".to_owned(),
            refresh_token: None,
            expires_at: Some(100),
        };

        assert!(!account.is_expired(99));
        assert!(account.is_expired(100));
        assert!(
            !CalendarAccount {
                expires_at: None,
                ..account
            }
            .is_expired(u64::MAX)
        );
    }
}
