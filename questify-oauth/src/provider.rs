use std::env;

use anyhow::Context as _;
use reqwest::Url;
use serde::Deserialize;

use questify_database::model::calendar::CalendarProvider;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_SCOPES: &[&str] = &[
    "openid",
    "email",
    "profile",
    "https://www.googleapis.com/auth/calendar.readonly",
];

const MICROSOFT_AUTHORIZE_URL: &str =
    "https://login.microsoftonline.com/common/oauth2/v2.0/authorize";
const MICROSOFT_TOKEN_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";
const MICROSOFT_SCOPES: &[&str] = &[
    "offline_access",
    "openid",
    "profile",
    "email",
    "Calendars.Read",
];

/// Lifetime assumed when a token response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Client registration and endpoints for one calendar provider.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub provider: CalendarProvider,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: &'static str,
    pub token_url: &'static str,
    pub scopes: &'static [&'static str],
}

impl ProviderConfig {
    pub fn new(
        provider: CalendarProvider,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        let (authorize_url, token_url, scopes) = match provider {
            CalendarProvider::Google => (GOOGLE_AUTHORIZE_URL, GOOGLE_TOKEN_URL, GOOGLE_SCOPES),
            CalendarProvider::Microsoft => {
                (MICROSOFT_AUTHORIZE_URL, MICROSOFT_TOKEN_URL, MICROSOFT_SCOPES)
            }
        };

        Self {
            provider,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url,
            token_url,
            scopes,
        }
    }

    /// Read the provider registration from the environment.
    ///
    /// Returns `None` unless both the client id and secret are set and non-empty.
    pub fn from_env_optional(provider: CalendarProvider) -> Option<Self> {
        let (id_var, secret_var, redirect_var, default_redirect) = match provider {
            CalendarProvider::Google => (
                "GOOGLE_CLIENT_ID",
                "GOOGLE_CLIENT_SECRET",
                "GOOGLE_REDIRECT",
                "http://localhost:5000/oauth/google/callback",
            ),
            CalendarProvider::Microsoft => (
                "MS_CLIENT_ID",
                "MS_CLIENT_SECRET",
                "MS_REDIRECT",
                "http://localhost:5000/oauth/microsoft/callback",
            ),
        };

        let read = |key: &str| {
            env::var(key)
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let client_id = read(id_var)?;
        let client_secret = read(secret_var)?;
        let redirect_uri = read(redirect_var).unwrap_or_else(|| default_redirect.to_owned());

        Some(Self::new(provider, client_id, client_secret, redirect_uri))
    }

    /// Build the consent URL for a PKCE (S256) authorization code request.
    pub fn authorization_url(&self, state: &str, code_challenge: &str) -> anyhow::Result<String> {
        let mut url = Url::parse(self.authorize_url)
            .with_context(|| format!("invalid authorize url for {}", self.provider))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("scope", &self.scopes.join(" "))
                .append_pair("state", state)
                .append_pair("code_challenge_method", "S256")
                .append_pair("code_challenge", code_challenge);

            if self.provider == CalendarProvider::Google {
                query
                    .append_pair("access_type", "offline")
                    .append_pair("prompt", "consent");
            }
        }

        Ok(url.into())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Tokens granted by a provider, with an absolute expiry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: u64,
}

impl TokenGrant {
    pub(crate) fn from_response(response: TokenResponse, now_unix_secs: u64) -> Self {
        let lifetime = response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: now_unix_secs.saturating_add(lifetime),
        }
    }
}
