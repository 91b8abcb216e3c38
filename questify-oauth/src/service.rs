use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use reqwest::Client;
use tracing::debug;

use questify_database::model::calendar::{CalendarProvider, ImportedEvent};
use questify_utils::time::{now_unix_secs, to_rfc3339_z, window_around};

use crate::events::{GoogleEventList, GraphEventList, from_google, from_graph};
use crate::provider::{ProviderConfig, TokenGrant, TokenResponse};

const HTTP_TIMEOUT: Duration = Duration::from_secs(20);
const GOOGLE_EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";
const GRAPH_EVENTS_URL: &str = "https://graph.microsoft.com/v1.0/me/events";
const SYNC_DAYS_BACK: i64 = 30;
const SYNC_DAYS_AHEAD: i64 = 90;
const GRAPH_PAGE_SIZE: &str = "100";

/// Calendar OAuth clients for every configured provider.
#[derive(Clone, Debug)]
pub struct OAuthService {
    http: Client,
    google: Option<ProviderConfig>,
    microsoft: Option<ProviderConfig>,
}

impl OAuthService {
    pub fn new(
        google: Option<ProviderConfig>,
        microsoft: Option<ProviderConfig>,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build oauth http client")?;

        Ok(Self {
            http,
            google,
            microsoft,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(
            ProviderConfig::from_env_optional(CalendarProvider::Google),
            ProviderConfig::from_env_optional(CalendarProvider::Microsoft),
        )
    }

    pub fn provider(&self, provider: CalendarProvider) -> Option<&ProviderConfig> {
        match provider {
            CalendarProvider::Google => self.google.as_ref(),
            CalendarProvider::Microsoft => self.microsoft.as_ref(),
        }
    }

    pub fn enabled_providers(&self) -> Vec<CalendarProvider> {
        [CalendarProvider::Google, CalendarProvider::Microsoft]
            .into_iter()
            .filter(|provider| self.provider(*provider).is_some())
            .collect()
    }

    fn require(&self, provider: CalendarProvider) -> anyhow::Result<&ProviderConfig> {
        self.provider(provider)
            .ok_or_else(|| anyhow::anyhow!("{provider} calendar integration is not configured"))
    }

    /// Trade an authorization code and its PKCE verifier for tokens.
    pub async fn exchange_code(
        &self,
        provider: CalendarProvider,
        code: &str,
        verifier: &str,
    ) -> anyhow::Result<TokenGrant> {
        let config = self.require(provider)?;
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code_verifier", verifier),
        ];

        self.request_token(config, &form).await
    }

    pub async fn refresh(
        &self,
        provider: CalendarProvider,
        refresh_token: &str,
    ) -> anyhow::Result<TokenGrant> {
        let config = self.require(provider)?;
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
        ];

        self.request_token(config, &form).await
    }

    async fn request_token(
        &self,
        config: &ProviderConfig,
        form: &[(&str, &str)],
    ) -> anyhow::Result<TokenGrant> {
        let response = self
            .http
            .post(config.token_url)
            .form(form)
            .send()
            .await
            .with_context(|| format!("{} token request failed", config.provider))?
            .error_for_status()
            .with_context(|| format!("{} token endpoint rejected the request", config.provider))?;

        let body: TokenResponse = response
            .json()
            .await
            .with_context(|| format!("{} token response was malformed", config.provider))?;

        debug!(provider = %config.provider, "token granted");
        Ok(TokenGrant::from_response(body, now_unix_secs()))
    }

    /// Fetch upcoming (and recent) events from the provider's primary calendar.
    pub async fn fetch_events(
        &self,
        provider: CalendarProvider,
        access_token: &str,
    ) -> anyhow::Result<Vec<ImportedEvent>> {
        match provider {
            CalendarProvider::Google => {
                let (time_min, time_max) = window_around(Utc::now(), SYNC_DAYS_BACK, SYNC_DAYS_AHEAD);
                let list: GoogleEventList = self
                    .http
                    .get(GOOGLE_EVENTS_URL)
                    .bearer_auth(access_token)
                    .query(&[
                        ("timeMin", to_rfc3339_z(time_min)),
                        ("timeMax", to_rfc3339_z(time_max)),
                        ("singleEvents", "true".to_owned()),
                        ("orderBy", "startTime".to_owned()),
                    ])
                    .send()
                    .await
                    .context("google events request failed")?
                    .error_for_status()
                    .context("google events request was rejected")?
                    .json()
                    .await
                    .context("google events response was malformed")?;

                Ok(from_google(list))
            }
            CalendarProvider::Microsoft => {
                let list: GraphEventList = self
                    .http
                    .get(GRAPH_EVENTS_URL)
                    .bearer_auth(access_token)
                    .query(&[("$orderby", "start/dateTime"), ("$top", GRAPH_PAGE_SIZE)])
                    .send()
                    .await
                    .context("graph events request failed")?
                    .error_for_status()
                    .context("graph events request was rejected")?
                    .json()
                    .await
                    .context("graph events response was malformed")?;

                Ok(from_graph(list))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OAuthService;
    use crate::provider::ProviderConfig;
    use questify_database::model::calendar::CalendarProvider;

    #[test]
    fn only_configured_providers_are_enabled() {
        let google = ProviderConfig::new(CalendarProvider::Google, "id", "secret", "http://x/cb");
        let service = OAuthService::new(Some(google), None).unwrap();

        assert_eq!(service.enabled_providers(), vec![CalendarProvider::Google]);
        assert!(service.provider(CalendarProvider::Microsoft).is_none());
    }

    #[tokio::test]
    async fn unconfigured_provider_refuses_exchange() {
        let service = OAuthService::new(None, None).unwrap();
        let err = service
            .exchange_code(CalendarProvider::Microsoft, "code", "verifier")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not configured"));
    }
}
