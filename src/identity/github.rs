//! GitHub OAuth app.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

use super::{
    GithubProfile, IdentityProvider, ProviderKind, ProviderProfile, http_client, provider_error,
};
use crate::config::OAuthClientConfig;
use crate::error::ReportsError;

const DEFAULT_OAUTH_BASE: &str = "https://github.com";
const DEFAULT_API_BASE: &str = "https://api.github.com";
const CLIENT_USER_AGENT: &str = concat!("courtside-reports/", env!("CARGO_PKG_VERSION"));

/// GitHub implementation of [`IdentityProvider`].
///
/// Requests the `user:email` scope's data: the profile from `/user` and
/// the address list from `/user/emails`, falling back to the profile's
/// public email when the list is unavailable.
#[derive(Debug, Clone)]
pub struct GithubProvider {
    client: Client,
    credentials: OAuthClientConfig,
    oauth_base: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: u64,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
}

impl GithubProvider {
    /// Creates a provider talking to github.com.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::IdentityProviderError`] if the HTTP client
    /// cannot be built.
    pub fn new(credentials: OAuthClientConfig, timeout: Duration) -> Result<Self, ReportsError> {
        Self::with_endpoints(credentials, timeout, DEFAULT_OAUTH_BASE, DEFAULT_API_BASE)
    }

    /// Creates a provider with custom OAuth and REST API base URLs
    /// (GitHub Enterprise, or a test server).
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::IdentityProviderError`] if the HTTP client
    /// cannot be built.
    pub fn with_endpoints(
        credentials: OAuthClientConfig,
        timeout: Duration,
        oauth_base: &str,
        api_base: &str,
    ) -> Result<Self, ReportsError> {
        Ok(Self {
            client: http_client(ProviderKind::Github, timeout)?,
            credentials,
            oauth_base: oauth_base.trim_end_matches('/').to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn access_token(&self, code: &str) -> Result<String, ReportsError> {
        let response: TokenResponse = self
            .client
            .post(format!("{}/login/oauth/access_token", self.oauth_base))
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.credentials.callback_url.as_str()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| provider_error(ProviderKind::Github, "token exchange", e))?
            .json()
            .await
            .map_err(|e| provider_error(ProviderKind::Github, "token response", e))?;

        match (response.access_token, response.error) {
            (Some(token), None) => Ok(token),
            (_, error) => Err(provider_error(
                ProviderKind::Github,
                "token exchange",
                response
                    .error_description
                    .or(error)
                    .unwrap_or_else(|| "no access token returned".to_string()),
            )),
        }
    }

    async fn api_get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, reqwest::Error> {
        self.client
            .get(format!("{}{path}", self.api_base))
            .bearer_auth(token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl IdentityProvider for GithubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Github
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, ReportsError> {
        let token = self.access_token(code).await?;
        let user: GithubUser = self
            .api_get("/user", &token)
            .await
            .map_err(|e| provider_error(ProviderKind::Github, "profile", e))?;

        let emails = match self.api_get::<Vec<GithubEmail>>("/user/emails", &token).await {
            Ok(mut list) => {
                list.sort_by_key(|e| !e.primary);
                list.into_iter().map(|e| e.email).collect()
            }
            Err(e) => {
                tracing::debug!(error = %e, "github email list unavailable; using public email");
                user.email.into_iter().collect()
            }
        };

        tracing::info!(provider_id = user.id, "github profile fetched");
        Ok(ProviderProfile::Github(GithubProfile {
            id: user.id.to_string(),
            display_name: user.name,
            emails,
            avatar_url: user.avatar_url,
        }))
    }
}
