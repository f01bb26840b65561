//! Facebook login via the Graph API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{
    FacebookProfile, IdentityProvider, ProviderKind, ProviderProfile, http_client, provider_error,
};
use crate::config::OAuthClientConfig;
use crate::error::ReportsError;

const DEFAULT_GRAPH_BASE: &str = "https://graph.facebook.com/v19.0";
const PROFILE_FIELDS: &str = "id,email,first_name,last_name,picture.type(large)";

/// Facebook implementation of [`IdentityProvider`].
#[derive(Debug, Clone)]
pub struct FacebookProvider {
    client: Client,
    credentials: OAuthClientConfig,
    graph_base: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GraphUser {
    id: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    picture: Option<Picture>,
}

#[derive(Debug, Deserialize)]
struct Picture {
    data: PictureData,
}

#[derive(Debug, Deserialize)]
struct PictureData {
    url: Option<String>,
}

impl FacebookProvider {
    /// Creates a provider talking to graph.facebook.com.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::IdentityProviderError`] if the HTTP client
    /// cannot be built.
    pub fn new(credentials: OAuthClientConfig, timeout: Duration) -> Result<Self, ReportsError> {
        Self::with_graph_base(credentials, timeout, DEFAULT_GRAPH_BASE)
    }

    /// Creates a provider with a custom Graph API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::IdentityProviderError`] if the HTTP client
    /// cannot be built.
    pub fn with_graph_base(
        credentials: OAuthClientConfig,
        timeout: Duration,
        graph_base: &str,
    ) -> Result<Self, ReportsError> {
        Ok(Self {
            client: http_client(ProviderKind::Facebook, timeout)?,
            credentials,
            graph_base: graph_base.trim_end_matches('/').to_string(),
        })
    }

    async fn access_token(&self, code: &str) -> Result<String, reqwest::Error> {
        let token: TokenResponse = self
            .client
            .get(format!("{}/oauth/access_token", self.graph_base))
            .query(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("redirect_uri", self.credentials.callback_url.as_str()),
                ("code", code),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(token.access_token)
    }

    async fn me(&self, token: &str) -> Result<GraphUser, reqwest::Error> {
        self.client
            .get(format!("{}/me", self.graph_base))
            .query(&[("fields", PROFILE_FIELDS), ("access_token", token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl IdentityProvider for FacebookProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Facebook
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, ReportsError> {
        let token = self
            .access_token(code)
            .await
            .map_err(|e| provider_error(ProviderKind::Facebook, "token exchange", e))?;
        let user = self
            .me(&token)
            .await
            .map_err(|e| provider_error(ProviderKind::Facebook, "profile", e))?;

        tracing::info!(provider_id = %user.id, "facebook profile fetched");
        Ok(ProviderProfile::Facebook(FacebookProfile {
            id: user.id,
            given_name: user.first_name,
            family_name: user.last_name,
            emails: user.email.into_iter().collect(),
            picture_url: user.picture.and_then(|p| p.data.url),
        }))
    }
}
