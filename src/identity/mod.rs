//! Identity providers: OAuth code exchange and profile-to-user mapping.
//!
//! Each provider implements [`IdentityProvider`], turning an authorization
//! code into a provider-specific [`ProviderProfile`].
//! [`ProviderProfile::into_user`] maps any profile onto the
//! provider-neutral [`OAuthUser`]. Providers are looked up by
//! [`ProviderKind`] in the [`IdentityProviders`] registry.

pub mod facebook;
pub mod github;
pub mod registry;

use std::fmt::{self, Debug};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ReportsError;

pub use facebook::FacebookProvider;
pub use github::GithubProvider;
pub use registry::IdentityProviders;

/// Supported OAuth providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// GitHub OAuth app.
    Github,
    /// Facebook login.
    Facebook,
}

impl ProviderKind {
    /// Returns the lowercase provider name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Facebook => "facebook",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ReportsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Self::Github),
            "facebook" => Ok(Self::Facebook),
            _ => Err(ReportsError::UnknownProvider(s.to_string())),
        }
    }
}

/// Profile fields returned by GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GithubProfile {
    /// Numeric GitHub user id, as text.
    pub id: String,
    /// Full display name, if the user set one.
    pub display_name: Option<String>,
    /// Email addresses, primary first.
    pub emails: Vec<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

/// Profile fields returned by Facebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FacebookProfile {
    /// App-scoped Facebook user id.
    pub id: String,
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
    /// Email addresses.
    pub emails: Vec<String>,
    /// Large profile picture URL.
    pub picture_url: Option<String>,
}

/// Raw profile as returned by a specific provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ProviderProfile {
    /// GitHub profile.
    Github(GithubProfile),
    /// Facebook profile.
    Facebook(FacebookProfile),
}

/// Provider-neutral user derived from a [`ProviderProfile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OAuthUser {
    /// Provider the user signed in with.
    pub provider: ProviderKind,
    /// User id at that provider.
    pub provider_id: String,
    /// First email address, if the provider shared one.
    pub email: Option<String>,
    /// First name (empty if unknown).
    pub first_name: String,
    /// Last name (empty if unknown).
    pub last_name: String,
    /// Profile picture URL.
    pub profile_picture: Option<String>,
}

impl ProviderProfile {
    /// Returns the provider this profile came from.
    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        match self {
            Self::Github(_) => ProviderKind::Github,
            Self::Facebook(_) => ProviderKind::Facebook,
        }
    }

    /// Maps the profile onto an [`OAuthUser`].
    ///
    /// GitHub only exposes a display name: the text before the first space
    /// becomes the first name and the rest, re-joined with spaces, the last
    /// name. Facebook provides given and family names directly.
    #[must_use]
    pub fn into_user(self) -> OAuthUser {
        match self {
            Self::Github(profile) => {
                let (first_name, last_name) = split_display_name(profile.display_name.as_deref());
                OAuthUser {
                    provider: ProviderKind::Github,
                    provider_id: profile.id,
                    email: profile.emails.into_iter().next(),
                    first_name,
                    last_name,
                    profile_picture: profile.avatar_url,
                }
            }
            Self::Facebook(profile) => OAuthUser {
                provider: ProviderKind::Facebook,
                provider_id: profile.id,
                email: profile.emails.into_iter().next(),
                first_name: profile.given_name.unwrap_or_default(),
                last_name: profile.family_name.unwrap_or_default(),
                profile_picture: profile.picture_url,
            },
        }
    }
}

fn split_display_name(display_name: Option<&str>) -> (String, String) {
    let Some(name) = display_name else {
        return (String::new(), String::new());
    };
    let mut parts = name.split(' ');
    let first = parts.next().unwrap_or_default().to_string();
    let rest: Vec<&str> = parts.collect();
    (first, rest.join(" "))
}

/// A provider able to exchange an OAuth authorization code for the
/// signed-in user's profile.
#[async_trait]
pub trait IdentityProvider: Send + Sync + Debug {
    /// Which provider this is.
    fn kind(&self) -> ProviderKind;

    /// Exchanges `code` for an access token and fetches the profile.
    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, ReportsError>;
}

/// Maps a `reqwest` failure onto [`ReportsError::IdentityProviderError`].
/// Builds the HTTP client a provider uses, bounded by `timeout`.
pub(crate) fn http_client(kind: ProviderKind, timeout: Duration) -> Result<Client, ReportsError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| provider_error(kind, "client setup", e))
}

pub(crate) fn provider_error(kind: ProviderKind, step: &str, err: impl fmt::Display) -> ReportsError {
    ReportsError::IdentityProviderError(format!("{kind} {step}: {err}"))
}
