//! Registry of configured identity providers.

use std::collections::HashMap;
use std::sync::Arc;

use super::{FacebookProvider, GithubProvider, IdentityProvider, ProviderKind};
use crate::config::IdentityConfig;
use crate::error::ReportsError;

/// Identity providers keyed by [`ProviderKind`].
///
/// Only providers with credentials configured are registered; asking for
/// any other name yields [`ReportsError::UnknownProvider`].
#[derive(Debug, Default, Clone)]
pub struct IdentityProviders {
    providers: HashMap<ProviderKind, Arc<dyn IdentityProvider>>,
}

impl IdentityProviders {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every provider that has credentials in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::IdentityProviderError`] if a provider's HTTP
    /// client cannot be built.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, ReportsError> {
        let mut registry = Self::new();
        if let Some(github) = &config.github {
            registry.register(Arc::new(GithubProvider::new(github.clone(), config.timeout)?));
        }
        if let Some(facebook) = &config.facebook {
            registry.register(Arc::new(FacebookProvider::new(
                facebook.clone(),
                config.timeout,
            )?));
        }
        tracing::info!(
            providers = registry.len(),
            timeout_secs = config.timeout.as_secs(),
            "identity providers registered"
        );
        Ok(registry)
    }

    /// Adds or replaces the provider for its [`ProviderKind`].
    pub fn register(&mut self, provider: Arc<dyn IdentityProvider>) {
        self.providers.insert(provider.kind(), provider);
    }

    /// Looks up a provider by name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::UnknownProvider`] if the name is not a
    /// supported provider or that provider is not configured.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn IdentityProvider>, ReportsError> {
        let kind: ProviderKind = name.parse()?;
        self.providers
            .get(&kind)
            .map(Arc::clone)
            .ok_or_else(|| ReportsError::UnknownProvider(name.to_string()))
    }

    /// Returns the configured provider kinds, sorted by name.
    #[must_use]
    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.providers.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns `true` if no provider is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
