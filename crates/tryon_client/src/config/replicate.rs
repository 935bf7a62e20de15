//! Credential and endpoint settings for the Replicate prediction API

use std::env;
use std::fmt;

/// Environment variable holding the API credential
pub const API_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";
/// Environment variable overriding the API base URL
pub const API_BASE_ENV: &str = "REPLICATE_API_BASE";
/// Default API base URL
pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";

/// Provider settings shared by both clients
#[derive(Clone, PartialEq, Eq)]
pub struct ReplicateConfig {
    pub api_token: Option<String>,
    pub api_base: String,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ReplicateConfig {
    /// Create a config with no credential and the default endpoint
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the credential and endpoint from the process environment
    pub fn from_env() -> Self {
        let config = Self {
            api_token: env::var(API_TOKEN_ENV).ok(),
            ..Default::default()
        };

        match env::var(API_BASE_ENV) {
            Ok(base) => config.with_api_base(base),
            Err(_) => config,
        }
    }

    /// Set the API token
    pub fn with_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    /// Set the API base URL; blank values keep the current one
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        let trimmed = api_base.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.api_base = trimmed.to_string();
        }
        self
    }

    /// The credential, if one is set and non-blank
    pub fn credential(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }
}

impl fmt::Debug for ReplicateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicateConfig")
            .field("api_token", &self.credential().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .finish()
    }
}
