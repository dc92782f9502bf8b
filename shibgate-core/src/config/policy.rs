//! Access policy configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

use super::split_list;

/// Identity provider and authentication method allow-lists.
///
/// An empty list means unrestricted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Accepted identity providers (entity IDs)
    /// Env: SHIBGATE_ALLOWED_PROVIDERS (comma-separated)
    pub identity_provider_allowed: Vec<String>,

    /// Accepted authentication methods (e.g. "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport")
    /// Env: SHIBGATE_ALLOWED_METHODS (comma-separated)
    pub authentication_method_allowed: Vec<String>,
}

impl PolicyConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(providers) = env::var("SHIBGATE_ALLOWED_PROVIDERS") {
            self.identity_provider_allowed = split_list(&providers);
        }
        if let Ok(methods) = env::var("SHIBGATE_ALLOWED_METHODS") {
            self.authentication_method_allowed = split_list(&methods);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.identity_provider_allowed.iter().any(String::is_empty) {
            bail!("identity_provider_allowed contains an empty entry");
        }
        if self.authentication_method_allowed.iter().any(String::is_empty) {
            bail!("authentication_method_allowed contains an empty entry");
        }
        Ok(())
    }
}
