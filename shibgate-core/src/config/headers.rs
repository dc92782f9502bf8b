//! Forwarded header names

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Header names used when the SP forwards assertions as HTTP headers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderNamesConfig {
    /// Env: SHIBGATE_REMOTE_USER_HEADER
    /// Default: "REMOTE_USER"
    pub remote_user: String,

    /// Env: SHIBGATE_AUTH_TYPE_HEADER
    /// Default: "AUTH_TYPE"
    pub auth_type: String,

    /// Default: "X-Forwarded-For"
    pub remote_addr: String,

    /// Prefix prepended to attribute names (e.g. "X-Shib-")
    /// Default: ""
    pub attribute_prefix: String,

    /// Path the application is mounted under
    /// Default: ""
    pub context_path: String,
}

impl Default for HeaderNamesConfig {
    fn default() -> Self {
        Self {
            remote_user: "REMOTE_USER".to_string(),
            auth_type: "AUTH_TYPE".to_string(),
            remote_addr: "X-Forwarded-For".to_string(),
            attribute_prefix: String::new(),
            context_path: String::new(),
        }
    }
}

impl HeaderNamesConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(name) = env::var("SHIBGATE_REMOTE_USER_HEADER") {
            self.remote_user = name;
        }
        if let Ok(name) = env::var("SHIBGATE_AUTH_TYPE_HEADER") {
            self.auth_type = name;
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (setting, name) in [
            ("remote_user", &self.remote_user),
            ("auth_type", &self.auth_type),
            ("remote_addr", &self.remote_addr),
        ] {
            if http::HeaderName::from_bytes(name.as_bytes()).is_err() {
                bail!("Invalid header name for {}: '{}'", setting, name);
            }
        }
        if !self.context_path.is_empty() && !self.context_path.starts_with('/') {
            bail!("context_path must be empty or start with '/'");
        }
        if self.context_path.chars().any(char::is_control) {
            bail!("context_path must not contain control characters");
        }
        Ok(())
    }
}
