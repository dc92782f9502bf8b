//! Forced logout configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoutConfig {
    /// Session cookie deleted on forced logout, none to skip
    /// Env: SHIBGATE_SESSION_COOKIE
    pub session_cookie: Option<String>,

    /// Path of the session cookie
    /// Default: "/"
    pub cookie_path: String,
}

impl Default for LogoutConfig {
    fn default() -> Self {
        Self { session_cookie: None, cookie_path: "/".to_string() }
    }
}

impl LogoutConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(name) = env::var("SHIBGATE_SESSION_COOKIE") {
            self.session_cookie = Some(name);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.session_cookie {
            if name.is_empty() || name.contains(['=', ';', ' ']) {
                bail!("Invalid session_cookie name: '{}'", name);
            }
        }
        Ok(())
    }
}
