//! Login entry point configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Placeholder substituted with the encoded return path
pub const TARGET_PLACEHOLDER: &str = "{0}";

/// Default SP login handler
pub const DEFAULT_LOGIN_URL: &str = "/Shibboleth.sso/Login?target={0}";

/// Default path the SP sends the browser back to after login
pub const DEFAULT_SECURITY_CHECK_PATH: &str = "/shibboleth_native_sp_security_check";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPointConfig {
    /// SP login URL template, must contain `{0}` once
    /// Env: SHIBGATE_LOGIN_URL
    /// Default: "/Shibboleth.sso/Login?target={0}"
    pub login_url: String,

    /// Path that triggers authentication and is used as login return target
    /// Env: SHIBGATE_SECURITY_CHECK_PATH
    /// Default: "/shibboleth_native_sp_security_check"
    pub security_check_path: String,
}

impl Default for EntryPointConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            security_check_path: DEFAULT_SECURITY_CHECK_PATH.to_string(),
        }
    }
}

impl EntryPointConfig {
    pub fn merge(&mut self, other: Self) {
        self.login_url = other.login_url;
        self.security_check_path = other.security_check_path;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(url) = env::var("SHIBGATE_LOGIN_URL") {
            self.login_url = url;
        }
        if let Ok(path) = env::var("SHIBGATE_SECURITY_CHECK_PATH") {
            self.security_check_path = path;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.login_url.is_empty() {
            bail!("login_url must be specified");
        }
        if self.login_url.matches(TARGET_PLACEHOLDER).count() != 1 {
            bail!("login_url must contain the {} placeholder exactly once", TARGET_PLACEHOLDER);
        }
        if !self.security_check_path.starts_with('/') {
            bail!("security_check_path must be an absolute path");
        }
        Ok(())
    }
}
