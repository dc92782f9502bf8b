//! Configuration system for Shibgate
//!
//! Configuration values are resolved in the following order (highest priority wins):
//!
//! 1. **Environment Variables** (`SHIBGATE_*`)
//! 2. **Config File** (shibgate.toml)
//! 3. **Defaults**
//!
//! The attribute names have no defaults and must come from the file or the
//! environment; [`ShibgateConfig::validate`] refuses to start without them.
//!
//! # Example
//!
//! ```toml
//! [attributes]
//! principal_attribute = "eppn"
//! authentication_method_attribute = "Shib-Authentication-Method"
//! identity_provider_attribute = "Shib-Identity-Provider"
//! authentication_instant_attribute = "Shib-Authentication-Instant"
//! extra_attributes = ["mail", "displayName"]
//!
//! [policy]
//! identity_provider_allowed = ["https://idp.example.edu/idp/shibboleth"]
//! authentication_method_allowed = []
//! ```

pub mod attributes;
pub mod entry_point;
pub mod headers;
pub mod logging;
pub mod logout;
pub mod policy;
pub mod users;

pub use attributes::AttributesConfig;
pub use entry_point::EntryPointConfig;
pub use headers::HeaderNamesConfig;
pub use logging::LoggingConfig;
pub use logout::LogoutConfig;
pub use policy::PolicyConfig;
pub use users::UserEntry;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete Shibgate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShibgateConfig {
    pub attributes: AttributesConfig,
    pub policy: PolicyConfig,
    pub entry_point: EntryPointConfig,
    pub headers: HeaderNamesConfig,
    pub logout: LogoutConfig,
    pub logging: LoggingConfig,
    pub users: Vec<UserEntry>,
}

impl ShibgateConfig {
    /// Load configuration from `shibgate.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("shibgate.toml")
    }

    /// Load configuration with full supersedence chain
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.attributes.merge(other.attributes);
        self.policy.merge(other.policy);
        self.entry_point.merge(other.entry_point);
        self.headers.merge(other.headers);
        self.logout.merge(other.logout);
        self.logging.merge(other.logging);
        self.users = other.users;
    }

    /// Apply environment variables to configuration
    pub fn apply_env_vars(&mut self) {
        self.attributes.apply_env_vars();
        self.policy.apply_env_vars();
        self.entry_point.apply_env_vars();
        self.headers.apply_env_vars();
        self.logout.apply_env_vars();
        self.logging.apply_env_vars();
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.attributes.validate()?;
        self.policy.validate()?;
        self.entry_point.validate()?;
        self.headers.validate()?;
        self.logout.validate()?;
        self.logging.validate()?;
        users::validate_users(&self.users)?;
        Ok(())
    }
}

/// Split a comma-separated environment value, dropping blanks
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [attributes]
        principal_attribute = "eppn"
        authentication_method_attribute = "Shib-Authentication-Method"
        identity_provider_attribute = "Shib-Identity-Provider"
        authentication_instant_attribute = "Shib-Authentication-Instant"
        extra_attributes = ["mail"]

        [policy]
        identity_provider_allowed = ["idp.example.edu"]

        [logout]
        session_cookie = "JSESSIONID"

        [[users]]
        eppn = "jdoe@example.edu"
        username = "jdoe"
        authorities = ["ROLE_USER"]
    "#;

    #[test]
    fn test_default_config_is_incomplete() {
        let config = ShibgateConfig::default();
        assert!(config.validate().is_err());
        assert_eq!(config.entry_point.login_url, "/Shibboleth.sso/Login?target={0}");
        assert!(config.policy.identity_provider_allowed.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let config = ShibgateConfig::from_toml(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.attributes.principal_attribute.as_deref(), Some("eppn"));
        assert_eq!(config.policy.identity_provider_allowed, vec!["idp.example.edu"]);
        assert!(config.policy.authentication_method_allowed.is_empty());
        assert_eq!(config.logout.session_cookie.as_deref(), Some("JSESSIONID"));
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.headers.remote_user, "REMOTE_USER");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shibgate.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ShibgateConfig::load_from(&path).unwrap();
        assert_eq!(
            config.attributes.identity_provider_attribute.as_deref(),
            Some("Shib-Identity-Provider")
        );
        assert_eq!(config.attributes.extra_attributes, Some(vec!["mail".to_string()]));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShibgateConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.entry_point.security_check_path, "/shibboleth_native_sp_security_check");
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[attributes\nprincipal_attribute = ").unwrap();

        let err = ShibgateConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
