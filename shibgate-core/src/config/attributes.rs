//! Attribute name configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

use super::split_list;

/// Names of the request attributes the SP populates.
///
/// None of these have defaults: the attribute names depend on the SP's
/// `attribute-map.xml`, so every deployment must spell them out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributesConfig {
    /// Attribute overriding REMOTE_USER as principal name (e.g. "eppn")
    /// Env: SHIBGATE_PRINCIPAL_ATTRIBUTE
    pub principal_attribute: Option<String>,

    /// Attribute carrying the authentication method
    /// Env: SHIBGATE_METHOD_ATTRIBUTE
    pub authentication_method_attribute: Option<String>,

    /// Attribute carrying the asserting identity provider
    /// Env: SHIBGATE_PROVIDER_ATTRIBUTE
    pub identity_provider_attribute: Option<String>,

    /// Attribute carrying the authentication instant
    /// Env: SHIBGATE_INSTANT_ATTRIBUTE
    pub authentication_instant_attribute: Option<String>,

    /// Additional attributes copied into the token when present
    /// Env: SHIBGATE_EXTRA_ATTRIBUTES (comma-separated, may be empty)
    pub extra_attributes: Option<Vec<String>>,
}

impl AttributesConfig {
    /// Merge another config into this one (other takes priority when set)
    pub fn merge(&mut self, other: Self) {
        if other.principal_attribute.is_some() {
            self.principal_attribute = other.principal_attribute;
        }
        if other.authentication_method_attribute.is_some() {
            self.authentication_method_attribute = other.authentication_method_attribute;
        }
        if other.identity_provider_attribute.is_some() {
            self.identity_provider_attribute = other.identity_provider_attribute;
        }
        if other.authentication_instant_attribute.is_some() {
            self.authentication_instant_attribute = other.authentication_instant_attribute;
        }
        if other.extra_attributes.is_some() {
            self.extra_attributes = other.extra_attributes;
        }
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(name) = env::var("SHIBGATE_PRINCIPAL_ATTRIBUTE") {
            self.principal_attribute = Some(name);
        }
        if let Ok(name) = env::var("SHIBGATE_METHOD_ATTRIBUTE") {
            self.authentication_method_attribute = Some(name);
        }
        if let Ok(name) = env::var("SHIBGATE_PROVIDER_ATTRIBUTE") {
            self.identity_provider_attribute = Some(name);
        }
        if let Ok(name) = env::var("SHIBGATE_INSTANT_ATTRIBUTE") {
            self.authentication_instant_attribute = Some(name);
        }
        if let Ok(names) = env::var("SHIBGATE_EXTRA_ATTRIBUTES") {
            self.extra_attributes = Some(split_list(&names));
        }
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("principal_attribute", &self.principal_attribute),
            ("authentication_method_attribute", &self.authentication_method_attribute),
            ("identity_provider_attribute", &self.identity_provider_attribute),
            ("authentication_instant_attribute", &self.authentication_instant_attribute),
        ];
        for (setting, value) in required {
            match value {
                None => bail!("{} cannot be null", setting),
                Some(name) if name.is_empty() => bail!("{} cannot be empty", setting),
                Some(_) => {}
            }
        }

        if self.extra_attributes.is_none() {
            bail!("extra_attributes cannot be null");
        }

        Ok(())
    }
}
