//! Attribute extraction
//!
//! Turns the attributes the SP forwarded on a request into an [`IdentityToken`].

use crate::config::AttributesConfig;
use crate::error::{Result, ShibbolethError};
use crate::request::PreAuthRequest;
use crate::token::{IdentityToken, SHIBBOLETH_AUTH_TYPE};
use std::collections::HashMap;

/// Why a request carries no Shibboleth session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoSessionReason {
    RemoteUserMissing,
    RemoteUserEmpty,
    AuthTypeMissing,
    AuthTypeNotShibboleth,
}

impl std::fmt::Display for NoSessionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            NoSessionReason::RemoteUserMissing => "remoteUser is null",
            NoSessionReason::RemoteUserEmpty => "remoteUser is empty",
            NoSessionReason::AuthTypeMissing => "authType is null",
            NoSessionReason::AuthTypeNotShibboleth => "authType is not 'shibboleth'",
        };
        f.write_str(reason)
    }
}

/// Identity attributes of a live request, re-read for consistency checks.
///
/// Method and provider default to an empty string; principal and type stay
/// `None` when the request does not carry them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveClaims {
    pub principal_name: Option<String>,
    pub authentication_type: Option<String>,
    pub authentication_method: String,
    pub identity_provider: String,
}

/// Produces identity tokens from inbound requests
pub trait AttributeExtractor: Send + Sync {
    /// Build a token, or `None` when the request has no Shibboleth session
    fn extract(&self, request: &dyn PreAuthRequest) -> Option<IdentityToken>;

    /// Read the identity attributes without the no-session early exit
    fn live_claims(&self, request: &dyn PreAuthRequest) -> LiveClaims;
}

/// Validated attribute names, immutable after startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMapping {
    pub principal: String,
    pub authentication_method: String,
    pub identity_provider: String,
    pub authentication_instant: String,
    pub extra: Vec<String>,
}

impl AttributeMapping {
    /// Build the mapping, failing when any attribute setting is unset
    pub fn from_config(config: &AttributesConfig) -> Result<Self> {
        config.validate().map_err(|e| ShibbolethError::Configuration(e.to_string()))?;

        let required = |value: &Option<String>| value.clone().unwrap_or_default();
        Ok(Self {
            principal: required(&config.principal_attribute),
            authentication_method: required(&config.authentication_method_attribute),
            identity_provider: required(&config.identity_provider_attribute),
            authentication_instant: required(&config.authentication_instant_attribute),
            extra: config.extra_attributes.clone().unwrap_or_default(),
        })
    }
}

/// Extractor for attributes set by the Shibboleth native SP
#[derive(Debug, Clone)]
pub struct ShibbolethExtractor {
    mapping: AttributeMapping,
}

impl ShibbolethExtractor {
    pub fn new(mapping: AttributeMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &AttributeMapping {
        &self.mapping
    }

    /// First failing no-session check, in evaluation order
    pub fn no_session_reason(&self, request: &dyn PreAuthRequest) -> Option<NoSessionReason> {
        let remote_user = self.principal_name(request);
        match remote_user.as_deref() {
            None => return Some(NoSessionReason::RemoteUserMissing),
            Some("") => return Some(NoSessionReason::RemoteUserEmpty),
            Some(_) => {}
        }
        match request.auth_type() {
            None => Some(NoSessionReason::AuthTypeMissing),
            Some(auth_type) if auth_type != SHIBBOLETH_AUTH_TYPE => {
                Some(NoSessionReason::AuthTypeNotShibboleth)
            }
            Some(_) => None,
        }
    }

    /// REMOTE_USER, overridden by the principal attribute when present
    fn principal_name(&self, request: &dyn PreAuthRequest) -> Option<String> {
        request
            .attribute(&self.mapping.principal)
            .or_else(|| request.remote_user())
            .map(str::to_string)
    }

    fn attribute_or_empty(request: &dyn PreAuthRequest, name: &str) -> String {
        request.attribute(name).unwrap_or_default().to_string()
    }

    fn extra_attributes(&self, request: &dyn PreAuthRequest) -> HashMap<String, String> {
        self.mapping
            .extra
            .iter()
            .filter_map(|name| request.attribute(name).map(|v| (name.clone(), v.to_string())))
            .collect()
    }
}

impl AttributeExtractor for ShibbolethExtractor {
    fn extract(&self, request: &dyn PreAuthRequest) -> Option<IdentityToken> {
        if let Some(reason) = self.no_session_reason(request) {
            log::debug!("{}. No valid shibboleth session found.", reason);
            return None;
        }

        let principal_name = self.principal_name(request).unwrap_or_default();
        let authentication_type = request.auth_type().unwrap_or_default();

        log::debug!("building a shibboleth token for '{}'", principal_name);

        let mut token = IdentityToken::new(
            principal_name,
            authentication_type,
            Self::attribute_or_empty(request, &self.mapping.authentication_method),
            Self::attribute_or_empty(request, &self.mapping.identity_provider),
            Self::attribute_or_empty(request, &self.mapping.authentication_instant),
        )
        .with_extra_attributes(self.extra_attributes(request));

        if let Some(addr) = request.remote_addr() {
            token = token.with_remote_address(addr);
        }

        Some(token)
    }

    fn live_claims(&self, request: &dyn PreAuthRequest) -> LiveClaims {
        LiveClaims {
            principal_name: self.principal_name(request),
            authentication_type: request.auth_type().map(str::to_string),
            authentication_method: Self::attribute_or_empty(
                request,
                &self.mapping.authentication_method,
            ),
            identity_provider: Self::attribute_or_empty(request, &self.mapping.identity_provider),
        }
    }
}
