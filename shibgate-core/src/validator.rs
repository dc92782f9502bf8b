//! Policy gate for extracted identity tokens
//!
//! [`ShibbolethValidator`] checks a token in a fixed order and stops at the
//! first failure:
//!
//! 1. non-Shibboleth authentications pass through untouched
//! 2. the token is complete and carries the trusted authentication type
//! 3. the identity provider is allowed
//! 4. the authentication method is allowed
//! 5. the principal is resolved through the [`UserDetailsService`]
//!
//! The input is never modified; a validated copy is returned.

use crate::config::PolicyConfig;
use crate::error::{CredentialError, Result, ShibbolethError};
use crate::principal::Principal;
use crate::token::{Authentication, IdentityToken, SHIBBOLETH_AUTH_TYPE};
use crate::user_details::UserDetailsService;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Identity provider and authentication method allow-lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    identity_providers: BTreeSet<String>,
    authentication_methods: BTreeSet<String>,
}

impl AccessPolicy {
    /// Policy that accepts any provider and method
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            identity_providers: config.identity_provider_allowed.iter().cloned().collect(),
            authentication_methods: config.authentication_method_allowed.iter().cloned().collect(),
        }
    }

    pub fn allow_provider(mut self, provider: impl Into<String>) -> Self {
        self.identity_providers.insert(provider.into());
        self
    }

    pub fn allow_method(mut self, method: impl Into<String>) -> Self {
        self.authentication_methods.insert(method.into());
        self
    }

    pub fn provider_allowed(&self, provider: &str) -> bool {
        self.identity_providers.is_empty() || self.identity_providers.contains(provider)
    }

    pub fn method_allowed(&self, method: &str) -> bool {
        self.authentication_methods.is_empty() || self.authentication_methods.contains(method)
    }
}

/// Turns an authentication into a validated one, or rejects it
pub trait AuthenticationValidator: Send + Sync {
    fn validate(&self, authentication: &Authentication) -> Result<Authentication>;
}

/// Validator for tokens issued from Shibboleth attributes
pub struct ShibbolethValidator {
    policy: AccessPolicy,
    user_details: Arc<dyn UserDetailsService>,
}

impl ShibbolethValidator {
    pub fn new(policy: AccessPolicy, user_details: Arc<dyn UserDetailsService>) -> Self {
        Self { policy, user_details }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    fn check_complete(token: &IdentityToken) -> std::result::Result<(), CredentialError> {
        if token.authentication_type() != SHIBBOLETH_AUTH_TYPE {
            return Err(CredentialError::InvalidAuthenticationType {
                expected: SHIBBOLETH_AUTH_TYPE,
                actual: token.authentication_type().to_string(),
            });
        }

        let required = [
            ("principal_name", token.principal_name()),
            ("identity_provider", token.identity_provider()),
            ("authentication_instant", token.authentication_instant()),
            ("authentication_method", token.authentication_method()),
        ];
        match required.iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(CredentialError::MissingAttribute { field: *field }),
            None => Ok(()),
        }
    }

    fn check_policy(&self, token: &IdentityToken) -> std::result::Result<(), CredentialError> {
        if !self.policy.provider_allowed(token.identity_provider()) {
            return Err(CredentialError::IdentityProviderNotAllowed {
                provider: token.identity_provider().to_string(),
            });
        }
        if !self.policy.method_allowed(token.authentication_method()) {
            return Err(CredentialError::AuthenticationMethodNotAllowed {
                method: token.authentication_method().to_string(),
            });
        }
        Ok(())
    }

    fn validate_token(&self, token: &IdentityToken) -> Result<IdentityToken> {
        Self::check_complete(token)
            .and_then(|_| self.check_policy(token))
            .inspect_err(|cause| {
                log::warn!("Rejected shibboleth token for '{}': {}", token.principal_name(), cause)
            })?;

        let profile =
            self.user_details.load_user_details(token).map_err(ShibbolethError::UserDetails)?;

        let validated = match profile {
            Some(profile) => {
                let authorities = profile.authorities.clone();
                token.validated(Principal::Profile(profile), authorities)
            }
            None => token.validated(
                Principal::Name(token.principal_name().to_string()),
                token.authorities().clone(),
            ),
        };

        log::debug!(
            "Validated '{}' from {} with {} authorities",
            validated.principal_name(),
            validated.identity_provider(),
            validated.authorities().len()
        );

        Ok(validated)
    }
}

impl AuthenticationValidator for ShibbolethValidator {
    fn validate(&self, authentication: &Authentication) -> Result<Authentication> {
        match authentication {
            Authentication::Shibboleth(token) => {
                self.validate_token(token).map(Authentication::Shibboleth)
            }
            other => Ok(other.clone()),
        }
    }
}
