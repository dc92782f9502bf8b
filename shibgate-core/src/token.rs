//! Identity token and authentication kinds
//!
//! An [`IdentityToken`] carries the claims forwarded by the Shibboleth SP for one
//! authentication event. It starts out unvalidated when extracted from a request
//! and is replaced by a validated copy once the validator accepts it.

use crate::principal::Principal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Authentication type the native SP sets on requests it vouches for.
///
/// Not configurable: this is the trust mechanism, not a deployment detail.
pub const SHIBBOLETH_AUTH_TYPE: &str = "shibboleth";

static NO_AUTHORITIES: BTreeSet<String> = BTreeSet::new();

/// Validation state of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenState {
    /// Freshly extracted from a request
    Unvalidated,

    /// Accepted by the validator, principal and authorities resolved
    Validated { principal: Principal, authorities: BTreeSet<String> },
}

/// Identity claims for one authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityToken {
    principal_name: String,
    authentication_type: String,
    authentication_method: String,
    identity_provider: String,
    authentication_instant: String,
    remote_address: Option<String>,
    extra_attributes: HashMap<String, String>,
    state: TokenState,
}

impl IdentityToken {
    /// Create an unvalidated token from the five required claims
    pub fn new(
        principal_name: impl Into<String>,
        authentication_type: impl Into<String>,
        authentication_method: impl Into<String>,
        identity_provider: impl Into<String>,
        authentication_instant: impl Into<String>,
    ) -> Self {
        Self {
            principal_name: principal_name.into(),
            authentication_type: authentication_type.into(),
            authentication_method: authentication_method.into(),
            identity_provider: identity_provider.into(),
            authentication_instant: authentication_instant.into(),
            remote_address: None,
            extra_attributes: HashMap::new(),
            state: TokenState::Unvalidated,
        }
    }

    pub fn with_remote_address(mut self, remote_address: impl Into<String>) -> Self {
        self.remote_address = Some(remote_address.into());
        self
    }

    pub fn with_extra_attributes(mut self, extra_attributes: HashMap<String, String>) -> Self {
        self.extra_attributes = extra_attributes;
        self
    }

    /// Copy of this token, promoted to validated.
    ///
    /// Claims are carried over unchanged; `self` is left untouched.
    pub fn validated(&self, principal: Principal, authorities: BTreeSet<String>) -> Self {
        Self { state: TokenState::Validated { principal, authorities }, ..self.clone() }
    }

    pub fn principal_name(&self) -> &str {
        &self.principal_name
    }

    pub fn authentication_type(&self) -> &str {
        &self.authentication_type
    }

    pub fn authentication_method(&self) -> &str {
        &self.authentication_method
    }

    pub fn identity_provider(&self) -> &str {
        &self.identity_provider
    }

    pub fn authentication_instant(&self) -> &str {
        &self.authentication_instant
    }

    pub fn remote_address(&self) -> Option<&str> {
        self.remote_address.as_deref()
    }

    pub fn extra_attributes(&self) -> &HashMap<String, String> {
        &self.extra_attributes
    }

    pub fn extra_attribute(&self, name: &str) -> Option<&str> {
        self.extra_attributes.get(name).map(String::as_str)
    }

    pub fn state(&self) -> &TokenState {
        &self.state
    }

    pub fn is_validated(&self) -> bool {
        matches!(self.state, TokenState::Validated { .. })
    }

    /// Resolved principal, `None` before validation
    pub fn principal(&self) -> Option<&Principal> {
        match &self.state {
            TokenState::Validated { principal, .. } => Some(principal),
            TokenState::Unvalidated => None,
        }
    }

    /// Granted authorities, empty before validation
    pub fn authorities(&self) -> &BTreeSet<String> {
        match &self.state {
            TokenState::Validated { authorities, .. } => authorities,
            TokenState::Unvalidated => &NO_AUTHORITIES,
        }
    }
}

impl std::fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.principal() {
            Some(principal) => write!(f, "{} (via {})", principal, self.identity_provider),
            None => write!(f, "{} (via {}, unvalidated)", self.principal_name, self.identity_provider),
        }
    }
}

/// Authentication held by a session.
///
/// Only the [`Authentication::Shibboleth`] variant is understood by this crate;
/// other kinds are routed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authentication {
    /// Pre-authenticated by the Shibboleth SP
    Shibboleth(IdentityToken),

    /// Established by some other mechanism (form login, API key, ...)
    Other { provider: String, principal: String, authenticated: bool },
}

impl Authentication {
    pub fn is_authenticated(&self) -> bool {
        match self {
            Authentication::Shibboleth(token) => token.is_validated(),
            Authentication::Other { authenticated, .. } => *authenticated,
        }
    }

    /// The identity token, if this is a Shibboleth authentication
    pub fn identity_token(&self) -> Option<&IdentityToken> {
        match self {
            Authentication::Shibboleth(token) => Some(token),
            Authentication::Other { .. } => None,
        }
    }

    /// Name of the authenticated party
    pub fn name(&self) -> &str {
        match self {
            Authentication::Shibboleth(token) => {
                token.principal().map(Principal::name).unwrap_or(token.principal_name())
            }
            Authentication::Other { principal, .. } => principal,
        }
    }
}

impl std::fmt::Display for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Authentication::Shibboleth(token) => write!(f, "{}", token),
            Authentication::Other { provider, principal, .. } => {
                write!(f, "{} (via {})", principal, provider)
            }
        }
    }
}
