//! Forced logout on identity drift
//!
//! The SP may switch the user behind an established session (new login, other
//! IdP, step-up authentication). On every request the live attributes are
//! compared with the stored token; any difference ends the session.

use crate::config::LogoutConfig;
use crate::context::SecurityContext;
use crate::error::{Result, ShibbolethError};
use crate::extractor::{AttributeExtractor, LiveClaims};
use crate::request::PreAuthRequest;
use crate::token::{Authentication, IdentityToken};
use http::header::SET_COOKIE;
use http::{HeaderMap, HeaderValue};
use std::sync::Arc;

/// Claim compared by the consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    PrincipalName,
    AuthenticationType,
    AuthenticationMethod,
    IdentityProvider,
}

impl std::fmt::Display for Claim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Claim::PrincipalName => "principal_name",
            Claim::AuthenticationType => "authentication_type",
            Claim::AuthenticationMethod => "authentication_method",
            Claim::IdentityProvider => "identity_provider",
        };
        f.write_str(name)
    }
}

/// A stored claim that no longer matches the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub claim: Claim,
    pub expected: String,
    /// `None` when the request does not carry the claim at all
    pub actual: Option<String>,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{} mismatch, expected '{}', but got '{}'",
                self.claim, self.expected, actual
            ),
            None => write!(f, "{} is missing, expected '{}'", self.claim, self.expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutDecision {
    NotRequired,
    /// First mismatch found, in comparison order
    Required(Mismatch),
}

impl LogoutDecision {
    pub fn is_required(&self) -> bool {
        matches!(self, LogoutDecision::Required(_))
    }
}

/// Decides whether a session must be terminated
pub trait ConsistencyChecker: Send + Sync {
    fn check(
        &self,
        request: &dyn PreAuthRequest,
        authentication: Option<&Authentication>,
    ) -> LogoutDecision;
}

/// Side effect run on forced logout (cookie removal, audit, ...)
pub trait LogoutHandler: Send + Sync {
    fn logout(
        &self,
        request: &dyn PreAuthRequest,
        response: &mut HeaderMap,
        authentication: Option<&Authentication>,
    ) -> anyhow::Result<()>;
}

/// Compares stored Shibboleth claims with the live request
pub struct ShibbolethConsistencyChecker {
    extractor: Arc<dyn AttributeExtractor>,
}

impl ShibbolethConsistencyChecker {
    pub fn new(extractor: Arc<dyn AttributeExtractor>) -> Self {
        Self { extractor }
    }

    /// Every mismatch between `token` and the request, in comparison order
    pub fn all_mismatches(&self, request: &dyn PreAuthRequest, token: &IdentityToken) -> Vec<Mismatch> {
        let LiveClaims { principal_name, authentication_type, authentication_method, identity_provider } =
            self.extractor.live_claims(request);

        let compared = [
            (Claim::PrincipalName, token.principal_name(), principal_name),
            (Claim::AuthenticationType, token.authentication_type(), authentication_type),
            (Claim::AuthenticationMethod, token.authentication_method(), Some(authentication_method)),
            (Claim::IdentityProvider, token.identity_provider(), Some(identity_provider)),
        ];

        compared
            .into_iter()
            .filter(|(_, expected, actual)| actual.as_deref() != Some(*expected))
            .map(|(claim, expected, actual)| Mismatch { claim, expected: expected.to_string(), actual })
            .collect()
    }
}

impl ConsistencyChecker for ShibbolethConsistencyChecker {
    fn check(
        &self,
        request: &dyn PreAuthRequest,
        authentication: Option<&Authentication>,
    ) -> LogoutDecision {
        let Some(token) = authentication
            .filter(|a| a.is_authenticated())
            .and_then(Authentication::identity_token)
        else {
            return LogoutDecision::NotRequired;
        };

        match self.all_mismatches(request, token).into_iter().next() {
            Some(mismatch) => {
                log::debug!("{}, forcing logout", mismatch);
                LogoutDecision::Required(mismatch)
            }
            None => LogoutDecision::NotRequired,
        }
    }
}

/// Expires the session cookie on forced logout
#[derive(Debug, Clone)]
pub struct CookieClearingLogoutHandler {
    cookie_name: String,
    path: String,
}

impl CookieClearingLogoutHandler {
    pub fn new(cookie_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self { cookie_name: cookie_name.into(), path: path.into() }
    }

    /// Handler for the configured session cookie, if any
    pub fn from_config(config: &LogoutConfig) -> Option<Self> {
        config.session_cookie.as_ref().map(|name| Self::new(name.clone(), config.cookie_path.clone()))
    }

    /// Set-Cookie value that deletes the cookie
    pub fn delete_cookie(&self) -> String {
        format!("{}=; Path={}; Max-Age=0", self.cookie_name, self.path)
    }
}

impl LogoutHandler for CookieClearingLogoutHandler {
    fn logout(
        &self,
        _request: &dyn PreAuthRequest,
        response: &mut HeaderMap,
        _authentication: Option<&Authentication>,
    ) -> anyhow::Result<()> {
        response.append(SET_COOKIE, HeaderValue::from_str(&self.delete_cookie())?);
        Ok(())
    }
}

/// Runs the consistency check and the logout handlers
pub struct ShibbolethLogoutFilter {
    checker: Arc<dyn ConsistencyChecker>,
    handlers: Vec<Arc<dyn LogoutHandler>>,
}

impl ShibbolethLogoutFilter {
    pub fn new(checker: Arc<dyn ConsistencyChecker>, handlers: Vec<Arc<dyn LogoutHandler>>) -> Self {
        Self { checker, handlers }
    }

    pub fn handlers(&self) -> &[Arc<dyn LogoutHandler>] {
        &self.handlers
    }

    /// Check the session and log out on drift.
    ///
    /// The context is cleared before the handlers run; each handler still
    /// receives the terminated authentication. The first handler error stops
    /// the remaining handlers.
    pub fn do_filter(
        &self,
        request: &dyn PreAuthRequest,
        response: &mut HeaderMap,
        context: &mut SecurityContext,
    ) -> Result<LogoutDecision> {
        let decision = self.checker.check(request, context.authentication());
        let LogoutDecision::Required(mismatch) = &decision else {
            return Ok(decision);
        };

        let authentication = context.clear();
        log::info!(
            "Forcing logout of '{}': {}",
            authentication.as_ref().map(Authentication::name).unwrap_or_default(),
            mismatch
        );

        for handler in &self.handlers {
            handler
                .logout(request, response, authentication.as_ref())
                .map_err(ShibbolethError::LogoutHandler)?;
        }

        Ok(decision)
    }
}
