//! Per-request composition of the bridge components

use crate::config::ShibgateConfig;
use crate::context::SecurityContext;
use crate::entry_point::LoginEntryPoint;
use crate::error::{Result, ShibbolethError};
use crate::extractor::{AttributeExtractor, AttributeMapping, ShibbolethExtractor};
use crate::filter::{AuthenticationFilter, FilterOutcome};
use crate::logout::{
    CookieClearingLogoutHandler, LogoutDecision, LogoutHandler, ShibbolethConsistencyChecker,
    ShibbolethLogoutFilter,
};
use crate::request::PreAuthRequest;
use crate::user_details::UserDetailsService;
use crate::validator::{AccessPolicy, ShibbolethValidator};
use http::HeaderMap;
use std::sync::Arc;

/// What happened to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub logout: LogoutDecision,
    pub authentication: FilterOutcome,
}

/// Logout check, then authentication on the security-check path.
///
/// Immutable once built; share it behind an `Arc`.
pub struct ShibbolethPipeline {
    filter: AuthenticationFilter,
    logout: ShibbolethLogoutFilter,
    entry_point: LoginEntryPoint,
}

impl ShibbolethPipeline {
    pub fn new(
        filter: AuthenticationFilter,
        logout: ShibbolethLogoutFilter,
        entry_point: LoginEntryPoint,
    ) -> Self {
        Self { filter, logout, entry_point }
    }

    /// Build all components from a validated configuration.
    ///
    /// When `logout.session_cookie` is set, a cookie-clearing handler runs
    /// after `handlers`.
    pub fn from_config(
        config: &ShibgateConfig,
        user_details: Arc<dyn UserDetailsService>,
        mut handlers: Vec<Arc<dyn LogoutHandler>>,
    ) -> Result<Self> {
        config.validate().map_err(|e| ShibbolethError::Configuration(format!("{:#}", e)))?;

        let extractor: Arc<dyn AttributeExtractor> =
            Arc::new(ShibbolethExtractor::new(AttributeMapping::from_config(&config.attributes)?));
        let validator = Arc::new(ShibbolethValidator::new(
            AccessPolicy::from_config(&config.policy),
            user_details,
        ));
        let filter = AuthenticationFilter::new(
            extractor.clone(),
            validator,
            config.entry_point.security_check_path.clone(),
        )?;

        if let Some(cookie) = CookieClearingLogoutHandler::from_config(&config.logout) {
            handlers.push(Arc::new(cookie));
        }
        let logout =
            ShibbolethLogoutFilter::new(Arc::new(ShibbolethConsistencyChecker::new(extractor)), handlers);

        let entry_point = LoginEntryPoint::from_config(&config.entry_point)?;

        log::info!(
            "Shibboleth bridge ready: security check at {}, {} logout handler(s)",
            filter.security_check_path(),
            logout.handlers().len()
        );

        Ok(Self::new(filter, logout, entry_point))
    }

    pub fn filter(&self) -> &AuthenticationFilter {
        &self.filter
    }

    pub fn entry_point(&self) -> &LoginEntryPoint {
        &self.entry_point
    }

    /// Run the logout check and, on the security-check path, authentication.
    ///
    /// Credential, lookup and handler errors are returned to the caller.
    ///
    /// A drifted identity arriving on the security-check path is logged out
    /// and then authenticated again in the same call. Logout handlers have
    /// already written to `response` by then, so a configured session cookie
    /// is deleted even though the context holds the new authentication. Hosts
    /// that key sessions on that cookie must issue a fresh one when
    /// `outcome.logout` is required and `outcome.authentication` is
    /// authenticated.
    pub fn handle(
        &self,
        request: &dyn PreAuthRequest,
        response: &mut HeaderMap,
        context: &mut SecurityContext,
    ) -> Result<PipelineOutcome> {
        let logout = self.logout.do_filter(request, response, context)?;

        let authentication = if self.filter.requires_authentication(request) {
            self.filter.attempt_authentication(request, context)?
        } else {
            FilterOutcome::Anonymous
        };

        Ok(PipelineOutcome { logout, authentication })
    }
}
