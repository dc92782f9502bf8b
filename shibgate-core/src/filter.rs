//! Authentication filter
//!
//! Runs on the security-check path: extract a token, hand it to the validator,
//! and install the result in the session's [`SecurityContext`].

use crate::config::ShibgateConfig;
use crate::context::SecurityContext;
use crate::error::{Result, ShibbolethError};
use crate::extractor::{AttributeExtractor, AttributeMapping, ShibbolethExtractor};
use crate::request::PreAuthRequest;
use crate::token::Authentication;
use crate::user_details::UserDetailsService;
use crate::validator::{AccessPolicy, AuthenticationValidator, ShibbolethValidator};
use std::sync::Arc;

/// Result of a filter pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Request did not need or did not carry a Shibboleth session
    Anonymous,

    /// A validated authentication was installed
    Authenticated(Authentication),
}

impl FilterOutcome {
    pub fn authentication(&self) -> Option<&Authentication> {
        match self {
            FilterOutcome::Authenticated(authentication) => Some(authentication),
            FilterOutcome::Anonymous => None,
        }
    }
}

pub struct AuthenticationFilter {
    extractor: Arc<dyn AttributeExtractor>,
    validator: Arc<dyn AuthenticationValidator>,
    security_check_path: String,
}

impl AuthenticationFilter {
    pub fn new(
        extractor: Arc<dyn AttributeExtractor>,
        validator: Arc<dyn AuthenticationValidator>,
        security_check_path: impl Into<String>,
    ) -> Result<Self> {
        let security_check_path = security_check_path.into();
        if !security_check_path.starts_with('/') {
            return Err(ShibbolethError::Configuration(format!(
                "security check path '{}' must be absolute",
                security_check_path
            )));
        }
        Ok(Self { extractor, validator, security_check_path })
    }

    /// Build the standard extractor and validator from configuration.
    ///
    /// Fails when any attribute name is unset.
    pub fn from_config(
        config: &ShibgateConfig,
        user_details: Arc<dyn UserDetailsService>,
    ) -> Result<Self> {
        let mapping = AttributeMapping::from_config(&config.attributes)?;
        let policy = AccessPolicy::from_config(&config.policy);

        Self::new(
            Arc::new(ShibbolethExtractor::new(mapping)),
            Arc::new(ShibbolethValidator::new(policy, user_details)),
            config.entry_point.security_check_path.clone(),
        )
    }

    pub fn security_check_path(&self) -> &str {
        &self.security_check_path
    }

    pub fn extractor(&self) -> &Arc<dyn AttributeExtractor> {
        &self.extractor
    }

    /// Whether the request targets the security-check path
    pub fn requires_authentication(&self, request: &dyn PreAuthRequest) -> bool {
        let path = request.path();
        let path = path.strip_prefix(request.context_path()).unwrap_or(path);
        path == self.security_check_path
    }

    /// Authenticate the request and update the context.
    ///
    /// A request without a Shibboleth session stays anonymous. A rejected token
    /// clears the context and returns the credential error.
    pub fn attempt_authentication(
        &self,
        request: &dyn PreAuthRequest,
        context: &mut SecurityContext,
    ) -> Result<FilterOutcome> {
        let Some(token) = self.extractor.extract(request) else {
            return Ok(FilterOutcome::Anonymous);
        };

        match self.validator.validate(&Authentication::Shibboleth(token)) {
            Ok(authentication) => {
                log::info!("Authenticated '{}' via shibboleth", authentication.name());
                context.set_authentication(authentication.clone());
                Ok(FilterOutcome::Authenticated(authentication))
            }
            Err(e) => {
                if e.credential().is_some() {
                    context.clear();
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CredentialError;
    use crate::request::ForwardedRequest;
    use crate::token::IdentityToken;
    use crate::user_details::NoUserDetails;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingValidator {
        calls: AtomicUsize,
    }

    impl AuthenticationValidator for CountingValidator {
        fn validate(&self, authentication: &Authentication) -> Result<Authentication> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(authentication.clone())
        }
    }

    fn config() -> ShibgateConfig {
        let mut config = ShibgateConfig::default();
        config.attributes.principal_attribute = Some("eppn".to_string());
        config.attributes.authentication_method_attribute = Some("method".to_string());
        config.attributes.identity_provider_attribute = Some("idp".to_string());
        config.attributes.authentication_instant_attribute = Some("instant".to_string());
        config.attributes.extra_attributes = Some(vec![]);
        config
    }

    fn session_request() -> ForwardedRequest {
        ForwardedRequest::new("/shibboleth_native_sp_security_check")
            .with_remote_user("jdoe")
            .with_auth_type("shibboleth")
            .with_attribute("method", "urn:pwd")
            .with_attribute("idp", "idp.example.edu")
            .with_attribute("instant", "2024-01-01T00:00:00Z")
    }

    #[test]
    fn test_construction_fails_fast_without_attribute_names() {
        let mut cfg = config();
        cfg.attributes.extra_attributes = None;
        let err = AuthenticationFilter::from_config(&cfg, Arc::new(NoUserDetails)).err().unwrap();
        assert!(matches!(err, ShibbolethError::Configuration(_)));
    }

    #[test]
    fn test_successful_authentication_installs_context() {
        let filter = AuthenticationFilter::from_config(&config(), Arc::new(NoUserDetails)).unwrap();
        let mut context = SecurityContext::new();

        let outcome = filter.attempt_authentication(&session_request(), &mut context).unwrap();

        assert!(matches!(outcome, FilterOutcome::Authenticated(_)));
        assert!(context.is_authenticated());
        assert_eq!(context.authentication().unwrap().name(), "jdoe");
    }

    #[test]
    fn test_no_session_skips_validator() {
        let mapping = AttributeMapping::from_config(&config().attributes).unwrap();
        let validator = Arc::new(CountingValidator { calls: AtomicUsize::new(0) });
        let filter = AuthenticationFilter::new(
            Arc::new(ShibbolethExtractor::new(mapping)),
            validator.clone(),
            "/shibboleth_native_sp_security_check",
        )
        .unwrap();

        let mut context = SecurityContext::new();
        let request = session_request().with_auth_type("Negotiate");
        let outcome = filter.attempt_authentication(&request, &mut context).unwrap();

        assert_eq!(outcome, FilterOutcome::Anonymous);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
        assert!(context.authentication().is_none());
    }

    #[test]
    fn test_rejection_clears_context() {
        let mut cfg = config();
        cfg.policy.identity_provider_allowed = vec!["idp.other.edu".to_string()];
        let filter = AuthenticationFilter::from_config(&cfg, Arc::new(NoUserDetails)).unwrap();

        let stale = IdentityToken::new("old", "shibboleth", "m", "p", "i");
        let mut context = SecurityContext::with_authentication(Authentication::Shibboleth(stale));

        let err = filter.attempt_authentication(&session_request(), &mut context).unwrap_err();
        assert_eq!(
            err.credential(),
            Some(&CredentialError::IdentityProviderNotAllowed {
                provider: "idp.example.edu".to_string()
            })
        );
        assert!(context.authentication().is_none());
    }

    #[test]
    fn test_requires_authentication_on_security_check_path() {
        let filter = AuthenticationFilter::from_config(&config(), Arc::new(NoUserDetails)).unwrap();

        assert!(filter.requires_authentication(&session_request()));
        assert!(!filter.requires_authentication(&ForwardedRequest::new("/app/home")));

        let mounted = ForwardedRequest::new("/app/shibboleth_native_sp_security_check")
            .with_context_path("/app");
        assert!(filter.requires_authentication(&mounted));
    }

    #[test]
    fn test_relative_security_check_path_rejected() {
        let mapping = AttributeMapping::from_config(&config().attributes).unwrap();
        let result = AuthenticationFilter::new(
            Arc::new(ShibbolethExtractor::new(mapping)),
            Arc::new(ShibbolethValidator::new(AccessPolicy::unrestricted(), Arc::new(NoUserDetails))),
            "",
        );
        assert!(result.is_err());
    }
}
