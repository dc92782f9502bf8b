//! Login redirect to the Shibboleth SP
//!
//! Unauthenticated users are sent to the SP login handler with the
//! security-check path as return target, so the SP hands them back to the
//! filter once the IdP has authenticated them.

use crate::config::entry_point::TARGET_PLACEHOLDER;
use crate::config::EntryPointConfig;
use crate::error::{Result, ShibbolethError};
use crate::request::PreAuthRequest;
use crate::response::{self, Body};
use http::Response;
use std::borrow::Cow;
use std::sync::Arc;

/// Hook run on the redirect response before it is returned
pub trait PreCommenceHook: Send + Sync {
    fn pre_commence(&self, request: &dyn PreAuthRequest, response: &mut Response<Body>);
}

pub struct LoginEntryPoint {
    login_url: String,
    security_check_path: String,
    hook: Option<Arc<dyn PreCommenceHook>>,
}

impl LoginEntryPoint {
    pub fn new(login_url: impl Into<String>, security_check_path: impl Into<String>) -> Result<Self> {
        let config = EntryPointConfig {
            login_url: login_url.into(),
            security_check_path: security_check_path.into(),
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &EntryPointConfig) -> Result<Self> {
        config.validate().map_err(|e| ShibbolethError::Configuration(e.to_string()))?;
        Ok(Self {
            login_url: config.login_url.clone(),
            security_check_path: config.security_check_path.clone(),
            hook: None,
        })
    }

    pub fn with_pre_commence(mut self, hook: Arc<dyn PreCommenceHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Login URL with the encoded return target substituted
    pub fn redirect_url(&self, context_path: &str) -> String {
        let target = format!("{}{}", context_path, self.security_check_path);
        self.login_url.replacen(TARGET_PLACEHOLDER, &encode_latin1(&target), 1)
    }

    /// 302 to the SP login handler
    pub fn commence(&self, request: &dyn PreAuthRequest) -> Result<Response<Body>> {
        let location = self.redirect_url(request.context_path());
        log::debug!("Redirecting {} to {}", request.path(), location);

        let mut response = response::redirect(&location)?;
        if let Some(hook) = &self.hook {
            hook.pre_commence(request, &mut response);
        }
        Ok(response)
    }
}

/// Percent-encode as ISO-8859-1, or return the input when it has other characters
fn encode_latin1(value: &str) -> Cow<'_, str> {
    let latin1: Option<Vec<u8>> = value.chars().map(|c| u8::try_from(c).ok()).collect();
    match latin1 {
        Some(bytes) => Cow::Owned(urlencoding::encode_binary(&bytes).into_owned()),
        None => {
            log::debug!("'{}' is not representable in ISO-8859-1, not encoding it", value);
            Cow::Borrowed(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ForwardedRequest;
    use http::header::{HeaderValue, LOCATION};
    use http::StatusCode;

    struct NoCache;

    impl PreCommenceHook for NoCache {
        fn pre_commence(&self, _request: &dyn PreAuthRequest, response: &mut Response<Body>) {
            response.headers_mut().insert("cache-control", HeaderValue::from_static("no-store"));
        }
    }

    fn entry_point() -> LoginEntryPoint {
        LoginEntryPoint::from_config(&EntryPointConfig::default()).unwrap()
    }

    #[test]
    fn test_default_redirect_url() {
        assert_eq!(
            entry_point().redirect_url("/app"),
            "/Shibboleth.sso/Login?target=%2Fapp%2Fshibboleth_native_sp_security_check"
        );
        assert_eq!(
            entry_point().redirect_url(""),
            "/Shibboleth.sso/Login?target=%2Fshibboleth_native_sp_security_check"
        );
    }

    #[test]
    fn test_latin1_characters_are_encoded_as_single_bytes() {
        let ep = LoginEntryPoint::new("/login?t={0}", "/check").unwrap();
        assert_eq!(ep.redirect_url("/caf\u{e9}"), "/login?t=%2Fcaf%E9%2Fcheck");
    }

    #[test]
    fn test_non_latin1_path_falls_back_to_raw() {
        let ep = LoginEntryPoint::new("/login?t={0}", "/check").unwrap();
        assert_eq!(ep.redirect_url("/\u{65e5}"), "/login?t=/\u{65e5}/check");
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let err = LoginEntryPoint::new("/Shibboleth.sso/Login", "/check").err().unwrap();
        assert!(matches!(err, ShibbolethError::Configuration(_)));
    }

    #[test]
    fn test_commence_redirects_and_runs_hook() {
        let ep = entry_point().with_pre_commence(Arc::new(NoCache));
        let request = ForwardedRequest::new("/app/private").with_context_path("/app");

        let response = ep.commence(&request).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "/Shibboleth.sso/Login?target=%2Fapp%2Fshibboleth_native_sp_security_check"
        );
        assert_eq!(response.headers()["cache-control"], "no-store");
    }
}
