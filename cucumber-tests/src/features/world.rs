use cucumber::World;
use http::HeaderMap;
use shibgate_core::config::ShibgateConfig;
use shibgate_core::prelude::*;
use std::sync::{Arc, Mutex};

pub const SECURITY_CHECK: &str = "/shibboleth_native_sp_security_check";

pub const METHOD_ATTRIBUTE: &str = "Shib-Authentication-Method";
pub const PROVIDER_ATTRIBUTE: &str = "Shib-Identity-Provider";
pub const INSTANT_ATTRIBUTE: &str = "Shib-Authentication-Instant";

/// Logout handler that records its name on every call
pub struct RecordingHandler {
    pub name: String,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl LogoutHandler for RecordingHandler {
    fn logout(
        &self,
        _request: &dyn PreAuthRequest,
        _response: &mut HeaderMap,
        _authentication: Option<&Authentication>,
    ) -> anyhow::Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(self.name.clone());
        }
        Ok(())
    }
}

/// One browser session talking to an application behind the SP
#[derive(Debug, World)]
pub struct GateWorld {
    pub config: ShibgateConfig,
    pub profiles: Vec<UserProfile>,
    pub handler_names: Vec<String>,
    pub handler_calls: Arc<Mutex<Vec<String>>>,
    pub context: SecurityContext,
    pub request: ForwardedRequest,
    pub response: HeaderMap,
    pub last_outcome: Option<PipelineOutcome>,
    pub last_error: Option<String>,
}

impl Default for GateWorld {
    fn default() -> Self {
        let mut config = ShibgateConfig::default();
        config.attributes.principal_attribute = Some("eppn".to_string());
        config.attributes.authentication_method_attribute = Some(METHOD_ATTRIBUTE.to_string());
        config.attributes.identity_provider_attribute = Some(PROVIDER_ATTRIBUTE.to_string());
        config.attributes.authentication_instant_attribute = Some(INSTANT_ATTRIBUTE.to_string());
        config.attributes.extra_attributes = Some(vec!["mail".to_string()]);

        Self {
            config,
            profiles: Vec::new(),
            handler_names: Vec::new(),
            handler_calls: Arc::new(Mutex::new(Vec::new())),
            context: SecurityContext::new(),
            request: ForwardedRequest::new(SECURITY_CHECK),
            response: HeaderMap::new(),
            last_outcome: None,
            last_error: None,
        }
    }
}

impl GateWorld {
    /// Build a pipeline from the current configuration
    pub fn pipeline(&self) -> Result<ShibbolethPipeline, ShibbolethError> {
        let users = self
            .profiles
            .iter()
            .cloned()
            .fold(StaticUserDetailsService::new(), StaticUserDetailsService::with_profile);

        let handlers: Vec<Arc<dyn LogoutHandler>> = self
            .handler_names
            .iter()
            .map(|name| {
                Arc::new(RecordingHandler { name: name.clone(), calls: self.handler_calls.clone() })
                    as Arc<dyn LogoutHandler>
            })
            .collect();

        ShibbolethPipeline::from_config(&self.config, Arc::new(users), handlers)
    }

    /// Request carrying a complete Shibboleth session
    pub fn asserted_request(path: &str, user: &str, provider: &str, method: &str) -> ForwardedRequest {
        ForwardedRequest::new(path)
            .with_remote_user(user)
            .with_auth_type("shibboleth")
            .with_attribute(METHOD_ATTRIBUTE, method)
            .with_attribute(PROVIDER_ATTRIBUTE, provider)
            .with_attribute(INSTANT_ATTRIBUTE, "2024-01-01T00:00:00Z")
    }

    /// Send the current request through a fresh pipeline
    pub fn handle(&mut self) {
        self.response = HeaderMap::new();
        self.last_outcome = None;
        self.last_error = None;

        let result = self
            .pipeline()
            .and_then(|pipeline| pipeline.handle(&self.request, &mut self.response, &mut self.context));

        match result {
            Ok(outcome) => self.last_outcome = Some(outcome),
            Err(e) => {
                self.last_error = Some(match e.credential() {
                    Some(cause) => cause.to_string(),
                    None => e.to_string(),
                })
            }
        }
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.handler_calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}
