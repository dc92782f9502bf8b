//! Per-session security context

use crate::token::Authentication;
use serde::{Deserialize, Serialize};

/// Authentication state of one session.
///
/// The host application owns storage; this crate only reads and replaces the
/// authentication held here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    /// Create an anonymous context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context already holding an authentication
    pub fn with_authentication(authentication: Authentication) -> Self {
        Self { authentication: Some(authentication) }
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    /// Install a new authentication, returning the previous one
    pub fn set_authentication(&mut self, authentication: Authentication) -> Option<Authentication> {
        self.authentication.replace(authentication)
    }

    /// Drop the current authentication
    pub fn clear(&mut self) -> Option<Authentication> {
        self.authentication.take()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication.as_ref().is_some_and(Authentication::is_authenticated)
    }
}
