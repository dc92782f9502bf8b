//! Error types for the pre-authentication bridge

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ShibbolethError>;

/// Main error type
#[derive(thiserror::Error, Debug)]
pub enum ShibbolethError {
    /// A required setting or collaborator is missing. Raised at startup only.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The forwarded attributes do not form an acceptable authentication event
    #[error("Bad credentials: {0}")]
    BadCredentials(#[from] CredentialError),

    /// The user-detail lookup failed. Propagated as-is, never retried.
    #[error("User details lookup failed: {0}")]
    UserDetails(#[source] anyhow::Error),

    /// A logout handler failed during a forced logout
    #[error("Logout handler failed: {0}")]
    LogoutHandler(#[source] anyhow::Error),

    /// The login redirect target is not a valid header value
    #[error("Invalid redirect location: {0}")]
    InvalidRedirect(#[from] http::header::InvalidHeaderValue),
}

impl ShibbolethError {
    /// Credential cause, if this is a per-request rejection
    pub fn credential(&self) -> Option<&CredentialError> {
        match self {
            ShibbolethError::BadCredentials(cause) => Some(cause),
            _ => None,
        }
    }
}

/// Reason a token was rejected by the validator.
///
/// Each variant names the offending field or value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("authentication type '{actual}' is not '{expected}'")]
    InvalidAuthenticationType { expected: &'static str, actual: String },

    #[error("required shibboleth attribute '{field}' is missing")]
    MissingAttribute { field: &'static str },

    #[error("identity provider: {provider}, not allowed")]
    IdentityProviderNotAllowed { provider: String },

    #[error("authentication method: {method}, not allowed")]
    AuthenticationMethodNotAllowed { method: String },
}

impl CredentialError {
    /// Short machine-readable code, used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            CredentialError::InvalidAuthenticationType { .. } => "invalid_authentication_type",
            CredentialError::MissingAttribute { .. } => "missing_attribute",
            CredentialError::IdentityProviderNotAllowed { .. } => "identity_provider_not_allowed",
            CredentialError::AuthenticationMethodNotAllowed { .. } => {
                "authentication_method_not_allowed"
            }
        }
    }
}
