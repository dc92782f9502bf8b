//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use shibgate_core::prelude::*;
//! ```

// === Configuration ===
pub use crate::config::{LoggingConfig, ShibgateConfig};

// === Pipeline ===
pub use crate::filter::{AuthenticationFilter, FilterOutcome};
pub use crate::logout::{LogoutDecision, LogoutHandler};
pub use crate::pipeline::{PipelineOutcome, ShibbolethPipeline};

// === Requests and sessions ===
pub use crate::context::SecurityContext;
pub use crate::request::{ForwardedRequest, HeaderRequest, PreAuthRequest};

// === Identity ===
pub use crate::principal::{Principal, UserProfile};
pub use crate::token::{Authentication, IdentityToken};
pub use crate::user_details::{StaticUserDetailsService, UserDetailsService};

// === Errors ===
pub use crate::error::{CredentialError, ShibbolethError};
