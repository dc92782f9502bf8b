//! Shibgate - Core
//!
//! Pre-authentication bridge for applications running behind a Shibboleth
//! native SP.
//!
//! # Overview
//!
//! The SP authenticates users against their identity provider and forwards the
//! result as request attributes (or headers). Shibgate turns those attributes
//! into an authentication for the application session, applies identity
//! provider and authentication method allow-lists, and forces a logout when
//! the SP later reports a different identity for an established session.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use shibgate_core::prelude::*;
//! use std::sync::Arc;
//!
//! let config = ShibgateConfig::load()?;
//! let users = Arc::new(StaticUserDetailsService::from_entries(&config.users));
//! let pipeline = ShibbolethPipeline::from_config(&config, users, vec![])?;
//!
//! let request = HeaderRequest::new(&http_request, &config.headers);
//! let outcome = pipeline.handle(&request, &mut response_headers, &mut session.context)?;
//! ```
//!
//! # Architecture
//!
//! - [`extractor`] - Request attributes to [`token::IdentityToken`]
//! - [`validator`] - Completeness, allow-lists, profile resolution
//! - [`filter`] - Authentication on the security-check path
//! - [`logout`] - Identity drift detection and logout handlers
//! - [`entry_point`] - Redirect to the SP login handler
//! - [`pipeline`] - Per-request composition of the above
//! - [`config`] - TOML and environment configuration

pub mod config;
pub mod context;
pub mod entry_point;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod logging;
pub mod logout;
pub mod pipeline;
pub mod prelude;
pub mod principal;
pub mod request;
pub mod response;
pub mod token;
pub mod user_details;
pub mod validator;

pub use error::{CredentialError, Result, ShibbolethError};
pub use token::{Authentication, IdentityToken, SHIBBOLETH_AUTH_TYPE};
