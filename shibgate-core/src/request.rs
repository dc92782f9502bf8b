//! Inbound request abstraction
//!
//! The native SP runs in front of the application and hands identity assertions
//! over as request attributes. [`PreAuthRequest`] is the view of a request this
//! crate needs; it is implemented for an owned [`ForwardedRequest`] and for any
//! `http::Request<B>` through [`HeaderRequest`], which reads the assertions from
//! forwarded headers.

use crate::config::HeaderNamesConfig;
use http::{HeaderName, Request};
use std::collections::HashMap;

/// Request as seen by the pre-authentication bridge
pub trait PreAuthRequest {
    /// Pre-authenticated subject (REMOTE_USER)
    fn remote_user(&self) -> Option<&str>;

    /// Authentication type (AUTH_TYPE)
    fn auth_type(&self) -> Option<&str>;

    /// Named attribute forwarded by the SP
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Client address, informational only
    fn remote_addr(&self) -> Option<&str>;

    /// Request path, without query string
    fn path(&self) -> &str;

    /// Path the application is mounted under
    fn context_path(&self) -> &str {
        ""
    }
}

/// Owned request attributes, as handed over by an AJP-style connector
#[derive(Debug, Clone, Default)]
pub struct ForwardedRequest {
    remote_user: Option<String>,
    auth_type: Option<String>,
    remote_addr: Option<String>,
    path: String,
    context_path: String,
    attributes: HashMap<String, String>,
}

impl ForwardedRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    pub fn with_remote_user(mut self, remote_user: impl Into<String>) -> Self {
        self.remote_user = Some(remote_user.into());
        self
    }

    pub fn with_auth_type(mut self, auth_type: impl Into<String>) -> Self {
        self.auth_type = Some(auth_type.into());
        self
    }

    pub fn with_remote_addr(mut self, remote_addr: impl Into<String>) -> Self {
        self.remote_addr = Some(remote_addr.into());
        self
    }

    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Remove an attribute, e.g. when the SP session has ended
    pub fn without_attribute(mut self, name: &str) -> Self {
        self.attributes.remove(name);
        self
    }
}

impl PreAuthRequest for ForwardedRequest {
    fn remote_user(&self) -> Option<&str> {
        self.remote_user.as_deref()
    }

    fn auth_type(&self) -> Option<&str> {
        self.auth_type.as_deref()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn context_path(&self) -> &str {
        &self.context_path
    }
}

/// Reads SP assertions from the headers of an `http::Request`.
///
/// Only safe behind a proxy that strips these headers from client traffic.
pub struct HeaderRequest<'a, B> {
    request: &'a Request<B>,
    names: &'a HeaderNamesConfig,
}

impl<'a, B> HeaderRequest<'a, B> {
    pub fn new(request: &'a Request<B>, names: &'a HeaderNamesConfig) -> Self {
        Self { request, names }
    }

    fn header(&self, name: &str) -> Option<&'a str> {
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        self.request.headers().get(name).and_then(|v| v.to_str().ok())
    }
}

impl<B> PreAuthRequest for HeaderRequest<'_, B> {
    fn remote_user(&self) -> Option<&str> {
        self.header(&self.names.remote_user)
    }

    fn auth_type(&self) -> Option<&str> {
        self.header(&self.names.auth_type)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        if self.names.attribute_prefix.is_empty() {
            self.header(name)
        } else {
            self.header(&format!("{}{}", self.names.attribute_prefix, name))
        }
    }

    fn remote_addr(&self) -> Option<&str> {
        // First hop of X-Forwarded-For is the client
        self.header(&self.names.remote_addr).and_then(|v| v.split(',').next()).map(str::trim)
    }

    fn path(&self) -> &str {
        self.request.uri().path()
    }

    fn context_path(&self) -> &str {
        &self.names.context_path
    }
}
