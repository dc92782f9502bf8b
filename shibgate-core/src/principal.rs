//! Resolved principal and user profile

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// User profile returned by a [`UserDetailsService`](crate::user_details::UserDetailsService)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Application username
    pub username: String,

    /// eduPersonPrincipalName the profile was resolved for
    pub eppn: String,

    pub email: Option<String>,

    pub full_name: Option<String>,

    /// Granted authorities (e.g. "ROLE_USER")
    pub authorities: BTreeSet<String>,

    /// Display attributes
    pub attributes: HashMap<String, String>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>, eppn: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            eppn: eppn.into(),
            email: None,
            full_name: None,
            authorities: BTreeSet::new(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Grant an authority
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authorities.insert(authority.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Check if the profile carries a specific authority
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

/// Who the request is, once validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// No profile was found, only the asserted name is known
    Name(String),

    /// Profile resolved by the user-detail lookup
    Profile(UserProfile),
}

impl Principal {
    /// Display name of the principal
    pub fn name(&self) -> &str {
        match self {
            Principal::Name(name) => name,
            Principal::Profile(profile) => &profile.username,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Principal::Profile(profile) => Some(profile),
            Principal::Name(_) => None,
        }
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
