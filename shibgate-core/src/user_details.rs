//! User-detail lookup
//!
//! The validator resolves a richer principal through a [`UserDetailsService`].
//! Returning `Ok(None)` is valid and keeps the bare principal name.

use crate::config::UserEntry;
use crate::principal::UserProfile;
use crate::token::IdentityToken;
use anyhow::Result;
use std::collections::HashMap;

/// Resolve a user profile for a pre-authenticated identity
///
/// Implement this trait to plug in a directory, database or remote service.
/// Calls are synchronous and may block.
pub trait UserDetailsService: Send + Sync {
    /// Look up the profile for a token. `None` means the user is unknown.
    fn load_user_details(&self, token: &IdentityToken) -> Result<Option<UserProfile>>;

    /// Service name for logging
    fn name(&self) -> &str {
        "user-details"
    }
}

/// Lookup that never finds a profile
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUserDetails;

impl UserDetailsService for NoUserDetails {
    fn load_user_details(&self, _token: &IdentityToken) -> Result<Option<UserProfile>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// In-memory profiles keyed by principal name
#[derive(Debug, Clone, Default)]
pub struct StaticUserDetailsService {
    profiles: HashMap<String, UserProfile>,
}

impl StaticUserDetailsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[[users]]` configuration table
    pub fn from_entries(entries: &[UserEntry]) -> Self {
        let profiles = entries.iter().map(|e| (e.eppn.clone(), e.to_profile())).collect();
        Self { profiles }
    }

    /// Register a profile under its eppn
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profiles.insert(profile.eppn.clone(), profile);
        self
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl UserDetailsService for StaticUserDetailsService {
    fn load_user_details(&self, token: &IdentityToken) -> Result<Option<UserProfile>> {
        let profile = self.profiles.get(token.principal_name()).cloned();
        if profile.is_none() {
            log::debug!("No static profile for '{}'", token.principal_name());
        }
        Ok(profile)
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(principal: &str) -> IdentityToken {
        IdentityToken::new(principal, "shibboleth", "urn:pwd", "idp.example.edu", "now")
    }

    #[test]
    fn test_static_lookup_by_principal_name() {
        let service = StaticUserDetailsService::new()
            .with_profile(UserProfile::new("jdoe", "jdoe").with_authority("ROLE_USER"));

        let profile = service.load_user_details(&token("jdoe")).unwrap().unwrap();
        assert_eq!(profile.username, "jdoe");
        assert!(profile.has_authority("ROLE_USER"));

        assert!(service.load_user_details(&token("asmith")).unwrap().is_none());
    }

    #[test]
    fn test_from_entries() {
        let entries = vec![UserEntry {
            eppn: "jdoe@example.edu".to_string(),
            username: "jdoe".to_string(),
            email: Some("jdoe@example.edu".to_string()),
            full_name: None,
            authorities: vec!["ROLE_ADMIN".to_string()],
        }];

        let service = StaticUserDetailsService::from_entries(&entries);
        assert_eq!(service.len(), 1);

        let profile = service.load_user_details(&token("jdoe@example.edu")).unwrap().unwrap();
        assert_eq!(profile.email.as_deref(), Some("jdoe@example.edu"));
    }

    #[test]
    fn test_no_user_details() {
        assert!(NoUserDetails.load_user_details(&token("jdoe")).unwrap().is_none());
    }
}
