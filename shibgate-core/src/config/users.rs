//! Static user profiles

use crate::principal::UserProfile;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A user profile declared in the configuration file
///
/// ```toml
/// [[users]]
/// eppn = "jdoe@example.edu"
/// username = "jdoe"
/// authorities = ["ROLE_USER"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    /// Principal name the profile is looked up by
    pub eppn: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl UserEntry {
    pub fn to_profile(&self) -> UserProfile {
        let mut profile = UserProfile::new(self.username.clone(), self.eppn.clone());
        profile.email = self.email.clone();
        profile.full_name = self.full_name.clone();
        profile.authorities = self.authorities.iter().cloned().collect();
        profile
    }
}

pub fn validate_users(users: &[UserEntry]) -> Result<()> {
    let mut seen = HashSet::new();
    for user in users {
        if user.eppn.is_empty() || user.username.is_empty() {
            bail!("users entries need a non-empty eppn and username");
        }
        if !seen.insert(user.eppn.as_str()) {
            bail!("Duplicate user entry for eppn '{}'", user.eppn);
        }
    }
    Ok(())
}
