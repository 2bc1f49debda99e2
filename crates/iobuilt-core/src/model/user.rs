use std::fmt;

use iobuilt_api::StoredUser;
use serde::{Deserialize, Serialize};

use super::role::Role;

/// A platform account as listed by `/users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<u64>,
    pub email: String,
    pub role: Role,
}

/// Result of a successful sign-in.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: u64,
    pub email: String,
    pub role: Role,
    pub token: String,
}

impl fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// The signed-in user as held by IAM: identity plus the profile fields
/// cached after sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: u64,
    pub email: String,
    pub role: Role,
    pub username: Option<String>,
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

impl From<StoredUser> for CurrentUser {
    fn from(stored: StoredUser) -> Self {
        Self {
            id: stored.id,
            email: stored.email,
            role: Role::parse(&stored.role).unwrap_or_default(),
            username: stored.username,
            name: stored.name,
            photo_url: stored.photo_url,
        }
    }
}

impl From<&CurrentUser> for StoredUser {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.to_string(),
            username: user.username.clone(),
            name: user.name.clone(),
            photo_url: user.photo_url.clone(),
        }
    }
}

impl From<&AuthenticatedUser> for CurrentUser {
    fn from(auth: &AuthenticatedUser) -> Self {
        Self {
            id: auth.id,
            email: auth.email.clone(),
            role: auth.role,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_redacted_in_debug() {
        let user = AuthenticatedUser {
            id: 1,
            email: "a@b.com".into(),
            role: Role::Builder,
            token: "secret-token".into(),
        };
        let dbg = format!("{user:?}");
        assert!(!dbg.contains("secret-token"));
    }
}
