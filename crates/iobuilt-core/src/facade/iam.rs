// IAM as seen by the other contexts: read-only over the persisted session.

use std::sync::Arc;

use iobuilt_api::{SessionReader, StoredUser};

use crate::config::SimulatedSession;
use crate::error::CoreError;
use crate::model::Role;

/// The user a store acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    pub id: u64,
    pub role: Role,
}

#[derive(Clone)]
pub struct IamFacade {
    session: Arc<dyn SessionReader>,
}

impl std::fmt::Debug for IamFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamFacade")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl IamFacade {
    pub fn new(session: Arc<dyn SessionReader>) -> Self {
        Self { session }
    }

    /// Stored user with a usable (non-zero) id.
    fn user(&self) -> Option<StoredUser> {
        self.session.current_user().filter(|u| u.id != 0)
    }

    /// Id of the signed-in user.
    ///
    /// `NotAuthenticated` with no session at all; `SessionIncomplete` when a
    /// token exists but the user record is missing or unreadable.
    pub fn current_user_id(&self) -> Result<u64, CoreError> {
        if let Some(user) = self.user() {
            return Ok(user.id);
        }
        if self.session.token().is_some() {
            Err(CoreError::SessionIncomplete)
        } else {
            Err(CoreError::NotAuthenticated)
        }
    }

    pub fn current_user_email(&self) -> Option<String> {
        self.user().map(|u| u.email).filter(|e| !e.is_empty())
    }

    pub fn current_user_username(&self) -> Option<String> {
        self.user().and_then(|u| u.username).filter(|n| !n.is_empty())
    }

    pub fn current_user_role(&self) -> Option<Role> {
        self.user().and_then(|u| Role::parse(&u.role))
    }

    /// Both the token and the user record are present.
    pub fn is_authenticated(&self) -> bool {
        self.session.token().is_some() && self.user().is_some()
    }

    /// The signed-in user, or the configured simulated identity when nobody
    /// is signed in. Fails only when neither exists.
    pub fn acting_user(&self, fallback: &SimulatedSession) -> Result<ActingUser, CoreError> {
        match self.current_user_id() {
            Ok(id) => Ok(ActingUser {
                id,
                role: self
                    .current_user_role()
                    .or(fallback.role)
                    .unwrap_or_default(),
            }),
            Err(err) => fallback.user_id.map_or(Err(err), |id| {
                Ok(ActingUser {
                    id,
                    role: fallback.role.unwrap_or_default(),
                })
            }),
        }
    }
}
