use iobuilt_api::models::{AuthenticatedUserResource, UserResource};

use crate::model::{AuthenticatedUser, Role, User};

impl From<AuthenticatedUserResource> for AuthenticatedUser {
    fn from(r: AuthenticatedUserResource) -> Self {
        Self {
            id: r.id.unwrap_or_default(),
            email: r.email,
            role: Role::parse(&r.role).unwrap_or_default(),
            token: r.token,
        }
    }
}

impl From<UserResource> for User {
    fn from(r: UserResource) -> Self {
        Self {
            id: r.id,
            email: r.email.unwrap_or_default(),
            role: r.role.as_deref().and_then(Role::parse).unwrap_or_default(),
        }
    }
}

impl From<&User> for UserResource {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: Some(user.email.clone()),
            role: Some(user.role.to_string()),
            ..Self::default()
        }
    }
}
