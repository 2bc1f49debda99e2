// Identity and access management endpoints

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::http::{ApiContext, ApiResponse, HttpClient};
use crate::models::{
    AuthenticatedUserResource, ChangePasswordRequest, SignInRequest, SignUpRequest, UserResource,
};

/// Sign-in, sign-up and user lookups.
#[derive(Debug, Clone)]
pub struct IamApi {
    http: HttpClient,
    auth_path: String,
    users: Endpoint,
}

impl IamApi {
    pub fn new(ctx: &ApiContext) -> Result<Self, Error> {
        let http = HttpClient::new(ctx)?;
        Ok(Self {
            users: Endpoint::new(http.clone(), ctx.paths.users.clone()),
            auth_path: ctx.paths.authentication.trim_end_matches('/').to_owned(),
            http,
        })
    }

    /// `POST {auth}/sign-in`
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedUserResource, Error> {
        debug!(email, "signing in");
        let body = SignInRequest {
            email,
            password: password.expose_secret(),
        };
        self.http
            .post(&format!("{}/sign-in", self.auth_path), &body)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(error = %e, "sign-in failed"))
    }

    /// `POST {auth}/sign-up`
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        role: &str,
    ) -> Result<ApiResponse<UserResource>, Error> {
        debug!(email, role, "signing up");
        let body = SignUpRequest {
            email,
            password: password.expose_secret(),
            role,
        };
        self.http
            .post(&format!("{}/sign-up", self.auth_path), &body)
            .await
            .inspect_err(|e| warn!(error = %e, "sign-up failed"))
    }

    /// `GET {users}`
    pub async fn users(&self) -> Result<ApiResponse<Vec<UserResource>>, Error> {
        self.users
            .get_all()
            .await
            .inspect_err(|e| warn!(error = %e, "failed to list users"))
    }

    /// `GET {users}/{id}`
    pub async fn user(&self, id: u64) -> Result<UserResource, Error> {
        self.users
            .get_by_id(id)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to fetch user"))
    }

    /// `PUT {users}/{id}/password`
    pub async fn change_password(
        &self,
        id: u64,
        current: &SecretString,
        new: &SecretString,
        confirm: &SecretString,
    ) -> Result<(), Error> {
        let body = ChangePasswordRequest {
            current_password: current.expose_secret(),
            new_password: new.expose_secret(),
            confirm_new_password: confirm.expose_secret(),
        };
        let path = format!("{}/password", self.users.item_path(id));
        self.http
            .put::<serde::de::IgnoredAny, _>(&path, &body)
            .await
            .map(|_| ())
            .inspect_err(|e| warn!(id, error = %e, "password change failed"))
    }
}
