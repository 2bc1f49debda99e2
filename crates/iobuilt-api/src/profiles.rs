// Profile endpoints
//
// A profile is the user record merged with its `user_details` row.

use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::http::{ApiContext, ApiResponse, HttpClient};
use crate::models::{ProfileResource, SecondEmailRequest, UserDetailResource, UserResource};

#[derive(Debug, Clone)]
pub struct ProfileApi {
    http: HttpClient,
    users: Endpoint,
    details: Endpoint,
}

impl ProfileApi {
    pub fn new(ctx: &ApiContext) -> Result<Self, Error> {
        let http = HttpClient::new(ctx)?;
        Ok(Self {
            users: Endpoint::new(http.clone(), ctx.paths.users.clone()),
            details: Endpoint::new(http.clone(), ctx.paths.user_details.clone()),
            http,
        })
    }

    /// `GET {users}/{id}` then `GET {user_details}?userId={id}`, merged.
    ///
    /// A user id of 0 means "no user" and is rejected before any request.
    pub async fn profile(&self, user_id: u64) -> Result<ProfileResource, Error> {
        if user_id == 0 {
            return Err(Error::MissingArgument("user id"));
        }

        let user: UserResource = self
            .users
            .get_by_id(user_id)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(user_id, error = %e, "failed to fetch user for profile"))?;

        let details: ApiResponse<Vec<UserDetailResource>> = self
            .details
            .get_where(&[("userId", user_id.to_string())])
            .await
            .inspect_err(|e| warn!(user_id, error = %e, "failed to fetch user details"))?;

        let detail = details.data.and_then(|rows| rows.into_iter().next());
        debug!(user_id, has_detail = detail.is_some(), "profile assembled");
        Ok(ProfileResource::merge(user, detail))
    }

    /// `POST {user_details}`
    pub async fn create_profile(
        &self,
        detail: &UserDetailResource,
    ) -> Result<UserDetailResource, Error> {
        self.details
            .create(detail)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(error = %e, "failed to create profile"))
    }

    /// `PUT {user_details}/{id}`
    pub async fn update_profile(
        &self,
        id: u64,
        detail: &UserDetailResource,
    ) -> Result<UserDetailResource, Error> {
        self.details
            .update(id, detail)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to update profile"))
    }

    /// `PATCH {users}/{id}/profiles`
    pub async fn set_second_email(
        &self,
        user_id: u64,
        email: &str,
    ) -> Result<ApiResponse<serde_json::Value>, Error> {
        let path = format!("{}/profiles", self.users.item_path(user_id));
        self.http
            .patch(&path, &SecondEmailRequest {
                second_email: email,
            })
            .await
            .inspect_err(|e| warn!(user_id, error = %e, "failed to set second email"))
    }
}
