// ── Profile store ──
//
// The signed-in user's personal details. Identity fields (email, role) are
// owned by IAM and overlaid from the facade on every fetch.

use iobuilt_api::models::UserDetailResource;
use iobuilt_api::{ApiContext, ProfileApi};
use tracing::debug;

use super::state::{ErrorLog, LoadingFlag, Observable, RequestFence};
use crate::error::CoreError;
use crate::facade::IamFacade;
use crate::model::{Profile, Role};
use crate::stream::StateStream;

#[derive(Debug)]
pub struct ProfileStore {
    api: ProfileApi,
    iam: IamFacade,
    profile: Observable<Profile>,
    view_type: Observable<Option<Role>>,
    loaded: Observable<bool>,
    loading: LoadingFlag,
    errors: ErrorLog,
    fence: RequestFence,
}

impl ProfileStore {
    pub fn new(ctx: &ApiContext, iam: IamFacade) -> Result<Self, CoreError> {
        Ok(Self {
            api: ProfileApi::new(ctx)?,
            iam,
            profile: Observable::default(),
            view_type: Observable::new(None),
            loaded: Observable::new(false),
            loading: LoadingFlag::new(),
            errors: ErrorLog::new(),
            fence: RequestFence::new(),
        })
    }

    fn overlay_identity(&self, profile: &mut Profile) {
        if let Some(email) = self.iam.current_user_email() {
            profile.email = email;
        }
        if let Some(role) = self.iam.current_user_role() {
            profile.role = Some(role);
        }
    }

    // ── Actions ──────────────────────────────────────────────────────

    pub async fn fetch_profile(&self, user_id: u64) -> Option<Profile> {
        let _loading = self.loading.guard();
        let ticket = self.fence.ticket();

        let mut profile = match self.api.profile(user_id).await {
            Ok(resource) => Profile::from(resource),
            Err(e) => {
                self.errors.record("fetch_profile", e.into());
                if self.fence.is_current(ticket) {
                    self.loaded.set(false);
                }
                return None;
            }
        };
        self.overlay_identity(&mut profile);

        if self.fence.is_current(ticket) {
            self.view_type.set(Some(profile.view_type()));
            self.profile.set(profile.clone());
            self.loaded.set(true);
        } else {
            debug!(user_id, "discarding stale profile response");
        }
        Some(profile)
    }

    /// Profile of the signed-in user.
    pub async fn fetch_current_profile(&self) -> Option<Profile> {
        match self.iam.current_user_id() {
            Ok(id) => self.fetch_profile(id).await,
            Err(e) => {
                self.errors.record("fetch_current_profile", e);
                None
            }
        }
    }

    pub async fn create_profile(&self, profile: &Profile) -> Result<Profile, CoreError> {
        let _loading = self.loading.guard();
        let mut created = self
            .api
            .create_profile(&UserDetailResource::from(profile))
            .await
            .map(Profile::from)
            .map_err(|e| self.errors.capture("create_profile", e))?;
        self.overlay_identity(&mut created);
        Ok(created)
    }

    /// Update the detail row `id`. The published profile is replaced when
    /// it is the one being edited.
    pub async fn update_profile(&self, id: u64, profile: &Profile) -> Result<Profile, CoreError> {
        let _loading = self.loading.guard();
        let mut updated = self
            .api
            .update_profile(id, &UserDetailResource::from(profile))
            .await
            .map(Profile::from)
            .map_err(|e| self.errors.capture("update_profile", e))?;
        self.overlay_identity(&mut updated);

        if self.loaded.get() && self.profile.with(|p| p.id == id) {
            self.profile.set(updated.clone());
        }
        Ok(updated)
    }

    /// Set the secondary email of the signed-in user.
    pub async fn set_second_email(&self, email: &str) -> Result<(), CoreError> {
        let user_id = self
            .iam
            .current_user_id()
            .map_err(|e| self.errors.capture("set_second_email", e))?;

        let _loading = self.loading.guard();
        self.api
            .set_second_email(user_id, email)
            .await
            .map_err(|e| self.errors.capture("set_second_email", e))?;

        if self.profile.with(|p| p.user_id == user_id) {
            self.profile.update(|p| p.second_email = email.to_owned());
        }
        Ok(())
    }

    /// Back to the fresh state, as after sign-out.
    pub fn reset(&self) {
        self.profile.set(Profile::default());
        self.view_type.set(None);
        self.loaded.set(false);
        self.errors.clear();
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn profile(&self) -> Profile {
        self.profile.get()
    }

    pub fn view_type(&self) -> Option<Role> {
        self.view_type.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    pub fn subscribe_profile(&self) -> StateStream<Profile> {
        self.profile.subscribe()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }
}
