// ── IAM store ──
//
// Sign-in/up/out and the persisted session. The only writer of the session
// besides the HTTP 401 handler.

use std::sync::Arc;

use iobuilt_api::{ApiContext, IamApi, ProfileApi, SessionStore, StoredUser};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use super::state::{ErrorLog, LoadingFlag, Observable};
use crate::convert::entities_from_response;
use crate::error::CoreError;
use crate::facade::IamFacade;
use crate::model::{AuthenticatedUser, CurrentUser, Profile, Role, User};
use crate::stream::StateStream;

/// Display fields copied from the profile onto the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSummary {
    pub username: Option<String>,
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_owned());
        Self {
            username: non_empty(&profile.username),
            name: non_empty(&profile.name),
            photo_url: non_empty(&profile.photo_url),
        }
    }
}

pub struct IamStore {
    api: IamApi,
    profiles: ProfileApi,
    session: Arc<dyn SessionStore>,
    current_user: Observable<Option<CurrentUser>>,
    token: Observable<Option<String>>,
    users: Observable<Vec<User>>,
    loading: LoadingFlag,
    errors: ErrorLog,
}

impl std::fmt::Debug for IamStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamStore")
            .field("current_user", &self.current_user.get())
            .field("users", &self.users.with(Vec::len))
            .finish_non_exhaustive()
    }
}

impl IamStore {
    /// Builds the store and restores any persisted session.
    pub fn new(ctx: &ApiContext) -> Result<Self, CoreError> {
        let store = Self {
            api: IamApi::new(ctx)?,
            profiles: ProfileApi::new(ctx)?,
            session: Arc::clone(&ctx.session),
            current_user: Observable::new(None),
            token: Observable::new(None),
            users: Observable::default(),
            loading: LoadingFlag::new(),
            errors: ErrorLog::new(),
        };
        store.load_from_session();
        Ok(store)
    }

    /// Read-only view over the same session, for other contexts.
    pub fn facade(&self) -> IamFacade {
        IamFacade::new(self.session.clone())
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Authenticate, persist `token` and `currentUser`, then try to enrich
    /// the user with profile display fields.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedUser, CoreError> {
        let _loading = self.loading.guard();

        let user = self
            .api
            .sign_in(email, password)
            .await
            .map(AuthenticatedUser::from)
            .map_err(|e| self.errors.capture("sign_in", e))?;

        let current = CurrentUser::from(&user);
        self.session.save(&user.token, &StoredUser::from(&current));
        self.token.set(Some(user.token.clone()));
        self.current_user.set(Some(current));
        info!(user_id = user.id, role = %user.role, "signed in");

        match self.profiles.profile(user.id).await {
            Ok(resource) => {
                let profile = Profile::from(resource);
                self.update_user_profile(&ProfileSummary::from(&profile));
            }
            Err(e) => warn!(user_id = user.id, error = %e, "profile unavailable after sign-in"),
        }

        Ok(user)
    }

    /// Register a new account. Does not sign in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        role: Role,
    ) -> Result<Option<User>, CoreError> {
        let _loading = self.loading.guard();
        let resp = self
            .api
            .sign_up(email, password, role.as_ref())
            .await
            .map_err(|e| self.errors.capture("sign_up", e))?;
        info!(email, %role, status = resp.status, "signed up");
        Ok(resp.data.map(User::from))
    }

    /// Drop the session from memory and storage.
    pub fn sign_out(&self) {
        self.session.clear();
        self.current_user.set(None);
        self.token.set(None);
        info!("signed out");
    }

    /// Adopt the persisted session when both keys are present. Returns
    /// whether a session was restored.
    pub fn load_from_session(&self) -> bool {
        match (self.session.token(), self.session.current_user()) {
            (Some(token), Some(user)) => {
                debug!(user_id = user.id, "restored session");
                self.token.set(Some(token));
                self.current_user.set(Some(CurrentUser::from(user)));
                true
            }
            _ => false,
        }
    }

    /// Overwrite the display fields of the signed-in user and persist.
    /// Absent fields are left untouched. No-op without a user.
    pub fn update_user_profile(&self, summary: &ProfileSummary) {
        let Some(mut user) = self.current_user.get() else {
            return;
        };
        if let Some(username) = &summary.username {
            user.username = Some(username.clone());
        }
        if let Some(name) = &summary.name {
            user.name = Some(name.clone());
        }
        if let Some(photo_url) = &summary.photo_url {
            user.photo_url = Some(photo_url.clone());
        }
        self.session.set_current_user(&StoredUser::from(&user));
        self.current_user.set(Some(user));
    }

    pub async fn fetch_users(&self) -> Vec<User> {
        let _loading = self.loading.guard();
        match self.api.users().await {
            Ok(resp) => {
                let users: Vec<User> = entities_from_response(resp);
                self.users.set(users.clone());
                users
            }
            Err(e) => {
                self.errors.record("fetch_users", e.into());
                Vec::new()
            }
        }
    }

    pub async fn fetch_user_by_id(&self, id: u64) -> Option<User> {
        let _loading = self.loading.guard();
        self.api
            .user(id)
            .await
            .map(User::from)
            .map_err(|e| self.errors.record("fetch_user_by_id", e.into()))
            .ok()
    }

    /// Change the signed-in user's password. Validation is left to the
    /// backend.
    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
        confirm: &SecretString,
    ) -> Result<(), CoreError> {
        let id = self
            .current_user
            .with(|u| u.as_ref().map(|u| u.id))
            .or_else(|| self.session.current_user().map(|u| u.id))
            .filter(|id| *id != 0)
            .ok_or_else(|| self.errors.capture("change_password", CoreError::NotAuthenticated))?;

        let _loading = self.loading.guard();
        self.api
            .change_password(id, current, new, confirm)
            .await
            .map_err(|e| self.errors.capture("change_password", e))?;
        info!(user_id = id, "password changed");
        Ok(())
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.current_user.get()
    }

    pub fn token(&self) -> Option<String> {
        self.token.get()
    }

    pub fn users(&self) -> Vec<User> {
        self.users.get()
    }

    /// Reads the persisted session, so a 401 clear is reflected at once.
    pub fn is_authenticated(&self) -> bool {
        self.facade().is_authenticated()
    }

    pub fn user_role(&self) -> Option<Role> {
        self.current_user.with(|u| u.as_ref().map(|u| u.role))
    }

    pub fn subscribe_current_user(&self) -> StateStream<Option<CurrentUser>> {
        self.current_user.subscribe()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use iobuilt_api::{MemorySessionStore, NoopNavigator, SessionReader};
    use url::Url;

    use super::*;

    fn store_with(session: Arc<MemorySessionStore>) -> IamStore {
        let ctx = ApiContext::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            session,
            Arc::new(NoopNavigator),
        );
        IamStore::new(&ctx).unwrap()
    }

    fn stored() -> StoredUser {
        StoredUser {
            id: 3,
            email: "o@b.com".into(),
            role: "owner".into(),
            username: None,
            name: None,
            photo_url: None,
        }
    }

    #[test]
    fn restores_persisted_session_on_construction() {
        let session = Arc::new(MemorySessionStore::new());
        session.save("T", &stored());
        let store = store_with(session);
        assert_eq!(store.token().as_deref(), Some("T"));
        assert_eq!(store.current_user().unwrap().id, 3);
        assert_eq!(store.user_role(), Some(Role::Owner));
        assert!(store.is_authenticated());
    }

    #[test]
    fn sign_out_clears_memory_and_storage() {
        let session = Arc::new(MemorySessionStore::new());
        session.save("T", &stored());
        let store = store_with(session.clone());
        store.sign_out();
        assert!(store.current_user().is_none());
        assert!(store.token().is_none());
        assert!(session.token().is_none());
        assert!(session.current_user().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn profile_summary_only_sets_present_fields() {
        let session = Arc::new(MemorySessionStore::new());
        session.save("T", &stored());
        let store = store_with(session.clone());

        store.update_user_profile(&ProfileSummary {
            username: Some("olga".into()),
            name: None,
            photo_url: None,
        });
        let persisted = session.current_user().unwrap();
        assert_eq!(persisted.username.as_deref(), Some("olga"));
        assert!(persisted.name.is_none());
    }

    #[test]
    fn profile_summary_without_user_is_noop() {
        let session = Arc::new(MemorySessionStore::new());
        let store = store_with(session.clone());
        store.update_user_profile(&ProfileSummary {
            username: Some("ghost".into()),
            ..ProfileSummary::default()
        });
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn change_password_requires_a_user() {
        let store = store_with(Arc::new(MemorySessionStore::new()));
        let secret: SecretString = "x".to_string().into();
        let result = store.change_password(&secret, &secret, &secret).await;
        assert_eq!(result, Err(CoreError::NotAuthenticated));
        assert_eq!(store.errors().last(), Some(CoreError::NotAuthenticated));
        assert!(!store.loading().is_loading());
    }
}
