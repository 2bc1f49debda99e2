// ── Application root ──
//
// Builds every store from one configuration and one session, and owns the
// flows that span contexts (sign-out cleanup).

use std::sync::Arc;

use iobuilt_api::{Navigator, SessionStore};
use tracing::info;

use crate::config::AppConfig;
use crate::error::CoreError;
use crate::facade::{IamFacade, ProjectsFacade};
use crate::store::{
    AnalyticsStore, ClientStore, DeviceStore, IamStore, MonitoringStore, ProfileStore,
    ProjectStore, SubscriptionStore,
};

/// Root container for consumers.
///
/// Cheaply cloneable via `Arc<AppInner>`. Every store shares the same
/// session; IAM writes it, everyone else reads it through `IamFacade`.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

struct AppInner {
    config: AppConfig,
    iam: IamStore,
    profile: ProfileStore,
    projects: Arc<ProjectStore>,
    clients: ClientStore,
    devices: DeviceStore,
    subscriptions: SubscriptionStore,
    monitoring: MonitoringStore,
    analytics: AnalyticsStore,
}

impl App {
    pub fn new(
        config: AppConfig,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, CoreError> {
        let ctx = config.api_context(session, navigator);
        let simulated = config.simulated_session.clone();

        let iam = IamStore::new(&ctx)?;
        let facade = iam.facade();
        let projects = Arc::new(ProjectStore::new(&ctx, facade.clone(), simulated.clone())?);
        let clients = ClientStore::new(&ctx, ProjectsFacade::new(Arc::clone(&projects)))?;

        Ok(Self {
            inner: Arc::new(AppInner {
                profile: ProfileStore::new(&ctx, facade.clone())?,
                devices: DeviceStore::new(&ctx)?,
                subscriptions: SubscriptionStore::new(&ctx, facade.clone(), simulated.clone())?,
                monitoring: MonitoringStore::new(&ctx, facade.clone(), simulated.clone())?,
                analytics: AnalyticsStore::new(&ctx, facade, simulated)?,
                iam,
                projects,
                clients,
                config,
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// End the session and reset the stores that hold personal state.
    pub fn sign_out(&self) {
        self.inner.iam.sign_out();
        self.inner.profile.reset();
        info!("session state reset");
    }

    pub fn facade(&self) -> IamFacade {
        self.inner.iam.facade()
    }

    pub fn iam(&self) -> &IamStore {
        &self.inner.iam
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.inner.profile
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.inner.projects
    }

    pub fn clients(&self) -> &ClientStore {
        &self.inner.clients
    }

    pub fn devices(&self) -> &DeviceStore {
        &self.inner.devices
    }

    pub fn subscriptions(&self) -> &SubscriptionStore {
        &self.inner.subscriptions
    }

    pub fn monitoring(&self) -> &MonitoringStore {
        &self.inner.monitoring
    }

    pub fn analytics(&self) -> &AnalyticsStore {
        &self.inner.analytics
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("api_url", &self.inner.config.api_url.as_str())
            .field("authenticated", &self.inner.iam.is_authenticated())
            .finish_non_exhaustive()
    }
}
