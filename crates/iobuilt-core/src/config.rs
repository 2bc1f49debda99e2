// ── Runtime configuration ──
//
// What the stores need to talk to a backend. Built by `iobuilt-config`
// from files and environment, or directly by embedders and tests.

use std::sync::Arc;
use std::time::Duration;

use iobuilt_api::{ApiContext, EndpointPaths, Navigator, SessionStore, TransportConfig};
use url::Url;

use crate::model::Role;

/// Identity used when no signed-in user is available, so builder/owner
/// views can run against a development backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulatedSession {
    pub user_id: Option<u64>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: Url,
    pub paths: EndpointPaths,
    /// Where the navigator is sent when the backend rejects the session.
    pub login_path: String,
    /// Front-end origin used for payment redirect URLs.
    pub app_origin: String,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub simulated_session: SimulatedSession,
}

impl AppConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            paths: EndpointPaths::default(),
            login_path: "/login".into(),
            app_origin: "http://localhost:5173".into(),
            timeout: None,
            simulated_session: SimulatedSession::default(),
        }
    }

    /// The shared context every API class is built from.
    pub fn api_context(
        &self,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ApiContext {
        let transport = TransportConfig {
            timeout: self.timeout,
        };
        ApiContext::new(self.api_url.clone(), session, navigator)
            .with_paths(self.paths.clone())
            .with_login_path(self.login_path.clone())
            .with_app_origin(self.app_origin.clone())
            .with_transport(transport)
    }
}
