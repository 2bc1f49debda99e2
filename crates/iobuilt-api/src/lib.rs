// iobuilt-api: Async Rust client for the IoBuilt REST backend.
//
// Layers, leaf-first: `transport` builds the reqwest client, `http` wraps it
// with bearer auth and 401 handling, `endpoint` provides generic CRUD over a
// resource path, and one API module per bounded context sits on top.

pub mod analytics;
pub mod clients;
pub mod devices;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod iam;
pub mod models;
pub mod monitoring;
pub mod paths;
pub mod plans;
pub mod profiles;
pub mod projects;
pub mod session;
pub mod subscriptions;
pub mod transport;

pub use analytics::AnalyticsApi;
pub use clients::ClientApi;
pub use devices::DeviceApi;
pub use endpoint::Endpoint;
pub use error::Error;
pub use http::{ApiContext, ApiResponse, HttpClient};
pub use iam::IamApi;
pub use monitoring::{AnalyticsQuery, MonitoringApi};
pub use paths::EndpointPaths;
pub use plans::PlanApi;
pub use profiles::ProfileApi;
pub use projects::ProjectApi;
pub use session::{
    MemorySessionStore, Navigator, NoopNavigator, SessionReader, SessionStore, StoredUser,
};
pub use subscriptions::SubscriptionApi;
pub use transport::TransportConfig;
