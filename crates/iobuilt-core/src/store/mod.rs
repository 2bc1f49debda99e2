// ── State stores ──
//
// One store per bounded context. Each owns its API class, publishes its
// state through `Observable`s, tracks a loading flag and keeps a bounded
// log of failures. Stores never call each other; cross-context reads go
// through the facades.

mod analytics;
mod client;
mod device;
mod iam;
mod monitoring;
mod profile;
mod project;
mod state;
mod subscription;

pub use analytics::AnalyticsStore;
pub use client::ClientStore;
pub use device::DeviceStore;
pub use iam::{IamStore, ProfileSummary};
pub use monitoring::MonitoringStore;
pub use profile::ProfileStore;
pub use project::ProjectStore;
pub use state::{
    DEFAULT_ERROR_CAPACITY, ErrorEntry, ErrorLog, LoadingFlag, LoadingGuard, Observable,
    RequestFence, Ticket,
};
pub use subscription::SubscriptionStore;
