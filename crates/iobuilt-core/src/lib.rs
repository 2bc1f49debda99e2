//! Data-access layer between `iobuilt-api` and IoBuilt front ends.
//!
//! This crate owns the domain model, the API-to-domain assemblers and the
//! reactive state stores for the IoBuilt workspace:
//!
//! - **[`App`]** -- Root container. Builds one store per bounded context
//!   (IAM, Profiles, Projects, Clients, Devices, Subscriptions, Monitoring,
//!   Analytics) over a shared session and performs sign-out cleanup.
//!
//! - **Stores** ([`store`]) -- Each action raises a [`LoadingFlag`] for its
//!   duration, records failures in a bounded [`ErrorLog`] and publishes
//!   state through [`Observable`] values. Fetches are fenced so a stale
//!   response never overwrites a newer one.
//!
//! - **Facades** ([`facade`]) -- Read-only views one context offers another:
//!   [`IamFacade`] over the persisted session and [`ProjectsFacade`] over the
//!   project store.
//!
//! - **Assemblers** ([`convert`]) -- `From` conversions between wire
//!   resources and domain entities, with defaults for absent fields.
//!
//! - **[`StateStream<T>`]** -- Subscription handle with `current()` /
//!   `latest()` / `changed()` and a `Stream` adapter.

pub mod app;
pub mod config;
pub mod convert;
pub mod error;
pub mod facade;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use app::App;
pub use config::{AppConfig, SimulatedSession};
pub use error::CoreError;
pub use facade::{ActingUser, IamFacade, ProjectsFacade};
pub use store::{
    AnalyticsStore, ClientStore, DeviceStore, ErrorEntry, ErrorLog, IamStore, LoadingFlag,
    MonitoringStore, Observable, ProfileStore, ProfileSummary, ProjectStore, SubscriptionStore,
};
pub use stream::StateStream;

pub use model::{
    AnalyticsRecord, AuthenticatedUser, BuilderDashboard, CheckoutSession, Client, CurrentUser,
    Device, DeviceReading, DeviceStatus, HistoricalDataPoint, Invoice, OwnerDashboard,
    PaymentConfirmation, Plan, Profile, Project, Role, Subscription, SubscriptionPlan, User,
};
