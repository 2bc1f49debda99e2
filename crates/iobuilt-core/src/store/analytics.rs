// ── Analytics store ──
//
// Role dashboards and historical series for charts.

use chrono::{DateTime, Utc};
use iobuilt_api::models::{BuilderDashboardResource, OwnerDashboardResource};
use iobuilt_api::{AnalyticsApi, ApiContext};
use tracing::debug;

use super::state::{ErrorLog, LoadingFlag, Observable, RequestFence};
use crate::config::SimulatedSession;
use crate::error::CoreError;
use crate::facade::IamFacade;
use crate::model::{BuilderDashboard, HistoricalDataPoint, OwnerDashboard, Role};
use crate::stream::StateStream;

#[derive(Debug)]
pub struct AnalyticsStore {
    api: AnalyticsApi,
    iam: IamFacade,
    simulated: SimulatedSession,
    builder_dashboard: Observable<Option<BuilderDashboard>>,
    owner_dashboard: Observable<Option<OwnerDashboard>>,
    historical: Observable<Vec<HistoricalDataPoint>>,
    loading: LoadingFlag,
    errors: ErrorLog,
    builder_fence: RequestFence,
    owner_fence: RequestFence,
    history_fence: RequestFence,
}

impl AnalyticsStore {
    pub fn new(
        ctx: &ApiContext,
        iam: IamFacade,
        simulated: SimulatedSession,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            api: AnalyticsApi::new(ctx)?,
            iam,
            simulated,
            builder_dashboard: Observable::new(None),
            owner_dashboard: Observable::new(None),
            historical: Observable::default(),
            loading: LoadingFlag::new(),
            errors: ErrorLog::new(),
            builder_fence: RequestFence::new(),
            owner_fence: RequestFence::new(),
            history_fence: RequestFence::new(),
        })
    }

    /// The explicit id, or the acting user's.
    fn resolve_user(&self, explicit: Option<u64>, action: &'static str) -> Option<u64> {
        explicit.or_else(|| {
            self.iam
                .acting_user(&self.simulated)
                .map(|u| u.id)
                .map_err(|e| self.errors.record(action, e))
                .ok()
        })
    }

    // ── Actions ──────────────────────────────────────────────────────

    pub async fn fetch_builder_dashboard(&self, builder_id: Option<u64>) -> Option<BuilderDashboard> {
        let id = self.resolve_user(builder_id, "fetch_builder_dashboard")?;
        let _loading = self.loading.guard();
        let ticket = self.builder_fence.ticket();

        let dashboard = self
            .api
            .dashboard_metrics::<BuilderDashboardResource>(id, Role::Builder.as_ref())
            .await
            .map(BuilderDashboard::from)
            .map_err(|e| self.errors.record("fetch_builder_dashboard", e.into()))
            .ok()?;

        if self.builder_fence.is_current(ticket) {
            debug!(builder_id = id, "builder dashboard loaded");
            self.builder_dashboard.set(Some(dashboard.clone()));
        }
        Some(dashboard)
    }

    pub async fn fetch_owner_dashboard(&self, owner_id: Option<u64>) -> Option<OwnerDashboard> {
        let id = self.resolve_user(owner_id, "fetch_owner_dashboard")?;
        let _loading = self.loading.guard();
        let ticket = self.owner_fence.ticket();

        let dashboard = self
            .api
            .dashboard_metrics::<OwnerDashboardResource>(id, Role::Owner.as_ref())
            .await
            .map(OwnerDashboard::from)
            .map_err(|e| self.errors.record("fetch_owner_dashboard", e.into()))
            .ok()?;

        if self.owner_fence.is_current(ticket) {
            debug!(owner_id = id, "owner dashboard loaded");
            self.owner_dashboard.set(Some(dashboard.clone()));
        }
        Some(dashboard)
    }

    /// Series of `metric` for a project, optionally bounded in time.
    pub async fn fetch_historical_data(
        &self,
        project_id: u64,
        metric: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<HistoricalDataPoint> {
        let _loading = self.loading.guard();
        let ticket = self.history_fence.ticket();

        let points: Vec<HistoricalDataPoint> =
            match self.api.insights(project_id, metric, start, end).await {
                Ok(rows) => rows.into_iter().map(HistoricalDataPoint::from).collect(),
                Err(e) => {
                    self.errors.record("fetch_historical_data", e.into());
                    return Vec::new();
                }
            };

        if self.history_fence.is_current(ticket) {
            self.historical.set(points.clone());
        }
        points
    }

    pub fn clear_errors(&self) {
        self.errors.clear();
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn builder_dashboard(&self) -> Option<BuilderDashboard> {
        self.builder_dashboard.get()
    }

    pub fn owner_dashboard(&self) -> Option<OwnerDashboard> {
        self.owner_dashboard.get()
    }

    pub fn historical_data(&self) -> Vec<HistoricalDataPoint> {
        self.historical.get()
    }

    pub fn subscribe_historical_data(&self) -> StateStream<Vec<HistoricalDataPoint>> {
        self.historical.subscribe()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }
}
