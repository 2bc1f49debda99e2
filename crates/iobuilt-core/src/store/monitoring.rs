// ── Monitoring store ──
//
// Role-dependent dashboard data: devices enriched with their live
// configuration, the builder's projects, analytics and statistics.

use std::collections::BTreeMap;

use futures_util::future::try_join_all;
use iobuilt_api::models::{DeviceResource, Statistics};
use iobuilt_api::{AnalyticsQuery, ApiContext, Error as ApiError, MonitoringApi};
use tracing::debug;

use super::state::{ErrorLog, LoadingFlag, Observable, RequestFence};
use crate::config::SimulatedSession;
use crate::convert::entities_from_response;
use crate::error::CoreError;
use crate::facade::{ActingUser, IamFacade};
use crate::model::{AnalyticsRecord, Device, Project, Role};
use crate::stream::StateStream;

#[derive(Debug)]
pub struct MonitoringStore {
    api: MonitoringApi,
    iam: IamFacade,
    simulated: SimulatedSession,
    devices: Observable<Vec<Device>>,
    projects: Observable<Vec<Project>>,
    analytics: Observable<Vec<AnalyticsRecord>>,
    current_project: Observable<Option<Project>>,
    current_device: Observable<Option<Device>>,
    loading: LoadingFlag,
    init_loading: LoadingFlag,
    analytics_loading: LoadingFlag,
    errors: ErrorLog,
    devices_fence: RequestFence,
    projects_fence: RequestFence,
    analytics_fence: RequestFence,
}

impl MonitoringStore {
    pub fn new(
        ctx: &ApiContext,
        iam: IamFacade,
        simulated: SimulatedSession,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            api: MonitoringApi::new(ctx)?,
            iam,
            simulated,
            devices: Observable::default(),
            projects: Observable::default(),
            analytics: Observable::default(),
            current_project: Observable::new(None),
            current_device: Observable::new(None),
            loading: LoadingFlag::new(),
            init_loading: LoadingFlag::new(),
            analytics_loading: LoadingFlag::new(),
            errors: ErrorLog::new(),
            devices_fence: RequestFence::new(),
            projects_fence: RequestFence::new(),
            analytics_fence: RequestFence::new(),
        })
    }

    fn acting_user(&self, action: &'static str) -> Option<ActingUser> {
        self.iam
            .acting_user(&self.simulated)
            .map_err(|e| self.errors.record(action, e))
            .ok()
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Builders see every device, owners only their own. Each device is
    /// merged with its configuration; one failed lookup fails the fetch.
    pub async fn fetch_devices(&self) -> Vec<Device> {
        let _loading = self.loading.guard();
        let ticket = self.devices_fence.ticket();
        let Some(user) = self.acting_user("fetch_devices") else {
            return Vec::new();
        };

        let devices = match self.load_devices(user).await {
            Ok(devices) => devices,
            Err(e) => {
                self.errors.record("fetch_devices", e.into());
                return Vec::new();
            }
        };

        if self.devices_fence.is_current(ticket) {
            debug!(count = devices.len(), role = %user.role, "monitoring devices loaded");
            self.devices.set(devices.clone());
        }
        devices
    }

    async fn load_devices(&self, user: ActingUser) -> Result<Vec<Device>, ApiError> {
        let resp = match user.role {
            Role::Builder => self.api.devices().await?,
            Role::Owner => self.api.devices_by_owner(user.id).await?,
        };
        let rows: Vec<DeviceResource> = if resp.is_success() {
            resp.data.unwrap_or_default()
        } else {
            Vec::new()
        };

        let configs = try_join_all(rows.iter().map(|row| async move {
            match row.id {
                Some(id) => self.api.device_configuration(id).await,
                None => Ok(None),
            }
        }))
        .await?;

        Ok(rows.into_iter().zip(configs).map(Device::from).collect())
    }

    /// The builder's projects. Owners have none and no request is made.
    pub async fn fetch_projects(&self) -> Vec<Project> {
        let Some(user) = self.acting_user("fetch_projects") else {
            return Vec::new();
        };
        if !user.role.is_builder() {
            return Vec::new();
        }

        let _loading = self.loading.guard();
        let ticket = self.projects_fence.ticket();
        let projects: Vec<Project> = match self.api.projects_by_builder(user.id).await {
            Ok(resp) => entities_from_response(resp),
            Err(e) => {
                self.errors.record("fetch_projects", e.into());
                return Vec::new();
            }
        };

        if self.projects_fence.is_current(ticket) {
            self.projects.set(projects.clone());
        }
        projects
    }

    pub async fn fetch_analytics(&self, query: &AnalyticsQuery) -> Vec<AnalyticsRecord> {
        let _loading = self.analytics_loading.guard();
        let ticket = self.analytics_fence.ticket();
        let records: Vec<AnalyticsRecord> = match self.api.analytics(query).await {
            Ok(resp) => entities_from_response(resp),
            Err(e) => {
                self.errors.record("fetch_analytics", e.into());
                return Vec::new();
            }
        };

        if self.analytics_fence.is_current(ticket) {
            self.analytics.set(records.clone());
        }
        records
    }

    /// Statistics for the acting owner. Empty on failure.
    pub async fn fetch_owner_statistics(&self) -> Statistics {
        let Some(user) = self.acting_user("fetch_owner_statistics") else {
            return Statistics::new();
        };
        let _loading = self.loading.guard();
        self.api
            .owner_statistics(user.id)
            .await
            .map_err(|e| self.errors.record("fetch_owner_statistics", e.into()))
            .unwrap_or_default()
    }

    pub async fn fetch_project_statistics(&self, project_id: u64) -> Statistics {
        let _loading = self.loading.guard();
        self.api
            .project_statistics(project_id)
            .await
            .map_err(|e| self.errors.record("fetch_project_statistics", e.into()))
            .unwrap_or_default()
    }

    /// Fresh load for the dashboard: devices, then projects for builders.
    pub async fn initialize(&self) {
        self.clear_errors();
        let _loading = self.init_loading.guard();
        self.fetch_devices().await;
        if self
            .iam
            .acting_user(&self.simulated)
            .is_ok_and(|u| u.role.is_builder())
        {
            self.fetch_projects().await;
        }
    }

    pub fn set_current_project(&self, project: Option<Project>) {
        self.current_project.set(project);
    }

    pub fn set_current_device(&self, device: Option<Device>) {
        self.current_device.set(device);
    }

    pub fn clear_errors(&self) {
        self.errors.clear();
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn devices(&self) -> Vec<Device> {
        self.devices.get()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.projects.get()
    }

    pub fn analytics(&self) -> Vec<AnalyticsRecord> {
        self.analytics.get()
    }

    pub fn current_project(&self) -> Option<Project> {
        self.current_project.get()
    }

    pub fn current_device(&self) -> Option<Device> {
        self.current_device.get()
    }

    pub fn devices_count(&self) -> usize {
        self.devices.with(Vec::len)
    }

    pub fn online_devices_count(&self) -> usize {
        self.devices
            .with(|list| list.iter().filter(|d| d.is_online()).count())
    }

    /// Devices reported offline; warning and unknown are not counted.
    pub fn offline_devices_count(&self) -> usize {
        self.devices
            .with(|list| list.iter().filter(|d| d.is_offline()).count())
    }

    pub fn projects_count(&self) -> usize {
        self.projects.with(Vec::len)
    }

    pub fn active_projects_count(&self) -> usize {
        self.projects
            .with(|list| list.iter().filter(|p| p.is_active()).count())
    }

    pub fn total_units(&self) -> u64 {
        self.projects
            .with(|list| list.iter().map(|p| u64::from(p.total_units)).sum())
    }

    pub fn occupied_units(&self) -> u64 {
        self.projects
            .with(|list| list.iter().map(|p| u64::from(p.occupied_units)).sum())
    }

    /// Percentage over all projects; 0 without units.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn occupancy_rate(&self) -> f64 {
        let total = self.total_units();
        if total == 0 {
            0.0
        } else {
            self.occupied_units() as f64 / total as f64 * 100.0
        }
    }

    pub fn devices_by_type(&self) -> BTreeMap<String, usize> {
        self.devices.with(|list| {
            let mut counts = BTreeMap::new();
            for device in list {
                *counts.entry(device.device_type.clone()).or_insert(0) += 1;
            }
            counts
        })
    }

    pub fn subscribe_devices(&self) -> StateStream<Vec<Device>> {
        self.devices.subscribe()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn init_loading(&self) -> &LoadingFlag {
        &self.init_loading
    }

    pub fn analytics_loading(&self) -> &LoadingFlag {
        &self.analytics_loading
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }
}

