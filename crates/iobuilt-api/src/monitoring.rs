// Monitoring endpoints
//
// Read-only views over devices, projects, analytics and statistics, plus the
// per-device configuration collection used to enrich device listings.

use tracing::warn;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::http::{ApiContext, ApiResponse, HttpClient};
use crate::models::{
    AnalyticsResource, DeviceConfigurationResource, DeviceResource, ProjectResource, Statistics,
};

pub const DEFAULT_TIME_RANGE: &str = "24h";

/// Which analytics rows to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsQuery {
    /// `GET {devices}/{id}/analytics?timeRange=`
    Device { device_id: u64, time_range: String },
    /// `GET {analytics}?key=value...`
    Filters(Vec<(String, String)>),
}

impl AnalyticsQuery {
    pub fn device(device_id: u64) -> Self {
        Self::Device {
            device_id,
            time_range: DEFAULT_TIME_RANGE.into(),
        }
    }

    pub fn with_time_range(self, range: impl Into<String>) -> Self {
        match self {
            Self::Device { device_id, .. } => Self::Device {
                device_id,
                time_range: range.into(),
            },
            Self::Filters(filters) => Self::Filters(filters),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitoringApi {
    http: HttpClient,
    devices: Endpoint,
    projects: Endpoint,
    configurations: Endpoint,
    analytics_path: String,
}

impl MonitoringApi {
    pub fn new(ctx: &ApiContext) -> Result<Self, Error> {
        let http = HttpClient::new(ctx)?;
        Ok(Self {
            devices: Endpoint::new(http.clone(), ctx.paths.devices.clone()),
            projects: Endpoint::new(http.clone(), ctx.paths.projects.clone()),
            configurations: Endpoint::new(http.clone(), ctx.paths.device_configurations.clone()),
            analytics_path: ctx.paths.analytics.clone(),
            http,
        })
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn devices(&self) -> Result<ApiResponse<Vec<DeviceResource>>, Error> {
        self.devices
            .get_all()
            .await
            .inspect_err(|e| warn!(error = %e, "failed to list devices"))
    }

    pub async fn device(&self, id: u64) -> Result<DeviceResource, Error> {
        self.devices
            .get_by_id(id)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to fetch device"))
    }

    /// `GET {projects}/{id}/devices`
    pub async fn devices_by_project(
        &self,
        project_id: u64,
    ) -> Result<ApiResponse<Vec<DeviceResource>>, Error> {
        let path = format!("{}/devices", self.projects.item_path(project_id));
        self.http
            .get(&path)
            .await
            .inspect_err(|e| warn!(project_id, error = %e, "failed to list project devices"))
    }

    /// `GET /owners/{id}/devices`
    pub async fn devices_by_owner(
        &self,
        owner_id: u64,
    ) -> Result<ApiResponse<Vec<DeviceResource>>, Error> {
        self.http
            .get(&format!("/owners/{owner_id}/devices"))
            .await
            .inspect_err(|e| warn!(owner_id, error = %e, "failed to list owner devices"))
    }

    /// `GET {devices}/{id}/status`
    pub async fn device_status(&self, id: u64) -> Result<ApiResponse<serde_json::Value>, Error> {
        let path = format!("{}/status", self.devices.item_path(id));
        self.http
            .get(&path)
            .await
            .inspect_err(|e| warn!(id, error = %e, "failed to fetch device status"))
    }

    /// First `device_configurations` row for the device, if any.
    pub async fn device_configuration(
        &self,
        device_id: u64,
    ) -> Result<Option<DeviceConfigurationResource>, Error> {
        let resp: ApiResponse<Vec<DeviceConfigurationResource>> = self
            .configurations
            .get_where(&[("deviceId", device_id.to_string())])
            .await
            .inspect_err(|e| warn!(device_id, error = %e, "failed to fetch device configuration"))?;
        Ok(resp.data.and_then(|rows| rows.into_iter().next()))
    }

    // ── Projects ─────────────────────────────────────────────────────

    pub async fn projects(&self) -> Result<ApiResponse<Vec<ProjectResource>>, Error> {
        self.projects
            .get_all()
            .await
            .inspect_err(|e| warn!(error = %e, "failed to list projects"))
    }

    pub async fn project(&self, id: u64) -> Result<ProjectResource, Error> {
        self.projects
            .get_by_id(id)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to fetch project"))
    }

    /// `GET /builders/{id}/projects`
    pub async fn projects_by_builder(
        &self,
        builder_id: u64,
    ) -> Result<ApiResponse<Vec<ProjectResource>>, Error> {
        self.http
            .get(&format!("/builders/{builder_id}/projects"))
            .await
            .inspect_err(|e| warn!(builder_id, error = %e, "failed to list builder projects"))
    }

    // ── Analytics ────────────────────────────────────────────────────

    pub async fn analytics(
        &self,
        query: &AnalyticsQuery,
    ) -> Result<ApiResponse<Vec<AnalyticsResource>>, Error> {
        let result: Result<ApiResponse<Vec<AnalyticsResource>>, Error> = match query {
            AnalyticsQuery::Device {
                device_id,
                time_range,
            } => {
                let path = format!("{}/analytics", self.devices.item_path(device_id));
                self.http
                    .get_with_query(&path, &[("timeRange", time_range.clone())])
                    .await
            }
            AnalyticsQuery::Filters(filters) => {
                let params: Vec<(&str, String)> = filters
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.clone()))
                    .collect();
                self.http
                    .get_with_query(&self.analytics_path, &params)
                    .await
            }
        };
        result.inspect_err(|e| warn!(?query, error = %e, "failed to fetch analytics"))
    }

    /// `GET {projects}/{id}/analytics/aggregated?type=&timeRange=`
    pub async fn aggregated_analytics(
        &self,
        project_id: u64,
        kind: &str,
        time_range: &str,
    ) -> Result<ApiResponse<Vec<AnalyticsResource>>, Error> {
        let path = format!("{}/analytics/aggregated", self.projects.item_path(project_id));
        self.http
            .get_with_query(
                &path,
                &[("type", kind.to_owned()), ("timeRange", time_range.to_owned())],
            )
            .await
            .inspect_err(|e| warn!(project_id, error = %e, "failed to fetch aggregated analytics"))
    }

    /// `GET /owners/{id}/analytics?timeRange=`
    pub async fn owner_analytics(
        &self,
        owner_id: u64,
        time_range: &str,
    ) -> Result<ApiResponse<Vec<AnalyticsResource>>, Error> {
        self.http
            .get_with_query(
                &format!("/owners/{owner_id}/analytics"),
                &[("timeRange", time_range.to_owned())],
            )
            .await
            .inspect_err(|e| warn!(owner_id, error = %e, "failed to fetch owner analytics"))
    }

    // ── Statistics ───────────────────────────────────────────────────

    /// `GET {projects}/{id}/statistics`
    pub async fn project_statistics(&self, project_id: u64) -> Result<Statistics, Error> {
        let path = format!("{}/statistics", self.projects.item_path(project_id));
        self.http
            .get(&path)
            .await
            .map(|resp| resp.data.unwrap_or_default())
            .inspect_err(|e| warn!(project_id, error = %e, "failed to fetch project statistics"))
    }

    /// `GET /owners/{id}/statistics`
    pub async fn owner_statistics(&self, owner_id: u64) -> Result<Statistics, Error> {
        self.http
            .get(&format!("/owners/{owner_id}/statistics"))
            .await
            .map(|resp| resp.data.unwrap_or_default())
            .inspect_err(|e| warn!(owner_id, error = %e, "failed to fetch owner statistics"))
    }
}
