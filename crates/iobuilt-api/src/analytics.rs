// Dashboard analytics endpoints

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::Error;
use crate::http::{ApiContext, ApiResponse, HttpClient};
use crate::models::DataPointResource;

#[derive(Debug, Clone)]
pub struct AnalyticsApi {
    http: HttpClient,
    base: String,
}

impl AnalyticsApi {
    pub fn new(ctx: &ApiContext) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(ctx)?,
            base: ctx.paths.analytics.trim_end_matches('/').to_owned(),
        })
    }

    /// `GET {analytics}/metrics/{user_id}?role=`
    ///
    /// The payload shape depends on the role, so the caller picks `R`
    /// (`BuilderDashboardResource` or `OwnerDashboardResource`).
    pub async fn dashboard_metrics<R: DeserializeOwned>(
        &self,
        user_id: u64,
        role: &str,
    ) -> Result<R, Error> {
        self.http
            .get_with_query(
                &format!("{}/metrics/{user_id}", self.base),
                &[("role", role.to_owned())],
            )
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(user_id, role, error = %e, "failed to fetch dashboard metrics"))
    }

    /// `GET {analytics}/insights?projectId=&metric=[&startDate=][&endDate=]`
    pub async fn insights(
        &self,
        project_id: u64,
        metric: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<DataPointResource>, Error> {
        let mut query = vec![
            ("projectId", project_id.to_string()),
            ("metric", metric.to_owned()),
        ];
        if let Some(start) = start {
            query.push(("startDate", start.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        if let Some(end) = end {
            query.push(("endDate", end.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }

        self.http
            .get_with_query(&format!("{}/insights", self.base), &query)
            .await
            .map(|resp| resp.data.unwrap_or_default())
            .inspect_err(|e| warn!(project_id, metric, error = %e, "failed to fetch insights"))
    }
}
