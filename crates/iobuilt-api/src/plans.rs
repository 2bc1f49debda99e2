// Subscription plan catalogue endpoints

use tracing::warn;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::http::{ApiContext, ApiResponse, HttpClient};
use crate::models::PlanResource;

#[derive(Debug, Clone)]
pub struct PlanApi {
    plans: Endpoint,
}

impl PlanApi {
    pub fn new(ctx: &ApiContext) -> Result<Self, Error> {
        let http = HttpClient::new(ctx)?;
        Ok(Self {
            plans: Endpoint::new(http, ctx.paths.plans.clone()),
        })
    }

    pub async fn plans(&self) -> Result<ApiResponse<Vec<PlanResource>>, Error> {
        self.plans
            .get_all()
            .await
            .inspect_err(|e| warn!(error = %e, "failed to list plans"))
    }

    pub async fn plan(&self, id: u64) -> Result<PlanResource, Error> {
        self.plans
            .get_by_id(id)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to fetch plan"))
    }
}
