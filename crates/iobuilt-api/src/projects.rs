// Project endpoints

use tracing::warn;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::http::{ApiContext, ApiResponse, HttpClient};
use crate::models::ProjectResource;

#[derive(Debug, Clone)]
pub struct ProjectApi {
    projects: Endpoint,
}

impl ProjectApi {
    pub fn new(ctx: &ApiContext) -> Result<Self, Error> {
        let http = HttpClient::new(ctx)?;
        Ok(Self {
            projects: Endpoint::new(http, ctx.paths.projects.clone()),
        })
    }

    /// Projects owned by `builder_id`, in backend order.
    pub async fn projects_by_builder(
        &self,
        builder_id: u64,
    ) -> Result<ApiResponse<Vec<ProjectResource>>, Error> {
        self.projects
            .get_where(&[("builderId", builder_id.to_string())])
            .await
            .inspect_err(|e| warn!(builder_id, error = %e, "failed to list projects"))
    }

    pub async fn project(&self, id: u64) -> Result<ProjectResource, Error> {
        self.projects
            .get_by_id(id)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to fetch project"))
    }

    pub async fn create(&self, project: &ProjectResource) -> Result<ProjectResource, Error> {
        self.projects
            .create(project)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(error = %e, "failed to create project"))
    }

    pub async fn update(&self, id: u64, project: &ProjectResource) -> Result<ProjectResource, Error> {
        self.projects
            .update(id, project)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to update project"))
    }

    pub async fn delete(&self, id: u64) -> Result<(), Error> {
        self.projects
            .delete(id)
            .await
            .map(|_| ())
            .inspect_err(|e| warn!(id, error = %e, "failed to delete project"))
    }
}
