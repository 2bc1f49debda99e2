// ── Project store ──
//
// The acting builder's projects.

use iobuilt_api::models::ProjectResource;
use iobuilt_api::{ApiContext, ProjectApi};
use tracing::{debug, info};

use super::state::{ErrorLog, LoadingFlag, Observable, RequestFence};
use crate::config::SimulatedSession;
use crate::convert::entities_from_response;
use crate::error::CoreError;
use crate::facade::IamFacade;
use crate::model::Project;
use crate::stream::StateStream;

#[derive(Debug)]
pub struct ProjectStore {
    api: ProjectApi,
    iam: IamFacade,
    simulated: SimulatedSession,
    projects: Observable<Vec<Project>>,
    loaded: Observable<bool>,
    loading: LoadingFlag,
    errors: ErrorLog,
    fence: RequestFence,
}

impl ProjectStore {
    pub fn new(
        ctx: &ApiContext,
        iam: IamFacade,
        simulated: SimulatedSession,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            api: ProjectApi::new(ctx)?,
            iam,
            simulated,
            projects: Observable::default(),
            loaded: Observable::new(false),
            loading: LoadingFlag::new(),
            errors: ErrorLog::new(),
            fence: RequestFence::new(),
        })
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Projects of the acting builder, replacing the current list.
    pub async fn fetch_projects(&self) -> Vec<Project> {
        let _loading = self.loading.guard();
        let ticket = self.fence.ticket();

        let builder = match self.iam.acting_user(&self.simulated) {
            Ok(user) => user,
            Err(e) => {
                self.errors.record("fetch_projects", e);
                return Vec::new();
            }
        };

        let projects: Vec<Project> = match self.api.projects_by_builder(builder.id).await {
            Ok(resp) => entities_from_response(resp),
            Err(e) => {
                self.errors.record("fetch_projects", e.into());
                return Vec::new();
            }
        };

        if self.fence.is_current(ticket) {
            debug!(builder_id = builder.id, count = projects.len(), "projects loaded");
            self.projects.set(projects.clone());
            self.loaded.set(true);
        } else {
            debug!(builder_id = builder.id, "discarding stale project list");
        }
        projects
    }

    /// Add a project. An unset builder id is filled with the acting user.
    pub async fn add_project(&self, project: &Project) -> Result<Project, CoreError> {
        let _loading = self.loading.guard();
        let mut resource = ProjectResource::from(project);
        if project.builder_id == 0 {
            if let Ok(builder) = self.iam.acting_user(&self.simulated) {
                resource.builder_id = Some(builder.id);
            }
        }

        let created = self
            .api
            .create(&resource)
            .await
            .map(Project::from)
            .map_err(|e| self.errors.capture("add_project", e))?;
        info!(id = ?created.id, name = %created.name, "project created");
        self.projects.update(|list| list.push(created.clone()));
        Ok(created)
    }

    pub async fn update_project(&self, project: &Project) -> Result<Project, CoreError> {
        let id = project.id.ok_or_else(|| {
            self.errors
                .capture("update_project", CoreError::MissingArgument("project id".into()))
        })?;

        let _loading = self.loading.guard();
        let updated = self
            .api
            .update(id, &ProjectResource::from(project))
            .await
            .map(Project::from)
            .map_err(|e| self.errors.capture("update_project", e))?;

        self.projects.update(|list| {
            if let Some(slot) = list.iter_mut().find(|p| p.id == updated.id) {
                *slot = updated.clone();
            }
        });
        Ok(updated)
    }

    /// Delete, then refetch the list from the backend.
    pub async fn delete_project(&self, id: u64) -> Result<(), CoreError> {
        // Held across the refetch, whose own guard nests inside this one.
        let _loading = self.loading.guard();
        self.api
            .delete(id)
            .await
            .map_err(|e| self.errors.capture("delete_project", e))?;
        info!(id, "project deleted");
        self.projects
            .update(|list| list.retain(|p| p.id != Some(id)));
        self.fetch_projects().await;
        Ok(())
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn projects(&self) -> Vec<Project> {
        self.projects.get()
    }

    pub fn project_by_id(&self, id: u64) -> Option<Project> {
        self.projects
            .with(|list| list.iter().find(|p| p.id == Some(id)).cloned())
    }

    /// Zero until the first successful fetch.
    pub fn projects_count(&self) -> usize {
        if self.loaded.get() {
            self.projects.with(Vec::len)
        } else {
            0
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    pub fn subscribe_projects(&self) -> StateStream<Vec<Project>> {
        self.projects.subscribe()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }
}
