// Projects as seen by the Clients context.

use std::sync::Arc;

use crate::model::Project;
use crate::store::ProjectStore;

#[derive(Debug, Clone)]
pub struct ProjectsFacade {
    store: Arc<ProjectStore>,
}

impl ProjectsFacade {
    pub fn new(store: Arc<ProjectStore>) -> Self {
        Self { store }
    }

    pub fn projects(&self) -> Vec<Project> {
        self.store.projects()
    }

    /// Fetch only when nothing has been loaded yet.
    pub async fn fetch_projects(&self) -> Vec<Project> {
        if self.store.is_loaded() {
            self.store.projects()
        } else {
            self.store.fetch_projects().await
        }
    }

    pub fn project_by_id(&self, id: u64) -> Option<Project> {
        self.store.project_by_id(id)
    }

    /// Empty when the project is unknown.
    pub fn project_name_by_id(&self, id: u64) -> String {
        self.store
            .project_by_id(id)
            .map(|p| p.name)
            .unwrap_or_default()
    }

    pub fn are_projects_loaded(&self) -> bool {
        self.store.is_loaded()
    }
}
