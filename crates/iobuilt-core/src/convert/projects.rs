use iobuilt_api::models::ProjectResource;

use super::{format_date, parse_opt_date};
use crate::model::Project;

impl From<ProjectResource> for Project {
    fn from(r: ProjectResource) -> Self {
        let defaults = Project::default();
        Self {
            id: r.id,
            name: r.name.unwrap_or_default(),
            description: r.description.unwrap_or_default(),
            location: r.location.unwrap_or_default(),
            total_units: r.total_units.unwrap_or_default(),
            occupied_units: r.occupied_units.unwrap_or_default(),
            status: r.status.unwrap_or(defaults.status),
            builder_id: r.builder_id.unwrap_or_default(),
            created_date: parse_opt_date(r.created_date.as_deref()),
            image_url: r.image_url.unwrap_or_default(),
        }
    }
}

impl From<&Project> for ProjectResource {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            name: Some(p.name.clone()),
            description: Some(p.description.clone()),
            location: Some(p.location.clone()),
            total_units: Some(p.total_units),
            occupied_units: Some(p.occupied_units),
            status: Some(p.status.clone()),
            builder_id: Some(p.builder_id),
            created_date: p.created_date.as_ref().map(format_date),
            image_url: Some(p.image_url.clone()),
        }
    }
}
