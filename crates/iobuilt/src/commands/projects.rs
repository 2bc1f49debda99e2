//! Project command handlers.

use iobuilt_core::{App, Project};
use tabled::Tabled;

use crate::cli::{GlobalOpts, ProjectFields, ProjectsArgs, ProjectsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Units")]
    units: String,
    #[tabled(rename = "Occupancy")]
    occupancy: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ProjectRow {
    pub(crate) fn new(p: &Project, color: bool) -> Self {
        Self {
            id: util::opt_id(p.id),
            name: p.name.clone(),
            location: p.location.clone(),
            units: format!("{}/{}", p.occupied_units, p.total_units),
            occupancy: format!("{:.1}%", p.occupancy_rate()),
            status: output::paint_status(&p.status, color),
        }
    }
}

fn detail(p: &Project) -> String {
    output::detail_lines(&[
        ("ID", util::opt_id(p.id)),
        ("Name", p.name.clone()),
        ("Description", p.description.clone()),
        ("Location", p.location.clone()),
        ("Status", p.status.clone()),
        ("Total units", p.total_units.to_string()),
        ("Occupied", p.occupied_units.to_string()),
        ("Available", p.available_units().to_string()),
        ("Occupancy", format!("{:.1}%", p.occupancy_rate())),
        ("Builder", p.builder_id.to_string()),
        ("Created", util::date(p.created_date)),
        ("Image", p.image_url.clone()),
    ])
}

fn apply_fields(project: &mut Project, fields: ProjectFields) {
    util::apply(&mut project.name, fields.name);
    util::apply(&mut project.description, fields.description);
    util::apply(&mut project.location, fields.location);
    util::apply(&mut project.total_units, fields.total_units);
    util::apply(&mut project.occupied_units, fields.occupied_units);
    util::apply(&mut project.status, fields.status);
    util::apply(&mut project.image_url, fields.image_url);
}

fn print_project(project: &Project, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, project, detail, |p| util::opt_id(p.id))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &App, args: ProjectsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = app.projects();

    match args.command {
        ProjectsCommand::List => {
            let projects = store.fetch_projects().await;
            util::ensure_no_errors(store.errors())?;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &projects,
                |p| ProjectRow::new(p, color),
                |p| util::opt_id(p.id),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProjectsCommand::Get { id } => {
            store.fetch_projects().await;
            util::ensure_no_errors(store.errors())?;
            let project = store
                .project_by_id(id)
                .ok_or_else(|| CliError::not_found("project", id, "projects list"))?;
            print_project(&project, global)
        }

        ProjectsCommand::Create { fields, from_file } => {
            let project = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => {
                    if fields.name.is_none() {
                        return Err(CliError::Validation {
                            field: "name".into(),
                            reason: "--name is required unless --from-file is given".into(),
                        });
                    }
                    let mut project = Project::default();
                    apply_fields(&mut project, fields);
                    project
                }
            };
            let created = store.add_project(&project).await?;
            print_project(&created, global)
        }

        ProjectsCommand::Update { id, fields } => {
            store.fetch_projects().await;
            util::ensure_no_errors(store.errors())?;
            let mut project = store
                .project_by_id(id)
                .ok_or_else(|| CliError::not_found("project", id, "projects list"))?;
            apply_fields(&mut project, fields);
            let updated = store.update_project(&project).await?;
            print_project(&updated, global)
        }

        ProjectsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete project {id}?"), global.yes)? {
                return Ok(());
            }
            store.delete_project(id).await?;
            output::notice(&format!("Project {id} deleted"), global.quiet);
            Ok(())
        }
    }
}
