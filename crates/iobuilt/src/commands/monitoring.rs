//! Monitoring command handlers.

use iobuilt_api::AnalyticsQuery;
use iobuilt_core::{AnalyticsRecord, App};
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{GlobalOpts, MonitoringArgs, MonitoringCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::devices::DeviceRow;
use super::projects::ProjectRow;
use super::util;

#[derive(Debug, Serialize)]
struct Overview {
    devices: usize,
    online_devices: usize,
    offline_devices: usize,
    projects: usize,
    active_projects: usize,
    total_units: u64,
    occupied_units: u64,
    occupancy_rate: f64,
}

fn overview_detail(o: &Overview) -> String {
    output::detail_lines(&[
        ("Devices", o.devices.to_string()),
        ("Online", o.online_devices.to_string()),
        ("Offline", o.offline_devices.to_string()),
        ("Projects", o.projects.to_string()),
        ("Active", o.active_projects.to_string()),
        ("Units", format!("{}/{}", o.occupied_units, o.total_units)),
        ("Occupancy", format!("{:.1}%", o.occupancy_rate)),
    ])
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Device")]
    device: u64,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&AnalyticsRecord> for RecordRow {
    fn from(r: &AnalyticsRecord) -> Self {
        Self {
            id: r.id,
            device: r.device_id,
            kind: r.kind.clone(),
            value: r.formatted_value(),
            time: r.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub async fn handle(app: &App, args: MonitoringArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = app.monitoring();
    let color = output::should_color(&global.color);

    match args.command {
        MonitoringCommand::Overview => {
            store.initialize().await;
            util::ensure_no_errors(store.errors())?;
            let overview = Overview {
                devices: store.devices_count(),
                online_devices: store.online_devices_count(),
                offline_devices: store.offline_devices_count(),
                projects: store.projects_count(),
                active_projects: store.active_projects_count(),
                total_units: store.total_units(),
                occupied_units: store.occupied_units(),
                occupancy_rate: store.occupancy_rate(),
            };
            let out = output::render_single(&global.output, &overview, overview_detail, |o| {
                o.devices.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitoringCommand::Devices => {
            let devices = store.fetch_devices().await;
            util::ensure_no_errors(store.errors())?;
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| util::opt_id(d.id),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitoringCommand::Projects => {
            let projects = store.fetch_projects().await;
            util::ensure_no_errors(store.errors())?;
            let out = output::render_list(
                &global.output,
                &projects,
                |p| ProjectRow::new(p, color),
                |p| util::opt_id(p.id),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitoringCommand::Analytics {
            device,
            range,
            filter,
        } => {
            let query = match device {
                Some(id) => {
                    let query = AnalyticsQuery::device(id);
                    match range {
                        Some(range) => query.with_time_range(range),
                        None => query,
                    }
                }
                None => AnalyticsQuery::Filters(filter),
            };
            let records = store.fetch_analytics(&query).await;
            util::ensure_no_errors(store.errors())?;
            let out = output::render_list(&global.output, &records, |r| RecordRow::from(r), |r| {
                r.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MonitoringCommand::Stats { project } => {
            let stats = match project {
                Some(id) => store.fetch_project_statistics(id).await,
                None => store.fetch_owner_statistics().await,
            };
            util::ensure_no_errors(store.errors())?;
            let out = if matches!(global.output, OutputFormat::Table) {
                let rows: Vec<StatRow> = stats
                    .iter()
                    .map(|(k, v)| StatRow {
                        key: k.clone(),
                        value: match v {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        },
                    })
                    .collect();
                Table::new(rows).with(Style::rounded()).to_string()
            } else {
                output::render_single(&global.output, &stats, |_| String::new(), |m| {
                    m.keys().cloned().collect::<Vec<_>>().join("\n")
                })?
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
