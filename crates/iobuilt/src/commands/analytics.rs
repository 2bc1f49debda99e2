//! Analytics command handlers.

use iobuilt_core::{App, BuilderDashboard, HistoricalDataPoint, OwnerDashboard, Role};
use tabled::Tabled;

use crate::cli::{AnalyticsArgs, AnalyticsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct PointRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Metric")]
    kind: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn by_type(counts: &std::collections::BTreeMap<String, u64>) -> String {
    counts
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn builder_detail(d: &BuilderDashboard) -> String {
    output::detail_lines(&[
        ("Devices", d.total_devices.to_string()),
        ("Online", d.online_devices.to_string()),
        ("Offline", d.offline_devices.to_string()),
        ("Alerts", d.alerts_count.to_string()),
        ("Active projects", d.active_projects_count.to_string()),
        ("Units", format!("{}/{}", d.occupied_units, d.total_units)),
        ("Occupancy", format!("{:.1}%", d.occupancy_rate)),
        ("Energy eff.", format!("{:.1}", d.energy_efficiency_avg)),
        ("By type", by_type(&d.devices_by_type)),
    ])
}

fn owner_detail(d: &OwnerDashboard) -> String {
    output::detail_lines(&[
        ("Devices", d.total_devices.to_string()),
        ("Online", d.online_devices.to_string()),
        ("Offline", d.offline_devices.to_string()),
        ("Alerts", d.alerts_count.to_string()),
        ("My units", d.my_units_count.to_string()),
        ("Energy (month)", format!("{:.1}", d.energy_this_month)),
        ("Water (month)", format!("{:.1}", d.water_usage_this_month)),
        ("Avg temperature", format!("{:.1}", d.temperature_avg)),
    ])
}

pub async fn handle(app: &App, args: AnalyticsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = app.analytics();

    match args.command {
        AnalyticsCommand::Dashboard { user, role } => {
            let role = match role {
                Some(role) => role,
                None => {
                    app.facade()
                        .acting_user(&app.config().simulated_session)?
                        .role
                }
            };
            let out = match role {
                Role::Builder => {
                    let dashboard = store.fetch_builder_dashboard(user).await;
                    util::ensure_no_errors(store.errors())?;
                    let dashboard = dashboard.unwrap_or_default();
                    output::render_single(&global.output, &dashboard, builder_detail, |d| {
                        d.total_devices.to_string()
                    })?
                }
                Role::Owner => {
                    let dashboard = store.fetch_owner_dashboard(user).await;
                    util::ensure_no_errors(store.errors())?;
                    let dashboard = dashboard.unwrap_or_default();
                    output::render_single(&global.output, &dashboard, owner_detail, |d| {
                        d.total_devices.to_string()
                    })?
                }
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AnalyticsCommand::History {
            project,
            metric,
            start,
            end,
        } => {
            let points: Vec<HistoricalDataPoint> =
                store.fetch_historical_data(project, &metric, start, end).await;
            util::ensure_no_errors(store.errors())?;
            let out = output::render_list(
                &global.output,
                &points,
                |p| PointRow {
                    time: p.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default(),
                    kind: p.kind.clone(),
                    value: format!("{:.2}", p.value),
                },
                |p| p.value.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
