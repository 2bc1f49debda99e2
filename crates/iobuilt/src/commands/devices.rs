//! Device command handlers.

use iobuilt_core::{App, Device, DeviceStore};
use tabled::Tabled;

use crate::cli::{DeviceFields, DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Reading")]
    reading: String,
}

impl DeviceRow {
    pub(crate) fn new(d: &Device, color: bool) -> Self {
        Self {
            id: util::opt_id(d.id),
            name: d.name.clone(),
            dtype: d.device_type.clone(),
            location: d.location.clone(),
            project: d.project_id.to_string(),
            status: output::paint_status(&d.status.to_string(), color),
            reading: reading(d),
        }
    }
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Devices")]
    count: usize,
    #[tabled(rename = "Online")]
    online: usize,
}

#[derive(serde::Serialize)]
struct TypeCount {
    device_type: String,
    count: usize,
    online: usize,
}

fn reading(d: &Device) -> String {
    d.reading
        .as_ref()
        .and_then(|r| {
            r.value
                .map(|v| format!("{v} {}", r.unit.as_deref().unwrap_or("")).trim_end().to_owned())
        })
        .unwrap_or_default()
}

fn detail(d: &Device) -> String {
    output::detail_lines(&[
        ("ID", util::opt_id(d.id)),
        ("Name", d.name.clone()),
        ("Type", d.device_type.clone()),
        ("Location", d.location.clone()),
        ("Project", d.project_id.to_string()),
        ("Status", d.status.to_string()),
        ("MAC", d.mac_address.clone()),
        ("Reading", reading(d)),
        (
            "Updated",
            d.reading
                .as_ref()
                .and_then(|r| r.last_update)
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        ),
    ])
}

fn apply_fields(device: &mut Device, fields: DeviceFields) {
    util::apply(&mut device.name, fields.name);
    util::apply(&mut device.device_type, fields.device_type);
    util::apply(&mut device.location, fields.location);
    util::apply(&mut device.project_id, fields.project);
    util::apply(&mut device.mac_address, fields.mac);
}

fn print_device(device: &Device, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, device, detail, |d| util::opt_id(d.id))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn fetch_one(store: &DeviceStore, id: u64) -> Result<Device, CliError> {
    let device = store.fetch_device_by_id(id).await;
    util::ensure_no_errors(store.errors())?;
    device.ok_or_else(|| CliError::not_found("device", id, "devices list"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &App, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = app.devices();

    match args.command {
        DevicesCommand::List { online, offline } => {
            store.fetch_devices().await;
            util::ensure_no_errors(store.errors())?;
            let devices = if online {
                store.online_devices()
            } else if offline {
                store.offline_devices()
            } else {
                store.devices()
            };
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| util::opt_id(d.id),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { id } => {
            let device = fetch_one(store, id).await?;
            print_device(&device, global)
        }

        DevicesCommand::Create { fields, from_file } => {
            let device = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => {
                    if fields.name.is_none() {
                        return Err(CliError::Validation {
                            field: "name".into(),
                            reason: "--name is required unless --from-file is given".into(),
                        });
                    }
                    let mut device = Device::default();
                    apply_fields(&mut device, fields);
                    device
                }
            };
            let created = store.create_device(&device).await?;
            print_device(&created, global)
        }

        DevicesCommand::Update { id, fields } => {
            let mut device = fetch_one(store, id).await?;
            apply_fields(&mut device, fields);
            let updated = store.update_device(&device).await?;
            print_device(&updated, global)
        }

        DevicesCommand::Toggle { id } => {
            let mut device = fetch_one(store, id).await?;
            device.toggle_status();
            let updated = store.update_device(&device).await?;
            output::notice(
                &format!("Device {id} is now {}", updated.status),
                global.quiet,
            );
            Ok(())
        }

        DevicesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete device {id}?"), global.yes)? {
                return Ok(());
            }
            store.delete_device(id).await?;
            output::notice(&format!("Device {id} deleted"), global.quiet);
            Ok(())
        }

        DevicesCommand::Types => {
            store.fetch_devices().await;
            util::ensure_no_errors(store.errors())?;
            let counts: Vec<TypeCount> = store
                .devices_by_type()
                .into_iter()
                .map(|(device_type, list)| TypeCount {
                    online: list.iter().filter(|d| d.is_online()).count(),
                    count: list.len(),
                    device_type,
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &counts,
                |c| TypeRow {
                    dtype: c.device_type.clone(),
                    count: c.count,
                    online: c.online,
                },
                |c| c.device_type.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
