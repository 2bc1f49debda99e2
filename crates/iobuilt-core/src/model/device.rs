use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Operational state of a device. Parsed case-insensitively; anything
/// unrecognised (or absent) is `Unknown`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum DeviceStatus {
    Online,
    Offline,
    Warning,
    #[default]
    Unknown,
}

impl DeviceStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default()
    }
}

/// Latest reading reported through the device's configuration record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
}

impl DeviceReading {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.unit.is_none() && self.last_update.is_none()
    }
}

/// An IoT device installed in a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<u64>,
    pub name: String,
    /// Canonical type code: temperature, energy, humidity, door, water,
    /// security, lighting, or whatever else the backend sends.
    pub device_type: String,
    pub location: String,
    pub project_id: u64,
    pub status: DeviceStatus,
    pub mac_address: String,
    pub reading: Option<DeviceReading>,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }

    pub fn is_offline(&self) -> bool {
        self.status == DeviceStatus::Offline
    }

    /// Online becomes Offline; every other state becomes Online.
    pub fn toggle_status(&mut self) {
        self.status = if self.is_online() {
            DeviceStatus::Offline
        } else {
            DeviceStatus::Online
        };
    }
}

/// Legacy localized category labels and their canonical type codes.
const LEGACY_CATEGORIES: &[(&str, &str)] = &[
    ("Sensor de Temperatura", "temperature"),
    ("Medidor Energético", "energy"),
    ("Sensor de Humedad", "humidity"),
    ("Control de Acceso", "door"),
    ("Sensor de Agua", "water"),
    ("Sistema de Seguridad", "security"),
    ("Control de Iluminación", "lighting"),
];

/// Map a legacy category label to its type code. Unknown labels pass
/// through unchanged.
pub fn canonical_device_type(category: &str) -> String {
    LEGACY_CATEGORIES
        .iter()
        .find(|(label, _)| *label == category)
        .map_or_else(|| category.to_owned(), |(_, code)| (*code).to_owned())
}
