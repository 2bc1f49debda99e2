use iobuilt_api::models::{DeviceConfigurationResource, DeviceResource};

use super::{format_date, parse_opt_date};
use crate::model::{Device, DeviceReading, DeviceStatus, canonical_device_type};

impl From<DeviceResource> for Device {
    fn from(r: DeviceResource) -> Self {
        Self::from((r, None))
    }
}

/// A device merged with its optional configuration record. The
/// configuration wins for status and supplies the reading.
impl From<(DeviceResource, Option<DeviceConfigurationResource>)> for Device {
    fn from((r, config): (DeviceResource, Option<DeviceConfigurationResource>)) -> Self {
        let device_type = match (r.device_type, r.category) {
            (Some(t), _) if !t.is_empty() => t,
            (_, Some(category)) => canonical_device_type(&category),
            (t, None) => t.unwrap_or_default(),
        };

        let (status, reading) = match config {
            Some(cfg) => (
                DeviceStatus::parse(cfg.status.as_deref().or(r.status.as_deref())),
                DeviceReading {
                    value: cfg.value,
                    unit: cfg.unit,
                    last_update: parse_opt_date(cfg.last_update.as_deref()),
                },
            ),
            None => (
                DeviceStatus::parse(r.status.as_deref()),
                DeviceReading {
                    value: r.value,
                    unit: r.unit,
                    last_update: parse_opt_date(r.last_update.as_deref()),
                },
            ),
        };

        Self {
            id: r.id,
            name: r.name.unwrap_or_default(),
            device_type,
            location: r.location.unwrap_or_default(),
            project_id: r.project_id.unwrap_or_default(),
            status,
            mac_address: r.mac_address.unwrap_or_default(),
            reading: (!reading.is_empty()).then_some(reading),
        }
    }
}

impl From<&Device> for DeviceResource {
    fn from(d: &Device) -> Self {
        let reading = d.reading.clone().unwrap_or_default();
        Self {
            id: d.id,
            name: Some(d.name.clone()),
            device_type: Some(d.device_type.clone()),
            category: None,
            location: Some(d.location.clone()),
            project_id: Some(d.project_id),
            status: (d.status != DeviceStatus::Unknown).then(|| d.status.to_string()),
            mac_address: Some(d.mac_address.clone()),
            value: reading.value,
            unit: reading.unit,
            last_update: reading.last_update.as_ref().map(format_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn resource() -> DeviceResource {
        DeviceResource {
            id: Some(3),
            name: Some("Sensor Lobby".into()),
            device_type: Some("temperature".into()),
            location: Some("Lobby".into()),
            project_id: Some(10),
            status: Some("Online".into()),
            mac_address: Some("aa:bb:cc:dd:ee:ff".into()),
            ..DeviceResource::default()
        }
    }

    #[test]
    fn legacy_category_fills_type() {
        let device = Device::from(DeviceResource {
            device_type: None,
            category: Some("Sensor de Agua".into()),
            ..resource()
        });
        assert_eq!(device.device_type, "water");
    }

    #[test]
    fn configuration_overrides_status_and_adds_reading() {
        let config = DeviceConfigurationResource {
            device_id: Some(3),
            status: Some("warning".into()),
            value: Some(28.5),
            unit: Some("°C".into()),
            last_update: Some("2024-06-15T10:30:00Z".into()),
            ..DeviceConfigurationResource::default()
        };
        let device = Device::from((resource(), Some(config)));
        assert_eq!(device.status, DeviceStatus::Warning);
        let reading = device.reading.unwrap_or_default();
        assert_eq!(reading.value, Some(28.5));
        assert!(reading.last_update.is_some());
    }

    #[test]
    fn missing_status_is_unknown() {
        let device = Device::from(DeviceResource {
            status: None,
            ..resource()
        });
        assert_eq!(device.status, DeviceStatus::Unknown);
        assert!(device.reading.is_none());
        assert_eq!(DeviceResource::from(&device).status, None);
    }

    #[test]
    fn resource_entity_round_trip() {
        let entity = Device::from(resource());
        let again = Device::from(DeviceResource::from(&entity));
        assert_eq!(again, entity);
        assert_eq!(DeviceResource::from(&entity), resource());
    }
}
