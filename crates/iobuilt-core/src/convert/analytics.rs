use std::collections::BTreeMap;

use iobuilt_api::models::{
    AnalyticsResource, BuilderDashboardResource, DataPointResource, OwnerDashboardResource,
};
use serde_json::{Map, Value};

use super::{format_date, parse_opt_date};
use crate::model::{AnalyticsRecord, BuilderDashboard, HistoricalDataPoint, OwnerDashboard};

impl From<AnalyticsResource> for AnalyticsRecord {
    fn from(r: AnalyticsResource) -> Self {
        Self {
            id: r.id.unwrap_or_default(),
            device_id: r.device_id.unwrap_or_default(),
            timestamp: parse_opt_date(r.timestamp.as_deref()),
            value: r.value.unwrap_or_default(),
            kind: r.kind.unwrap_or_default(),
            metadata: r.metadata.unwrap_or_default(),
        }
    }
}

impl From<&AnalyticsRecord> for AnalyticsResource {
    fn from(a: &AnalyticsRecord) -> Self {
        Self {
            id: Some(a.id),
            device_id: Some(a.device_id),
            timestamp: a.timestamp.as_ref().map(format_date),
            value: Some(a.value),
            kind: Some(a.kind.clone()),
            metadata: Some(a.metadata.clone()),
        }
    }
}

impl From<DataPointResource> for HistoricalDataPoint {
    fn from(r: DataPointResource) -> Self {
        Self {
            timestamp: parse_opt_date(r.timestamp.as_deref()),
            value: r.value,
            kind: r.kind,
        }
    }
}

fn series(points: Vec<DataPointResource>) -> Vec<HistoricalDataPoint> {
    points.into_iter().map(HistoricalDataPoint::from).collect()
}

/// Keep only the integer counts of a `{type: count}` map.
fn counts(map: Map<String, Value>) -> BTreeMap<String, u64> {
    map.into_iter()
        .filter_map(|(k, v)| v.as_u64().map(|n| (k, n)))
        .collect()
}

impl From<BuilderDashboardResource> for BuilderDashboard {
    fn from(r: BuilderDashboardResource) -> Self {
        Self {
            total_devices: r.total_devices,
            online_devices: r.online_devices,
            offline_devices: r.offline_devices,
            alerts_count: r.alerts_count,
            active_projects_count: r.active_projects_count,
            total_units: r.total_units,
            occupied_units: r.occupied_units,
            occupancy_rate: r.occupancy_rate,
            energy_efficiency_avg: r.energy_efficiency_avg,
            temperature_history: series(r.temperature_history),
            energy_history: series(r.energy_history),
            hourly_energy_data: series(r.hourly_energy_data),
            monthly_occupancy: r.monthly_occupancy,
            devices_by_type: counts(r.devices_by_type),
            projects_overview: r.projects_overview,
        }
    }
}

impl From<OwnerDashboardResource> for OwnerDashboard {
    fn from(r: OwnerDashboardResource) -> Self {
        Self {
            total_devices: r.total_devices,
            online_devices: r.online_devices,
            offline_devices: r.offline_devices,
            alerts_count: r.alerts_count,
            my_units_count: r.my_units_count,
            energy_this_month: r.energy_this_month,
            temperature_avg: r.temperature_avg,
            water_usage_this_month: r.water_usage_this_month,
            temperature_history: series(r.temperature_history),
            energy_history: series(r.energy_history),
            daily_energy_consumption: series(r.daily_energy_consumption),
            water_usage_weekly: series(r.water_usage_weekly),
            device_health_status: r.device_health_status,
            my_units_details: r.my_units_details,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn record_round_trip() {
        let resource = AnalyticsResource {
            id: Some(1),
            device_id: Some(2),
            timestamp: Some("2024-06-15T10:30:00Z".into()),
            value: Some(21.5),
            kind: Some("temperature".into()),
            metadata: Some(json!({"sensor": "A1"}).as_object().unwrap().clone()),
        };
        let record = AnalyticsRecord::from(resource);
        assert!(record.timestamp.is_some());
        assert_eq!(AnalyticsRecord::from(AnalyticsResource::from(&record)), record);
    }

    #[test]
    fn dashboard_series_are_coerced() {
        let resource: BuilderDashboardResource = serde_json::from_value(json!({
            "totalDevices": 4,
            "energyHistory": [
                {"timestamp": "2024-06-01", "value": 120.5, "type": "energy"},
                {"timestamp": "garbage", "value": 99.0, "type": "energy"}
            ],
            "devicesByType": {"energy": 2, "temperature": 2, "note": "n/a"}
        }))
        .unwrap();
        let dashboard = BuilderDashboard::from(resource);
        assert_eq!(dashboard.energy_history.len(), 2);
        assert!(dashboard.energy_history[0].timestamp.is_some());
        assert!(dashboard.energy_history[1].timestamp.is_none());
        assert_eq!(dashboard.devices_by_type.get("energy"), Some(&2));
        assert!(!dashboard.devices_by_type.contains_key("note"));
    }
}
