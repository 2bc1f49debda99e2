use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One sensor reading from the analytics collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub id: u64,
    pub device_id: u64,
    pub timestamp: Option<DateTime<Utc>>,
    pub value: f64,
    /// temperature, humidity, energy, water, ...
    pub kind: String,
    pub metadata: Map<String, Value>,
}

impl AnalyticsRecord {
    /// Value with the unit suffix for its kind.
    pub fn formatted_value(&self) -> String {
        let value = self.value;
        match self.kind.as_str() {
            "temperature" => format!("{value}°C"),
            "humidity" => format!("{value}%"),
            "energy" => format!("{value} kWh"),
            "water" => format!("{value} L"),
            _ => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataPoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub value: f64,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuilderDashboard {
    pub total_devices: u64,
    pub online_devices: u64,
    pub offline_devices: u64,
    pub alerts_count: u64,
    pub active_projects_count: u64,
    pub total_units: u64,
    pub occupied_units: u64,
    pub occupancy_rate: f64,
    pub energy_efficiency_avg: f64,
    pub temperature_history: Vec<HistoricalDataPoint>,
    pub energy_history: Vec<HistoricalDataPoint>,
    pub hourly_energy_data: Vec<HistoricalDataPoint>,
    pub monthly_occupancy: Vec<Value>,
    pub devices_by_type: BTreeMap<String, u64>,
    pub projects_overview: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerDashboard {
    pub total_devices: u64,
    pub online_devices: u64,
    pub offline_devices: u64,
    pub alerts_count: u64,
    pub my_units_count: u64,
    pub energy_this_month: f64,
    pub temperature_avg: f64,
    pub water_usage_this_month: f64,
    pub temperature_history: Vec<HistoricalDataPoint>,
    pub energy_history: Vec<HistoricalDataPoint>,
    pub daily_energy_consumption: Vec<HistoricalDataPoint>,
    pub water_usage_weekly: Vec<HistoricalDataPoint>,
    pub device_health_status: Vec<Value>,
    pub my_units_details: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, value: f64) -> AnalyticsRecord {
        AnalyticsRecord {
            kind: kind.into(),
            value,
            ..AnalyticsRecord::default()
        }
    }

    #[test]
    fn formatted_value_by_kind() {
        assert_eq!(record("temperature", 21.5).formatted_value(), "21.5°C");
        assert_eq!(record("humidity", 40.0).formatted_value(), "40%");
        assert_eq!(record("energy", 3.2).formatted_value(), "3.2 kWh");
        assert_eq!(record("water", 120.0).formatted_value(), "120 L");
        assert_eq!(record("door", 1.0).formatted_value(), "1");
    }
}
