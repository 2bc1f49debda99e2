use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROJECT_STATUS: &str = "active";

/// A building project owned by a builder.
///
/// `occupied_units <= total_units` is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Option<u64>,
    pub name: String,
    pub description: String,
    pub location: String,
    pub total_units: u32,
    pub occupied_units: u32,
    pub status: String,
    pub builder_id: u64,
    pub created_date: Option<DateTime<Utc>>,
    pub image_url: String,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: String::new(),
            location: String::new(),
            total_units: 0,
            occupied_units: 0,
            status: DEFAULT_PROJECT_STATUS.into(),
            builder_id: 0,
            created_date: None,
            image_url: String::new(),
        }
    }
}

impl Project {
    /// Occupied share in percent; 0 for a project without units.
    pub fn occupancy_rate(&self) -> f64 {
        if self.total_units == 0 {
            0.0
        } else {
            f64::from(self.occupied_units) / f64::from(self.total_units) * 100.0
        }
    }

    /// May go negative when the backend over-reports occupancy.
    pub fn available_units(&self) -> i64 {
        i64::from(self.total_units) - i64::from(self.occupied_units)
    }

    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case(DEFAULT_PROJECT_STATUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_unit_figures() {
        let project = Project {
            total_units: 40,
            occupied_units: 30,
            ..Project::default()
        };
        assert!((project.occupancy_rate() - 75.0).abs() < f64::EPSILON);
        assert_eq!(project.available_units(), 10);
        assert!(project.is_active());
    }

    #[test]
    fn empty_project_has_zero_occupancy() {
        assert!(Project::default().occupancy_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn over_reported_occupancy_is_not_clamped() {
        let project = Project {
            total_units: 5,
            occupied_units: 7,
            ..Project::default()
        };
        assert_eq!(project.available_units(), -2);
    }
}
