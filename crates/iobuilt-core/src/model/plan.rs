use serde::{Deserialize, Serialize};

use super::format_price;

/// A subscription plan. Negative limits mean unlimited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub features: Vec<String>,
    pub max_devices: i32,
    pub max_administrators: i32,
    pub support_level: String,
    pub has_api: bool,
    pub has_analytics: bool,
}

impl Plan {
    pub fn formatted_price(&self) -> String {
        format_price(self.price)
    }

    pub fn is_enterprise(&self) -> bool {
        self.name.eq_ignore_ascii_case("enterprise")
    }

    pub fn is_professional(&self) -> bool {
        self.name.eq_ignore_ascii_case("professional")
    }

    pub fn has_unlimited_devices(&self) -> bool {
        self.max_devices < 0
    }

    pub fn has_unlimited_administrators(&self) -> bool {
        self.max_administrators < 0
    }
}

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

/// The built-in plan catalogue, used until the backend list is fetched.
pub fn plan_catalogue() -> Vec<Plan> {
    vec![
        Plan {
            id: 2,
            name: "Professional".into(),
            price: 799.0,
            description: "Ideal for medium-sized projects".into(),
            features: features(&[
                "Up to 200 IoT devices",
                "Advanced dashboard",
                "24/7 priority support",
                "Updates and new features",
                "3 administrators",
                "Real-time reports",
                "Custom API",
                "Training included",
            ]),
            max_devices: 200,
            max_administrators: 3,
            support_level: "24/7 priority".into(),
            has_api: true,
            has_analytics: true,
        },
        Plan {
            id: 1,
            name: "Starter".into(),
            price: 299.0,
            description: "Perfect for small projects".into(),
            features: features(&[
                "Up to 50 IoT devices",
                "Basic dashboard",
                "Email support",
                "Updates included",
                "1 administrator",
                "Monthly reports",
            ]),
            max_devices: 50,
            max_administrators: 1,
            support_level: "Email".into(),
            has_api: false,
            has_analytics: false,
        },
        Plan {
            id: 3,
            name: "Enterprise".into(),
            price: 1299.0,
            description: "For big developments".into(),
            features: features(&[
                "Unlimited IoT devices",
                "Enterprise dashboard",
                "Dedicated 24/7 support",
                "Development of custom features",
                "Unlimited administrators",
                "Advanced analytics",
                "Complete API",
                "Specialized consulting",
                "Guaranteed SLA",
            ]),
            max_devices: -1,
            max_administrators: -1,
            support_level: "Dedicated 24/7".into(),
            has_api: true,
            has_analytics: true,
        },
    ]
}
