use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format_price;
use super::plan::Plan;

pub const STATUS_ACTIVE: &str = "active";

/// The plan a subscription points at: a plan name on older records, the
/// full plan on newer ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubscriptionPlan {
    Name(String),
    Detailed(Plan),
}

impl Default for SubscriptionPlan {
    fn default() -> Self {
        Self::Name(String::new())
    }
}

impl SubscriptionPlan {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed(plan) => &plan.name,
        }
    }

    /// Point at `plan`, keeping the record's shape.
    pub fn switched_to(&self, plan: &Plan) -> Self {
        match self {
            Self::Name(_) => Self::Name(plan.name.clone()),
            Self::Detailed(_) => Self::Detailed(plan.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: u64,
    pub builder_id: u64,
    pub plan: SubscriptionPlan,
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub price: f64,
    pub features: Vec<String>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    pub fn plan_name(&self) -> &str {
        self.plan.name()
    }

    pub fn formatted_price(&self) -> String {
        format_price(self.price)
    }
}

/// A billed period of a subscription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub subscription_id: u64,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub date: Option<DateTime<Utc>>,
    pub description: String,
}

impl Invoice {
    pub fn formatted_amount(&self) -> String {
        format_price(self.amount)
    }
}

/// A hosted payment page opened for a plan change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub success: bool,
    pub message: Option<String>,
    pub subscription: Option<Subscription>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_keeps_shape() {
        let pro = Plan {
            name: "Professional".into(),
            ..Plan::default()
        };
        let named = SubscriptionPlan::Name("Starter".into()).switched_to(&pro);
        assert_eq!(named, SubscriptionPlan::Name("Professional".into()));

        let detailed = SubscriptionPlan::Detailed(Plan::default()).switched_to(&pro);
        assert_eq!(detailed.name(), "Professional");
        assert!(matches!(detailed, SubscriptionPlan::Detailed(_)));
    }

    #[test]
    fn active_status_is_exact() {
        let mut sub = Subscription {
            status: "active".into(),
            ..Subscription::default()
        };
        assert!(sub.is_active());
        sub.status = "cancelled".into();
        assert!(!sub.is_active());
    }
}
