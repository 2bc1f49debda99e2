// ── Domain model ──
//
// Plain value types rebuilt from backend payloads on every fetch. Fresh
// (empty) state is `Default`.

mod analytics;
mod client;
mod device;
mod plan;
mod profile;
mod project;
mod role;
mod subscription;
mod user;

pub use analytics::{AnalyticsRecord, BuilderDashboard, HistoricalDataPoint, OwnerDashboard};
pub use client::{Client, DEFAULT_ACCOUNT_STATEMENT};
pub use device::{Device, DeviceReading, DeviceStatus, canonical_device_type};
pub use plan::{Plan, plan_catalogue};
pub use profile::{PLACEHOLDER_PHOTO_URL, Profile};
pub use project::Project;
pub use role::Role;
pub use subscription::{CheckoutSession, Invoice, PaymentConfirmation, Subscription, SubscriptionPlan};
pub use user::{AuthenticatedUser, CurrentUser, User};

/// `$799`, `$12.50`: whole amounts drop the decimals.
pub(crate) fn format_price(price: f64) -> String {
    if price.fract().abs() < f64::EPSILON {
        format!("${price:.0}")
    } else {
        format!("${price:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::format_price;

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(799.0), "$799");
        assert_eq!(format_price(12.5), "$12.50");
        assert_eq!(format_price(0.0), "$0");
    }
}
