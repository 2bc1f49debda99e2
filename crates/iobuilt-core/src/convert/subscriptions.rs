use iobuilt_api::models::{
    CheckoutSessionResource, InvoiceResource, PaymentConfirmationResource, PlanRef, PlanResource,
    SubscriptionResource,
};

use super::{format_date, parse_opt_date};
use crate::model::{
    CheckoutSession, Invoice, PaymentConfirmation, Plan, Subscription, SubscriptionPlan,
};

// ── Plan ───────────────────────────────────────────────────────────

impl From<PlanResource> for Plan {
    fn from(r: PlanResource) -> Self {
        Self {
            id: r.id.unwrap_or_default(),
            name: r.name.unwrap_or_default(),
            price: r.price.unwrap_or_default(),
            description: r.description.unwrap_or_default(),
            features: r.features.unwrap_or_default(),
            max_devices: r.max_devices.unwrap_or_default(),
            max_administrators: r.max_administrators.unwrap_or_default(),
            support_level: r.support_level.unwrap_or_default(),
            has_api: r.has_api.unwrap_or_default(),
            has_analytics: r.has_analytics.unwrap_or_default(),
        }
    }
}

impl From<&Plan> for PlanResource {
    fn from(p: &Plan) -> Self {
        Self {
            id: (p.id != 0).then_some(p.id),
            name: Some(p.name.clone()),
            price: Some(p.price),
            description: Some(p.description.clone()),
            features: Some(p.features.clone()),
            max_devices: Some(p.max_devices),
            max_administrators: Some(p.max_administrators),
            support_level: Some(p.support_level.clone()),
            has_api: Some(p.has_api),
            has_analytics: Some(p.has_analytics),
        }
    }
}

// ── Subscription ───────────────────────────────────────────────────

impl From<PlanRef> for SubscriptionPlan {
    fn from(r: PlanRef) -> Self {
        match r {
            PlanRef::Name(name) => Self::Name(name),
            PlanRef::Embedded(plan) => Self::Detailed(Plan::from(*plan)),
        }
    }
}

impl From<&SubscriptionPlan> for PlanRef {
    fn from(p: &SubscriptionPlan) -> Self {
        match p {
            SubscriptionPlan::Name(name) => Self::Name(name.clone()),
            SubscriptionPlan::Detailed(plan) => Self::Embedded(Box::new(PlanResource::from(plan))),
        }
    }
}

impl From<SubscriptionResource> for Subscription {
    fn from(r: SubscriptionResource) -> Self {
        Self {
            id: r.id.unwrap_or_default(),
            builder_id: r.builder_id.unwrap_or_default(),
            plan: r.plan.map(SubscriptionPlan::from).unwrap_or_default(),
            status: r.status.unwrap_or_default(),
            start_date: parse_opt_date(r.start_date.as_deref()),
            end_date: parse_opt_date(r.end_date.as_deref()),
            price: r.price.unwrap_or_default(),
            features: r.features.unwrap_or_default(),
        }
    }
}

impl From<&Subscription> for SubscriptionResource {
    fn from(s: &Subscription) -> Self {
        Self {
            id: Some(s.id),
            builder_id: Some(s.builder_id),
            plan: Some(PlanRef::from(&s.plan)),
            status: Some(s.status.clone()),
            start_date: s.start_date.as_ref().map(format_date),
            end_date: s.end_date.as_ref().map(format_date),
            price: Some(s.price),
            features: Some(s.features.clone()),
        }
    }
}

// ── Billing ────────────────────────────────────────────────────────

impl From<InvoiceResource> for Invoice {
    fn from(r: InvoiceResource) -> Self {
        Self {
            id: r.id.unwrap_or_default(),
            subscription_id: r.subscription_id.unwrap_or_default(),
            amount: r.amount.unwrap_or_default(),
            currency: r.currency.unwrap_or_else(|| "USD".into()),
            status: r.status.unwrap_or_default(),
            date: parse_opt_date(r.date.as_deref()),
            description: r.description.unwrap_or_default(),
        }
    }
}

impl From<CheckoutSessionResource> for CheckoutSession {
    fn from(r: CheckoutSessionResource) -> Self {
        Self {
            session_id: r.session_id.unwrap_or_default(),
            url: r.url.unwrap_or_default(),
        }
    }
}

impl From<PaymentConfirmationResource> for PaymentConfirmation {
    fn from(r: PaymentConfirmationResource) -> Self {
        Self {
            success: r.success.unwrap_or_default(),
            message: r.message,
            subscription: r.subscription.map(Subscription::from),
        }
    }
}
