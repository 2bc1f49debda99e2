// Subscription endpoints: lookup, lifecycle, invoices and payments

use chrono::{SecondsFormat, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::http::{ApiContext, ApiResponse, HttpClient};
use crate::models::{
    CheckoutSessionRequest, CheckoutSessionResource, ConfirmPaymentRequest, InvoiceResource,
    PaymentConfirmationResource, SubscriptionPatch, SubscriptionResource,
};

/// Length of a renewal period.
pub const RENEWAL_DAYS: i64 = 365;

const STATUS_ACTIVE: &str = "active";
const STATUS_CANCELLED: &str = "cancelled";

#[derive(Debug, Clone)]
pub struct SubscriptionApi {
    http: HttpClient,
    subscriptions: Endpoint,
    app_origin: String,
}

impl SubscriptionApi {
    pub fn new(ctx: &ApiContext) -> Result<Self, Error> {
        let http = HttpClient::new(ctx)?;
        Ok(Self {
            subscriptions: Endpoint::new(http.clone(), ctx.paths.subscriptions.clone()),
            app_origin: ctx.app_origin.trim_end_matches('/').to_owned(),
            http,
        })
    }

    /// First subscription held by `builder_id`, if any.
    pub async fn subscription_by_builder(
        &self,
        builder_id: u64,
    ) -> Result<Option<SubscriptionResource>, Error> {
        let resp: ApiResponse<Vec<SubscriptionResource>> = self
            .subscriptions
            .get_where(&[("builderId", builder_id.to_string())])
            .await
            .inspect_err(|e| warn!(builder_id, error = %e, "failed to list subscriptions"))?;
        Ok(resp.data.and_then(|rows| rows.into_iter().next()))
    }

    pub async fn subscription(&self, id: u64) -> Result<SubscriptionResource, Error> {
        self.subscriptions
            .get_by_id(id)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to fetch subscription"))
    }

    pub async fn create(
        &self,
        subscription: &SubscriptionResource,
    ) -> Result<SubscriptionResource, Error> {
        self.subscriptions
            .create(subscription)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(error = %e, "failed to create subscription"))
    }

    /// `PUT {subs}/{id}` with the full resource.
    pub async fn update(
        &self,
        id: u64,
        subscription: &SubscriptionResource,
    ) -> Result<Option<SubscriptionResource>, Error> {
        self.subscriptions
            .update(id, subscription)
            .await
            .map(|resp| resp.data)
            .inspect_err(|e| warn!(id, error = %e, "failed to update subscription"))
    }

    /// Mark active and push the end date one renewal period from now.
    pub async fn renew(&self, id: u64) -> Result<Option<SubscriptionResource>, Error> {
        let end = Utc::now() + TimeDelta::days(RENEWAL_DAYS);
        let patch = SubscriptionPatch {
            status: Some(STATUS_ACTIVE.into()),
            end_date: Some(end.to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        debug!(id, end_date = ?patch.end_date, "renewing subscription");
        self.patch(id, &patch).await
    }

    pub async fn cancel(&self, id: u64) -> Result<Option<SubscriptionResource>, Error> {
        let patch = SubscriptionPatch {
            status: Some(STATUS_CANCELLED.into()),
            end_date: None,
        };
        debug!(id, "cancelling subscription");
        self.patch(id, &patch).await
    }

    async fn patch(
        &self,
        id: u64,
        patch: &SubscriptionPatch,
    ) -> Result<Option<SubscriptionResource>, Error> {
        self.subscriptions
            .patch(id, patch)
            .await
            .map(|resp| resp.data)
            .inspect_err(|e| warn!(id, error = %e, "failed to patch subscription"))
    }

    /// `GET {subs}/{id}/invoices`
    pub async fn invoices(&self, id: u64) -> Result<ApiResponse<Vec<InvoiceResource>>, Error> {
        let path = format!("{}/invoices", self.subscriptions.item_path(id));
        self.http
            .get(&path)
            .await
            .inspect_err(|e| warn!(id, error = %e, "failed to list invoices"))
    }

    /// `POST {subs}/payments/create-session`. The payment provider appends
    /// its session id to the success URL.
    pub async fn create_checkout_session(
        &self,
        builder_id: u64,
        plan_id: u64,
    ) -> Result<CheckoutSessionResource, Error> {
        let landing = format!("{}/subscriptions/my-subscription", self.app_origin);
        let body = CheckoutSessionRequest {
            builder_id,
            plan_id,
            success_url: format!("{landing}?success=true"),
            cancel_url: format!("{landing}?canceled=true"),
        };
        self.http
            .post(&self.payments_path("create-session"), &body)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(builder_id, plan_id, error = %e, "checkout failed"))
    }

    /// `POST {subs}/payments/confirm`
    pub async fn confirm_payment(
        &self,
        builder_id: u64,
        session_id: &str,
    ) -> Result<PaymentConfirmationResource, Error> {
        let body = ConfirmPaymentRequest {
            builder_id,
            session_id,
        };
        self.http
            .post(&self.payments_path("confirm"), &body)
            .await
            .map(|resp| resp.data.unwrap_or_default())
            .inspect_err(|e| warn!(builder_id, error = %e, "payment confirmation failed"))
    }

    fn payments_path(&self, action: &str) -> String {
        format!(
            "{}/payments/{action}",
            self.subscriptions.path().trim_end_matches('/')
        )
    }
}
