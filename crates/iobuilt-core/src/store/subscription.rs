// ── Subscription store ──
//
// The acting builder's subscription, the plan catalogue and billing.
// Every mutation re-fetches the subscription afterwards.

use iobuilt_api::models::SubscriptionResource;
use iobuilt_api::{ApiContext, PlanApi, SubscriptionApi};
use tracing::{debug, info};

use super::state::{ErrorLog, LoadingFlag, Observable, RequestFence};
use crate::config::SimulatedSession;
use crate::convert::entities_from_response;
use crate::error::CoreError;
use crate::facade::{ActingUser, IamFacade};
use crate::model::{
    CheckoutSession, Invoice, PaymentConfirmation, Plan, Subscription, SubscriptionPlan,
    plan_catalogue,
};
use crate::stream::StateStream;

#[derive(Debug)]
pub struct SubscriptionStore {
    api: SubscriptionApi,
    plans_api: PlanApi,
    iam: IamFacade,
    simulated: SimulatedSession,
    current: Observable<Option<Subscription>>,
    available_plans: Observable<Vec<Plan>>,
    invoices: Observable<Vec<Invoice>>,
    loading: LoadingFlag,
    errors: ErrorLog,
    fence: RequestFence,
}

impl SubscriptionStore {
    pub fn new(
        ctx: &ApiContext,
        iam: IamFacade,
        simulated: SimulatedSession,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            api: SubscriptionApi::new(ctx)?,
            plans_api: PlanApi::new(ctx)?,
            iam,
            simulated,
            current: Observable::new(None),
            available_plans: Observable::new(plan_catalogue()),
            invoices: Observable::default(),
            loading: LoadingFlag::new(),
            errors: ErrorLog::new(),
            fence: RequestFence::new(),
        })
    }

    fn builder(&self, action: &'static str) -> Result<ActingUser, CoreError> {
        self.iam
            .acting_user(&self.simulated)
            .map_err(|e| self.errors.capture(action, e))
    }

    fn require_current(&self, action: &'static str) -> Result<Subscription, CoreError> {
        self.current
            .get()
            .ok_or_else(|| self.errors.capture(action, CoreError::NoCurrentSubscription))
    }

    // ── Fetches ──────────────────────────────────────────────────────

    /// Load the builder's subscription. A builder without one keeps the
    /// previous state.
    pub async fn fetch_current_subscription(&self) -> Option<Subscription> {
        let _loading = self.loading.guard();
        let ticket = self.fence.ticket();
        let builder = self.builder("fetch_current_subscription").ok()?;

        match self.api.subscription_by_builder(builder.id).await {
            Ok(Some(resource)) => {
                let subscription = Subscription::from(resource);
                if self.fence.is_current(ticket) {
                    debug!(id = subscription.id, status = %subscription.status, "subscription loaded");
                    self.current.set(Some(subscription.clone()));
                }
                Some(subscription)
            }
            Ok(None) => {
                debug!(builder_id = builder.id, "builder has no subscription");
                None
            }
            Err(e) => {
                self.errors.record("fetch_current_subscription", e.into());
                None
            }
        }
    }

    /// Plans offered by the backend. An empty answer keeps the catalogue.
    pub async fn fetch_plans(&self) -> Vec<Plan> {
        let _loading = self.loading.guard();
        match self.plans_api.plans().await {
            Ok(resp) => {
                let plans: Vec<Plan> = entities_from_response(resp);
                if !plans.is_empty() {
                    self.available_plans.set(plans);
                }
                self.available_plans.get()
            }
            Err(e) => {
                self.errors.record("fetch_plans", e.into());
                Vec::new()
            }
        }
    }

    pub async fn fetch_invoices(&self) -> Vec<Invoice> {
        let Ok(current) = self.require_current("fetch_invoices") else {
            return Vec::new();
        };
        let _loading = self.loading.guard();
        match self.api.invoices(current.id).await {
            Ok(resp) => {
                let invoices: Vec<Invoice> = entities_from_response(resp);
                self.invoices.set(invoices.clone());
                invoices
            }
            Err(e) => {
                self.errors.record("fetch_invoices", e.into());
                Vec::new()
            }
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Extend the subscription one renewal period and reactivate it.
    pub async fn renew_subscription(&self) -> Result<Option<Subscription>, CoreError> {
        let current = self.require_current("renew_subscription")?;
        {
            let _loading = self.loading.guard();
            self.api
                .renew(current.id)
                .await
                .map_err(|e| self.errors.capture("renew_subscription", e))?;
        }
        info!(id = current.id, "subscription renewed");
        Ok(self.fetch_current_subscription().await)
    }

    pub async fn cancel_subscription(&self) -> Result<Option<Subscription>, CoreError> {
        let current = self.require_current("cancel_subscription")?;
        {
            let _loading = self.loading.guard();
            self.api
                .cancel(current.id)
                .await
                .map_err(|e| self.errors.capture("cancel_subscription", e))?;
        }
        info!(id = current.id, "subscription cancelled");
        Ok(self.fetch_current_subscription().await)
    }

    /// Move the subscription to `plan`, taking over its price.
    pub async fn change_plan(&self, plan: &Plan) -> Result<Option<Subscription>, CoreError> {
        let current = self.require_current("change_plan")?;
        let updated = Subscription {
            plan: current.plan.switched_to(plan),
            price: plan.price,
            ..current
        };
        {
            let _loading = self.loading.guard();
            self.api
                .update(updated.id, &SubscriptionResource::from(&updated))
                .await
                .map_err(|e| self.errors.capture("change_plan", e))?;
        }
        info!(id = updated.id, plan = %plan.name, "plan changed");
        Ok(self.fetch_current_subscription().await)
    }

    /// Open a payment checkout for `plan`.
    pub async fn start_checkout(&self, plan: &Plan) -> Result<CheckoutSession, CoreError> {
        let builder = self.builder("start_checkout")?;
        let _loading = self.loading.guard();
        let session = self
            .api
            .create_checkout_session(builder.id, plan.id)
            .await
            .map(CheckoutSession::from)
            .map_err(|e| self.errors.capture("start_checkout", e))?;
        info!(builder_id = builder.id, plan = %plan.name, "checkout session opened");
        Ok(session)
    }

    /// Confirm a completed checkout. The subscription in the answer is
    /// adopted; otherwise a successful confirmation triggers a re-fetch.
    pub async fn confirm_payment(&self, session_id: &str) -> Result<PaymentConfirmation, CoreError> {
        let builder = self.builder("confirm_payment")?;
        let confirmation = {
            let _loading = self.loading.guard();
            self.api
                .confirm_payment(builder.id, session_id)
                .await
                .map(PaymentConfirmation::from)
                .map_err(|e| self.errors.capture("confirm_payment", e))?
        };

        match &confirmation.subscription {
            Some(subscription) => self.current.set(Some(subscription.clone())),
            None if confirmation.success => {
                self.fetch_current_subscription().await;
            }
            None => {}
        }
        info!(builder_id = builder.id, success = confirmation.success, "payment confirmed");
        Ok(confirmation)
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn current_subscription(&self) -> Option<Subscription> {
        self.current.get()
    }

    pub fn available_plans(&self) -> Vec<Plan> {
        self.available_plans.get()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.invoices.get()
    }

    /// The subscribed plan: embedded in the subscription, or looked up in
    /// the available plans by name.
    pub fn current_plan(&self) -> Option<Plan> {
        let current = self.current.get()?;
        match current.plan {
            SubscriptionPlan::Detailed(plan) => Some(plan),
            SubscriptionPlan::Name(name) => self
                .available_plans
                .with(|plans| plans.iter().find(|p| p.name == name).cloned()),
        }
    }

    /// Plans other than the subscribed one; all of them without a
    /// subscription.
    pub fn other_plans(&self) -> Vec<Plan> {
        let current = self.current.get();
        self.available_plans.with(|plans| match current {
            Some(sub) => plans
                .iter()
                .filter(|p| p.name != sub.plan_name())
                .cloned()
                .collect(),
            None => plans.clone(),
        })
    }

    pub fn subscribe_current(&self) -> StateStream<Option<Subscription>> {
        self.current.subscribe()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }
}
