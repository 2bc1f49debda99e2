//! Subscription command handlers.

use iobuilt_core::{App, Invoice, Plan, Subscription, SubscriptionStore};
use tabled::Tabled;

use crate::cli::{GlobalOpts, SubscriptionArgs, SubscriptionCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Plan")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Devices")]
    devices: String,
    #[tabled(rename = "Admins")]
    admins: String,
    #[tabled(rename = "Support")]
    support: String,
    #[tabled(rename = "Current")]
    current: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn limit(value: i32, unlimited: bool) -> String {
    if unlimited {
        "unlimited".into()
    } else {
        value.to_string()
    }
}

fn plan_row(p: &Plan, current: Option<&str>) -> PlanRow {
    PlanRow {
        id: p.id,
        name: p.name.clone(),
        price: p.formatted_price(),
        devices: limit(p.max_devices, p.has_unlimited_devices()),
        admins: limit(p.max_administrators, p.has_unlimited_administrators()),
        support: p.support_level.clone(),
        current: if current == Some(p.name.as_str()) { "*".into() } else { String::new() },
    }
}

fn detail(s: &Subscription) -> String {
    output::detail_lines(&[
        ("ID", s.id.to_string()),
        ("Plan", s.plan_name().to_owned()),
        ("Status", s.status.clone()),
        ("Price", s.formatted_price()),
        ("Started", util::date(s.start_date)),
        ("Ends", util::date(s.end_date)),
        ("Features", s.features.join(", ")),
    ])
}

fn print_subscription(sub: Option<&Subscription>, global: &GlobalOpts) -> Result<(), CliError> {
    let sub = sub.ok_or_else(|| CliError::not_found("subscription", "current", "subscription plans"))?;
    let out = output::render_single(&global.output, sub, detail, |s| s.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Resolve a plan by numeric id or case-insensitive name.
async fn find_plan(store: &SubscriptionStore, key: &str) -> Result<Plan, CliError> {
    store.fetch_plans().await;
    let plans = store.available_plans();
    let by_id = key.parse::<u64>().ok();
    plans
        .into_iter()
        .find(|p| Some(p.id) == by_id || p.name.eq_ignore_ascii_case(key))
        .ok_or_else(|| CliError::not_found("plan", key, "subscription plans"))
}

/// Mutations need the current subscription loaded first.
async fn load_current(store: &SubscriptionStore) -> Result<(), CliError> {
    store.fetch_current_subscription().await;
    util::ensure_no_errors(store.errors())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    app: &App,
    args: SubscriptionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = app.subscriptions();

    match args.command {
        SubscriptionCommand::Show => {
            load_current(store).await?;
            print_subscription(store.current_subscription().as_ref(), global)
        }

        SubscriptionCommand::Plans => {
            store.fetch_current_subscription().await;
            store.fetch_plans().await;
            let current = store.current_plan().map(|p| p.name);
            let plans = store.available_plans();
            let out = output::render_list(
                &global.output,
                &plans,
                |p| plan_row(p, current.as_deref()),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SubscriptionCommand::Invoices => {
            load_current(store).await?;
            let invoices: Vec<Invoice> = store.fetch_invoices().await;
            util::ensure_no_errors(store.errors())?;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &invoices,
                |i| InvoiceRow {
                    id: i.id.clone(),
                    date: util::date(i.date),
                    amount: i.formatted_amount(),
                    status: output::paint_status(&i.status, color),
                    description: i.description.clone(),
                },
                |i| i.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SubscriptionCommand::Renew => {
            load_current(store).await?;
            let renewed = store.renew_subscription().await?;
            print_subscription(renewed.as_ref(), global)
        }

        SubscriptionCommand::Cancel => {
            load_current(store).await?;
            if !util::confirm("Cancel the current subscription?", global.yes)? {
                return Ok(());
            }
            let cancelled = store.cancel_subscription().await?;
            print_subscription(cancelled.as_ref(), global)
        }

        SubscriptionCommand::ChangePlan { plan } => {
            load_current(store).await?;
            let plan = find_plan(store, &plan).await?;
            let changed = store.change_plan(&plan).await?;
            print_subscription(changed.as_ref(), global)
        }

        SubscriptionCommand::Checkout { plan } => {
            let plan = find_plan(store, &plan).await?;
            let session = store.start_checkout(&plan).await?;
            let out = output::render_single(
                &global.output,
                &session,
                |s| output::detail_lines(&[("Session", s.session_id.clone()), ("URL", s.url.clone())]),
                |s| s.url.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SubscriptionCommand::Confirm { session_id } => {
            let confirmation = store.confirm_payment(&session_id).await?;
            if !confirmation.success {
                return Err(CliError::Api {
                    message: confirmation
                        .message
                        .unwrap_or_else(|| "payment was not confirmed".into()),
                    status: None,
                });
            }
            output::notice("Payment confirmed", global.quiet);
            print_subscription(store.current_subscription().as_ref(), global)
        }
    }
}
