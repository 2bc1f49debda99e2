#![allow(clippy::unwrap_used)]
// Integration tests for the IoBuilt API classes using wiremock.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iobuilt_api::models::{
    BuilderDashboardResource, DeviceResource, PlanRef, ProjectResource, SchemaVersion,
};
use iobuilt_api::session::{CURRENT_USER_KEY, TOKEN_KEY};
use iobuilt_api::{
    AnalyticsApi, AnalyticsQuery, ApiContext, ClientApi, DeviceApi, Error, IamApi,
    MemorySessionStore, MonitoringApi, Navigator, ProfileApi, ProjectApi, SessionReader,
    SessionStore, StoredUser, SubscriptionApi,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited.lock().unwrap().push(path.to_owned());
    }
}

struct Harness {
    server: MockServer,
    ctx: ApiContext,
    session: Arc<MemorySessionStore>,
    navigator: Arc<RecordingNavigator>,
}

async fn setup() -> Harness {
    let server = MockServer::start().await;
    let session = Arc::new(MemorySessionStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let ctx = ApiContext::new(
        Url::parse(&server.uri()).unwrap(),
        session.clone(),
        navigator.clone(),
    )
    .with_app_origin("https://app.iobuilt.test");
    Harness {
        server,
        ctx,
        session,
        navigator,
    }
}

fn signed_in(session: &MemorySessionStore) {
    session.save(
        "T",
        &StoredUser {
            id: 1,
            email: "a@b.com".into(),
            role: "builder".into(),
            username: None,
            name: None,
            photo_url: None,
        },
    );
}

// ── HTTP wrapper ────────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_attached_when_present() {
    let h = setup().await;
    signed_in(&h.session);

    Mock::given(method("GET"))
        .and(path("/devices"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let api = DeviceApi::new(&h.ctx).unwrap();
    let resp = api.devices().await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.data, Some(vec![]));
}

#[tokio::test]
async fn test_request_without_token_has_no_auth_header() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;

    DeviceApi::new(&h.ctx).unwrap().devices().await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_navigates() {
    let h = setup().await;
    signed_in(&h.session);

    Mock::given(method("GET"))
        .and(path("/projects/9"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let result = ProjectApi::new(&h.ctx).unwrap().project(9).await;

    assert!(matches!(result, Err(Error::Unauthorized)), "got: {result:?}");
    assert!(h.session.get(TOKEN_KEY).is_none());
    assert!(h.session.get(CURRENT_USER_KEY).is_none());
    assert_eq!(*h.navigator.visited.lock().unwrap(), vec!["/login".to_owned()]);
}

#[tokio::test]
async fn test_non_2xx_surfaces_backend_message() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/external_clients"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "email is invalid"})),
        )
        .mount(&h.server)
        .await;

    let result = ClientApi::new(&h.ctx)
        .unwrap()
        .create(&Default::default())
        .await;

    match result {
        Err(Error::Status {
            status, message, ..
        }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "email is invalid");
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
    assert!(h.navigator.visited.lock().unwrap().is_empty());
}

// ── IAM ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_posts_credentials() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/authentication/sign-in"))
        .and(body_json(json!({"email": "a@b.com", "password": "x"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "email": "a@b.com", "role": "builder", "token": "T"
        })))
        .mount(&h.server)
        .await;

    let password: SecretString = "x".to_string().into();
    let user = IamApi::new(&h.ctx)
        .unwrap()
        .sign_in("a@b.com", &password)
        .await
        .unwrap();

    assert_eq!(user.id, Some(1));
    assert_eq!(user.role, "builder");
    assert_eq!(user.token, "T");
}

#[tokio::test]
async fn test_change_password_puts_to_user_path() {
    let h = setup().await;

    Mock::given(method("PUT"))
        .and(path("/users/4/password"))
        .and(body_json(json!({
            "currentPassword": "old",
            "newPassword": "new",
            "confirmNewPassword": "new"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    let old: SecretString = "old".to_string().into();
    let new: SecretString = "new".to_string().into();
    IamApi::new(&h.ctx)
        .unwrap()
        .change_password(4, &old, &new, &new)
        .await
        .unwrap();
}

// ── Profiles ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_profile_requires_user_id() {
    let h = setup().await;
    let result = ProfileApi::new(&h.ctx).unwrap().profile(0).await;
    assert!(matches!(result, Err(Error::MissingArgument(_))));
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_merges_user_and_detail() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "email": "owner@b.com", "role": "owner"
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user_details"))
        .and(query_param("userId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "userId": 7, "name": "Ana Ruiz", "phoneNumber": "555-0101"}
        ])))
        .mount(&h.server)
        .await;

    let profile = ProfileApi::new(&h.ctx).unwrap().profile(7).await.unwrap();

    assert_eq!(profile.user_id, Some(7));
    assert_eq!(profile.email.as_deref(), Some("owner@b.com"));
    assert_eq!(profile.name.as_deref(), Some("Ana Ruiz"));
    assert_eq!(profile.phone_number.as_deref(), Some("555-0101"));
}

// ── Projects ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_projects_by_builder_filters_in_order() {
    let h = setup().await;

    // Backend ignores the query and returns everything.
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "name": "Torre A", "builderId": 1},
            {"id": 11, "name": "Torre B", "builderId": 2},
            {"id": 12, "name": "Torre C", "builderId": 1}
        ])))
        .mount(&h.server)
        .await;

    let resp = ProjectApi::new(&h.ctx)
        .unwrap()
        .projects_by_builder(1)
        .await
        .unwrap();

    let ids: Vec<_> = resp
        .data
        .unwrap()
        .iter()
        .map(|p: &ProjectResource| p.id.unwrap())
        .collect();
    assert_eq!(ids, vec![10, 12]);

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("builderId=1"));
}

#[tokio::test]
async fn test_delete_project_accepts_empty_body() {
    let h = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/projects/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&h.server)
        .await;

    ProjectApi::new(&h.ctx).unwrap().delete(3).await.unwrap();
}

// ── Subscriptions ───────────────────────────────────────────────────

#[tokio::test]
async fn test_subscription_by_builder_takes_first_match() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 4, "builderId": 2, "plan": "Starter"},
            {"id": 5, "builderId": 1, "plan": {"id": 1, "name": "Professional", "price": 799}}
        ])))
        .mount(&h.server)
        .await;

    let sub = SubscriptionApi::new(&h.ctx)
        .unwrap()
        .subscription_by_builder(1)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(sub.id, Some(5));
    assert_eq!(sub.schema_version(), SchemaVersion::V2);
    assert!(matches!(sub.plan, Some(PlanRef::Embedded(_))));
}

#[tokio::test]
async fn test_renew_patches_status_and_end_date() {
    let h = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/subscriptions/5"))
        .and(body_partial_json(json!({"status": "active"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "builderId": 1, "status": "active"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let before = Utc::now();
    let updated = SubscriptionApi::new(&h.ctx)
        .unwrap()
        .renew(5)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status.as_deref(), Some("active"));

    let requests = h.server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let end: DateTime<Utc> = body["endDate"].as_str().unwrap().parse().unwrap();
    let expected = before + TimeDelta::days(365);
    assert!((end - expected).num_seconds().abs() < 60, "endDate {end} not ~{expected}");
}

#[tokio::test]
async fn test_cancel_sends_only_status() {
    let h = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/subscriptions/5"))
        .and(body_json(json!({"status": "cancelled"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&h.server)
        .await;

    SubscriptionApi::new(&h.ctx).unwrap().cancel(5).await.unwrap();
}

#[tokio::test]
async fn test_checkout_urls_use_app_origin() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/subscriptions/payments/create-session"))
        .and(body_json(json!({
            "builderId": 1,
            "planId": 3,
            "successUrl": "https://app.iobuilt.test/subscriptions/my-subscription?success=true",
            "cancelUrl": "https://app.iobuilt.test/subscriptions/my-subscription?canceled=true"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionId": "cs_1", "url": "https://pay.test/cs_1"
        })))
        .mount(&h.server)
        .await;

    let session = SubscriptionApi::new(&h.ctx)
        .unwrap()
        .create_checkout_session(1, 3)
        .await
        .unwrap();
    assert_eq!(session.session_id.as_deref(), Some("cs_1"));
}

// ── Monitoring & analytics ──────────────────────────────────────────

#[tokio::test]
async fn test_device_analytics_sends_time_range() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/2/analytics"))
        .and(query_param("timeRange", "7d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "deviceId": 2, "timestamp": "2024-06-15T10:30:00Z", "value": 21.5, "type": "temperature"}
        ])))
        .mount(&h.server)
        .await;

    let query = AnalyticsQuery::device(2).with_time_range("7d");
    let rows = MonitoringApi::new(&h.ctx)
        .unwrap()
        .analytics(&query)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind.as_deref(), Some("temperature"));
}

#[tokio::test]
async fn test_device_configuration_first_row() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/device_configurations"))
        .and(query_param("deviceId", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 8, "deviceId": 2, "status": "online", "value": 21.5, "unit": "°C"}
        ])))
        .mount(&h.server)
        .await;

    let cfg = MonitoringApi::new(&h.ctx)
        .unwrap()
        .device_configuration(2)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cfg.status.as_deref(), Some("online"));
    assert_eq!(cfg.value, Some(21.5));
}

#[tokio::test]
async fn test_dashboard_metrics_passes_role() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/analytics/metrics/1"))
        .and(query_param("role", "builder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalDevices": 12,
            "onlineDevices": 10,
            "temperatureHistory": [{"timestamp": "2024-06-15", "value": 22.0, "type": "temperature"}]
        })))
        .mount(&h.server)
        .await;

    let dashboard: BuilderDashboardResource = AnalyticsApi::new(&h.ctx)
        .unwrap()
        .dashboard_metrics(1, "builder")
        .await
        .unwrap();
    assert_eq!(dashboard.total_devices, 12);
    assert_eq!(dashboard.offline_devices, 0);
    assert_eq!(dashboard.temperature_history.len(), 1);
}

#[tokio::test]
async fn test_device_update_puts_full_resource() {
    let h = setup().await;

    let device = DeviceResource {
        id: Some(3),
        name: Some("Medidor 3".into()),
        device_type: Some("energy".into()),
        location: Some("Lobby".into()),
        project_id: Some(1),
        status: Some("Online".into()),
        mac_address: Some("aa:bb".into()),
        ..DeviceResource::default()
    };

    Mock::given(method("PUT"))
        .and(path("/devices/3"))
        .and(body_json(json!({
            "id": 3, "name": "Medidor 3", "type": "energy", "location": "Lobby",
            "projectId": 1, "status": "Online", "macAddress": "aa:bb"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&device))
        .expect(1)
        .mount(&h.server)
        .await;

    let updated = DeviceApi::new(&h.ctx).unwrap().update(3, &device).await.unwrap();
    assert_eq!(updated, device);
}
