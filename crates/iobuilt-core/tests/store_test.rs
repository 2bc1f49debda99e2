#![allow(clippy::unwrap_used)]
// Integration tests for the IoBuilt stores against a wiremock backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iobuilt_api::session::{CURRENT_USER_KEY, TOKEN_KEY};
use iobuilt_api::{MemorySessionStore, NoopNavigator, SessionReader, SessionStore, StoredUser};
use iobuilt_core::{App, AppConfig, CoreError, DeviceStatus, Profile, Role, SimulatedSession};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Arc<MemorySessionStore>, App) {
    setup_with(SimulatedSession::default()).await
}

async fn setup_with(simulated: SimulatedSession) -> (MockServer, Arc<MemorySessionStore>, App) {
    let server = MockServer::start().await;
    let session = Arc::new(MemorySessionStore::new());
    let mut config = AppConfig::new(Url::parse(&server.uri()).unwrap());
    config.simulated_session = simulated;
    let app = App::new(config, session.clone(), Arc::new(NoopNavigator)).unwrap();
    (server, session, app)
}

fn sign_in_as(session: &MemorySessionStore, id: u64, role: &str) {
    session.save(
        "T",
        &StoredUser {
            id,
            email: "a@b.com".into(),
            role: role.into(),
            username: None,
            name: None,
            photo_url: None,
        },
    );
}

fn project(id: u64, builder_id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "totalUnits": 40,
        "occupiedUnits": 30,
        "status": "active",
        "builderId": builder_id
    })
}

// ── IAM ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_persists_minimal_session() {
    let (server, session, app) = setup().await;

    Mock::given(method("POST"))
        .and(path("/authentication/sign-in"))
        .and(body_partial_json(json!({ "email": "a@b.com", "password": "x" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "email": "a@b.com", "role": "builder", "token": "T"
        })))
        .mount(&server)
        .await;

    let password: SecretString = "x".to_string().into();
    let user = app.iam().sign_in("a@b.com", &password).await.unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(user.role, Role::Builder);
    assert_eq!(session.get(TOKEN_KEY).as_deref(), Some("T"));
    assert_eq!(
        session.get(CURRENT_USER_KEY).as_deref(),
        Some(r#"{"id":1,"email":"a@b.com","role":"builder"}"#)
    );
    assert!(app.iam().is_authenticated());
    assert!(!app.iam().loading().is_loading());
    // The profile lookup 404s; that is logged, not recorded.
    assert!(app.iam().errors().is_empty());
}

#[tokio::test]
async fn test_sign_in_copies_profile_fields() {
    let (server, session, app) = setup().await;

    Mock::given(method("POST"))
        .and(path("/authentication/sign-in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4, "email": "o@b.com", "role": "owner", "token": "T4"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": 4, "email": "o@b.com", "role": "owner" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user_details"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 9, "userId": 4, "username": "olga", "name": "Olga Paz", "photoUrl": "" }
        ])))
        .mount(&server)
        .await;

    let password: SecretString = "pw".to_string().into();
    app.iam().sign_in("o@b.com", &password).await.unwrap();

    let stored = session.current_user().unwrap();
    assert_eq!(stored.username.as_deref(), Some("olga"));
    assert_eq!(stored.name.as_deref(), Some("Olga Paz"));
    assert!(stored.photo_url.is_none());
}

#[tokio::test]
async fn test_failed_sign_in_is_recorded() {
    let (server, session, app) = setup().await;

    Mock::given(method("POST"))
        .and(path("/authentication/sign-in"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let password: SecretString = "bad".to_string().into();
    let err = app.iam().sign_in("a@b.com", &password).await.unwrap_err();

    assert!(matches!(err, CoreError::Api { status: Some(400), .. }));
    assert_eq!(app.iam().errors().last(), Some(err));
    assert!(session.token().is_none());
    assert!(!app.iam().loading().is_loading());
}

#[tokio::test]
async fn test_sign_out_resets_profile() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": 1, "email": "a@b.com", "role": "builder" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user_details"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 2, "userId": 1, "name": "Ana" }
        ])))
        .mount(&server)
        .await;

    let profile = app.profile().fetch_current_profile().await.unwrap();
    assert_eq!(profile.name, "Ana");
    assert_eq!(profile.email, "a@b.com");
    assert_eq!(app.profile().view_type(), Some(Role::Builder));
    assert!(app.profile().is_loaded());

    app.sign_out();

    assert!(session.token().is_none());
    assert!(!app.profile().is_loaded());
    assert_eq!(app.profile().profile(), Profile::default());
    assert_eq!(app.profile().view_type(), None);
}

#[tokio::test]
async fn test_unauthorized_response_clears_session() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let projects = app.projects().fetch_projects().await;

    assert!(projects.is_empty());
    assert!(session.get(TOKEN_KEY).is_none());
    assert!(session.get(CURRENT_USER_KEY).is_none());
    assert!(!app.iam().is_authenticated());
    assert_eq!(app.projects().errors().last(), Some(CoreError::Unauthorized));
}

// ── Projects & clients ──────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_projects_keeps_only_the_builders_in_order() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    // The backend ignores the filter and returns everything.
    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(query_param("builderId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            project(10, 1, "Torre Norte"),
            project(11, 2, "Otro"),
            project(12, 1, "Torre Sur"),
        ])))
        .mount(&server)
        .await;

    assert_eq!(app.projects().projects_count(), 0);
    let projects = app.projects().fetch_projects().await;

    let ids: Vec<_> = projects.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![Some(10), Some(12)]);
    assert_eq!(app.projects().projects_count(), 2);
    assert_eq!(app.projects().project_by_id(12).unwrap().name, "Torre Sur");
    assert!(!app.projects().loading().is_loading());
}

#[tokio::test]
async fn test_simulated_session_drives_builder_id() {
    let (server, _session, app) = setup_with(SimulatedSession {
        user_id: Some(2),
        role: Some(Role::Builder),
    })
    .await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(query_param("builderId", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([project(11, 2, "Otro")])))
        .expect(1)
        .mount(&server)
        .await;

    let projects = app.projects().fetch_projects().await;
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn test_fetch_without_identity_records_not_authenticated() {
    let (_server, _session, app) = setup().await;
    let projects = app.projects().fetch_projects().await;
    assert!(projects.is_empty());
    assert_eq!(
        app.projects().errors().last(),
        Some(CoreError::NotAuthenticated)
    );
}

#[tokio::test]
async fn test_loading_flag_spans_the_request() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "boom" }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let background = app.clone();
    let task = tokio::spawn(async move { background.projects().fetch_projects().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.projects().loading().is_loading());

    let projects = task.await.unwrap();
    assert!(projects.is_empty());
    assert!(!app.projects().loading().is_loading());
    assert_eq!(app.projects().errors().len(), 1);
    assert!(!app.projects().is_loaded());
}

#[tokio::test]
async fn test_loading_flag_spans_a_successful_request() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([project(10, 1, "Torre Norte")]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let background = app.clone();
    let task = tokio::spawn(async move { background.projects().fetch_projects().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.projects().loading().is_loading());

    let projects = task.await.unwrap();
    assert_eq!(projects.len(), 1);
    assert!(!app.projects().loading().is_loading());
    assert!(app.projects().errors().is_empty());
    assert!(app.projects().is_loaded());
}

#[tokio::test]
async fn test_stale_project_response_is_discarded() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([project(10, 1, "Old")]))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([project(10, 1, "New")])))
        .mount(&server)
        .await;

    let background = app.clone();
    let slow = tokio::spawn(async move { background.projects().fetch_projects().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    app.projects().fetch_projects().await;
    let stale = slow.await.unwrap();

    assert_eq!(stale[0].name, "Old");
    assert_eq!(app.projects().projects()[0].name, "New");
}

#[tokio::test]
async fn test_delete_project_refetches() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("DELETE"))
        .and(path("/projects/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([project(12, 1, "Torre Sur")])))
        .expect(1)
        .mount(&server)
        .await;

    app.projects().delete_project(10).await.unwrap();
    assert_eq!(app.projects().projects_count(), 1);
}

#[tokio::test]
async fn test_delete_project_stays_loading_through_refetch() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("DELETE"))
        .and(path("/projects/10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([project(12, 1, "Torre Sur")]))
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&server)
        .await;

    let mut loading = app.projects().loading().subscribe();
    let background = app.clone();
    let task = tokio::spawn(async move { background.projects().delete_project(10).await });

    assert_eq!(loading.changed().await, Some(true));
    // Mid-delete, then mid-refetch.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.projects().loading().is_loading());
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(app.projects().loading().is_loading());

    task.await.unwrap().unwrap();
    assert!(!app.projects().loading().is_loading());
    assert_eq!(app.projects().projects_count(), 1);
}

#[tokio::test]
async fn test_clients_require_exact_200() {
    let (server, _session, app) = setup().await;

    Mock::given(method("GET"))
        .and(path("/external_clients"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([{ "id": 1, "fullName": "Luis" }])),
        )
        .mount(&server)
        .await;

    assert!(app.clients().fetch_clients().await.is_empty());
    assert!(app.clients().errors().is_empty());
}

#[tokio::test]
async fn test_clients_get_project_names_from_facade() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([project(10, 1, "Torre Norte")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/external_clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "fullName": "Luis", "projectId": 10 },
            { "id": 2, "fullName": "Marta", "projectId": 99 }
        ])))
        .mount(&server)
        .await;

    let facade = app.clients().projects().clone();
    assert!(!facade.are_projects_loaded());
    facade.fetch_projects().await;
    assert!(facade.are_projects_loaded());

    let clients = app.clients().fetch_clients().await;
    assert_eq!(clients[0].project_name, "Torre Norte");
    assert_eq!(clients[0].account_statement, "Active");
    assert_eq!(clients[1].project_name, "");
    assert_eq!(app.clients().clients_count(), 2);
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_device_getters_group_and_split() {
    let (server, _session, app) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "T1", "category": "Sensor de Temperatura", "status": "online" },
            { "id": 2, "name": "E1", "type": "energy", "status": "offline" },
            { "id": 3, "name": "T2", "type": "temperature", "status": "warning" }
        ])))
        .mount(&server)
        .await;

    app.devices().fetch_devices().await;

    assert_eq!(app.devices().total_devices(), 3);
    assert_eq!(app.devices().online_devices().len(), 1);
    assert_eq!(app.devices().offline_devices().len(), 2);
    let by_type = app.devices().devices_by_type();
    assert_eq!(by_type["temperature"].len(), 2);
    assert_eq!(by_type["energy"].len(), 1);
}

#[tokio::test]
async fn test_delete_device_clears_selection() {
    let (server, _session, app) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices/2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 2, "name": "E1", "type": "energy" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/devices/2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let device = app.devices().fetch_device_by_id(2).await.unwrap();
    assert_eq!(app.devices().selected_device(), Some(device));

    app.devices().delete_device(2).await.unwrap();
    assert!(app.devices().selected_device().is_none());
}

// ── Subscriptions ───────────────────────────────────────────────────

#[tokio::test]
async fn test_renew_then_refetch_is_active() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(query_param("builderId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 5, "builderId": 1, "plan": "Professional", "status": "expired", "price": 799
        }])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(query_param("builderId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 5, "builderId": 1, "plan": "Professional", "status": "active", "price": 799
        }])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/subscriptions/5"))
        .and(body_partial_json(json!({ "status": "active" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 5 })))
        .expect(1)
        .mount(&server)
        .await;

    let before = app.subscriptions().fetch_current_subscription().await.unwrap();
    assert_eq!(before.status, "expired");

    let renewed = app.subscriptions().renew_subscription().await.unwrap().unwrap();
    assert_eq!(renewed.status, "active");
    assert!(app.subscriptions().current_subscription().unwrap().is_active());

    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|r| r.method.as_str() == "PATCH")
        .unwrap();
    let body: Value = serde_json::from_slice(&patch.body).unwrap();
    let end: DateTime<Utc> = body["endDate"].as_str().unwrap().parse().unwrap();
    let expected = Utc::now() + TimeDelta::days(365);
    assert!((expected - end).num_seconds().abs() < 60);
}

#[tokio::test]
async fn test_mutation_without_subscription_fails() {
    let (_server, _session, app) = setup().await;

    let err = app.subscriptions().cancel_subscription().await.unwrap_err();
    assert_eq!(err, CoreError::NoCurrentSubscription);
    assert_eq!(
        app.subscriptions().errors().last(),
        Some(CoreError::NoCurrentSubscription)
    );
    assert_eq!(app.subscriptions().other_plans().len(), 3);
}

#[tokio::test]
async fn test_current_and_other_plans_by_name() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 5, "builderId": 1, "plan": "Starter", "status": "active"
        }])))
        .mount(&server)
        .await;

    app.subscriptions().fetch_current_subscription().await;

    assert!((app.subscriptions().current_plan().unwrap().price - 299.0).abs() < f64::EPSILON);
    let others: Vec<_> = app
        .subscriptions()
        .other_plans()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(others, ["Professional", "Enterprise"]);
}

#[tokio::test]
async fn test_change_plan_sends_new_plan_and_price() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 5, "builderId": 1, "plan": "Starter", "status": "active", "price": 299
        }])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/subscriptions/5"))
        .and(body_partial_json(json!({ "plan": "Enterprise", "price": 1299.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 5 })))
        .expect(1)
        .mount(&server)
        .await;

    app.subscriptions().fetch_current_subscription().await;
    let enterprise = app
        .subscriptions()
        .available_plans()
        .into_iter()
        .find(|p| p.is_enterprise())
        .unwrap();
    app.subscriptions().change_plan(&enterprise).await.unwrap();
}

// ── Monitoring ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_monitoring_enriches_devices_with_configuration() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "T1", "category": "Sensor de Temperatura", "status": "offline" },
            { "id": 2, "name": "E1", "type": "energy", "status": "online" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/device_configurations"))
        .and(query_param("deviceId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "deviceId": 1, "status": "online", "value": 21.5, "unit": "°C" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/device_configurations"))
        .and(query_param("deviceId", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/builders/1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            project(10, 1, "Torre Norte"),
            { "id": 11, "name": "Lote", "totalUnits": 10, "occupiedUnits": 0, "status": "planning" }
        ])))
        .mount(&server)
        .await;

    app.monitoring().initialize().await;
    let monitoring = app.monitoring();

    let devices = monitoring.devices();
    assert_eq!(devices[0].device_type, "temperature");
    assert_eq!(devices[0].status, DeviceStatus::Online);
    assert_eq!(devices[0].reading.as_ref().unwrap().value, Some(21.5));
    assert!(devices[1].reading.is_none());
    assert_eq!(monitoring.online_devices_count(), 2);
    assert_eq!(monitoring.offline_devices_count(), 0);

    assert_eq!(monitoring.projects_count(), 2);
    assert_eq!(monitoring.active_projects_count(), 1);
    assert_eq!(monitoring.total_units(), 50);
    assert_eq!(monitoring.occupied_units(), 30);
    assert!((monitoring.occupancy_rate() - 60.0).abs() < 1e-9);
    assert!(!monitoring.init_loading().is_loading());
    assert!(monitoring.errors().is_empty());
}

#[tokio::test]
async fn test_owner_sees_own_devices_and_no_projects() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 3, "owner");

    Mock::given(method("GET"))
        .and(path("/owners/3/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 4, "name": "D1", "type": "door", "status": "offline" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/device_configurations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/builders/3/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    app.monitoring().initialize().await;

    assert_eq!(app.monitoring().devices_count(), 1);
    assert_eq!(app.monitoring().offline_devices_count(), 1);
    assert!(app.monitoring().fetch_projects().await.is_empty());
    assert_eq!(app.monitoring().devices_by_type()["door"], 1);
}

#[tokio::test]
async fn test_failed_configuration_fails_device_fetch() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "name": "T1" }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/device_configurations"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(app.monitoring().fetch_devices().await.is_empty());
    assert_eq!(app.monitoring().errors().len(), 1);
    assert!(!app.monitoring().loading().is_loading());
}

// ── Analytics ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_builder_dashboard_and_history() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/analytics/metrics/1"))
        .and(query_param("role", "builder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalDevices": 12,
            "onlineDevices": 10,
            "devicesByType": { "energy": 4, "temperature": 8 },
            "energyHistory": [{ "timestamp": "2024-06-01", "value": 3.5, "type": "energy" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/analytics/insights"))
        .and(query_param("projectId", "10"))
        .and(query_param("metric", "energy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "timestamp": "2024-06-01T00:00:00Z", "value": 1.0, "type": "energy" },
            { "timestamp": "2024-06-02T00:00:00Z", "value": 2.0, "type": "energy" }
        ])))
        .mount(&server)
        .await;

    let dashboard = app.analytics().fetch_builder_dashboard(None).await.unwrap();
    assert_eq!(dashboard.total_devices, 12);
    assert_eq!(dashboard.devices_by_type["temperature"], 8);
    assert_eq!(dashboard.energy_history.len(), 1);
    assert_eq!(app.analytics().builder_dashboard(), Some(dashboard));

    let history = app
        .analytics()
        .fetch_historical_data(10, "energy", None, None)
        .await;
    assert_eq!(history.len(), 2);
    assert!(history[0].timestamp.is_some());
    assert_eq!(app.analytics().historical_data().len(), 2);

    app.analytics().clear_errors();
    assert!(app.analytics().errors().is_empty());
}

#[tokio::test]
async fn test_builder_and_owner_dashboards_are_fenced_separately() {
    let (server, session, app) = setup().await;
    sign_in_as(&session, 1, "builder");

    Mock::given(method("GET"))
        .and(path("/analytics/metrics/1"))
        .and(query_param("role", "builder"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "totalDevices": 12 }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/analytics/metrics/2"))
        .and(query_param("role", "owner"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "totalDevices": 3 }))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;

    let background = app.clone();
    let builder =
        tokio::spawn(async move { background.analytics().fetch_builder_dashboard(Some(1)).await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    let owner = app.analytics().fetch_owner_dashboard(Some(2)).await;
    let builder = builder.await.unwrap();

    assert_eq!(owner.as_ref().map(|d| d.total_devices), Some(3));
    assert_eq!(builder.as_ref().map(|d| d.total_devices), Some(12));
    assert_eq!(app.analytics().owner_dashboard(), owner);
    assert_eq!(app.analytics().builder_dashboard(), builder);
}
