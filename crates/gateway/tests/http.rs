//! HTTP surface tests against a scripted transport.

use std::{sync::Arc, time::Duration};

use {
    axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    },
    serde_json::{Value, json},
    tower::ServiceExt,
};

use {
    waygate_gateway::build_app,
    waygate_outbound::Dispatcher,
    waygate_session::{RetryPolicy, SessionRegistry},
    waygate_transport::{
        CredentialStore, TransportEvent,
        testing::{MemoryCredentialStore, ScriptedFactory},
    },
};

fn setup() -> (ScriptedFactory, SessionRegistry, Router) {
    let factory = ScriptedFactory::new();
    let registry = SessionRegistry::new(
        Arc::new(factory.clone()),
        Arc::new(MemoryCredentialStore::new()) as Arc<dyn CredentialStore>,
        RetryPolicy::default(),
    );
    let app = build_app(registry.clone(), Arc::new(Dispatcher::new(registry.clone())));
    (factory, registry, app)
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Drive a created session to connected through the scripted transport.
async fn connect_session(factory: &ScriptedFactory, registry: &SessionRegistry, phone: &str) {
    let mut events = registry.subscribe();
    tokio::time::timeout(Duration::from_secs(10), factory.wait_for_connects(1))
        .await
        .expect("no connect attempt");
    factory
        .last_connection()
        .unwrap()
        .events
        .send(TransportEvent::Connected {
            phone_number: phone.into(),
            display_name: Some("Device".into()),
        })
        .unwrap();
    tokio::time::timeout(Duration::from_secs(10), events.recv())
        .await
        .expect("no connected event")
        .expect("bus closed");
}

#[tokio::test]
async fn health_reports_ok() {
    let (_factory, _registry, app) = setup();
    let (status, body) = request(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_then_create_again_reports_existing() {
    let (_factory, _registry, app) = setup();

    let (status, body) =
        request(&app, "POST", "/session/create", Some(json!({"session_id": "a"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "initializing");

    let (status, body) =
        request(&app, "POST", "/session/create", Some(json!({"session_id": "a"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "existing");
}

#[tokio::test]
async fn create_rejects_bad_session_ids() {
    let (_factory, _registry, app) = setup();

    let (status, body) =
        request(&app, "POST", "/session/create", Some(json!({"session_id": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("session_id"));

    let (status, _) = request(
        &app,
        "POST",
        "/session/create",
        Some(json!({"session_id": "../escape"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_of_unknown_session_is_disconnected() {
    let (_factory, _registry, app) = setup();
    let (status, body) = request(&app, "GET", "/session/status/nope", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "disconnected");
}

#[tokio::test]
async fn qr_endpoint_serves_the_artifact_then_the_identity() {
    let (factory, registry, app) = setup();

    request(&app, "POST", "/session/create", Some(json!({"session_id": "q"}))).await;

    let (status, _) = request(&app, "GET", "/session/qr/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = request(&app, "GET", "/session/qr/q", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "waiting");

    let mut events = registry.subscribe();
    tokio::time::timeout(Duration::from_secs(10), factory.wait_for_connects(1))
        .await
        .expect("no connect attempt");
    let conn = factory.last_connection().unwrap();
    conn.events
        .send(TransportEvent::PairingCode("CODE".into()))
        .unwrap();
    tokio::time::timeout(Duration::from_secs(10), events.recv())
        .await
        .expect("no pairing event")
        .expect("bus closed");

    let (status, body) = request(&app, "GET", "/session/qr/q", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "qr_ready");
    assert!(
        body["qr"]
            .as_str()
            .unwrap()
            .starts_with("data:image/svg+xml;base64,")
    );

    let (_, body) = request(&app, "GET", "/session/status/q", None).await;
    assert_eq!(body["status"], "qr");

    conn.events
        .send(TransportEvent::Connected {
            phone_number: "15551234567".into(),
            display_name: Some("Queue".into()),
        })
        .unwrap();
    tokio::time::timeout(Duration::from_secs(10), events.recv())
        .await
        .expect("no connected event")
        .expect("bus closed");

    let (status, body) = request(&app, "GET", "/session/qr/q", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "connected");
    assert_eq!(body["phone"], "15551234567");
}

#[tokio::test]
async fn status_of_connected_session_carries_identity() {
    let (factory, registry, app) = setup();
    request(&app, "POST", "/session/create", Some(json!({"session_id": "b"}))).await;
    connect_session(&factory, &registry, "15551234567").await;

    let (status, body) = request(&app, "GET", "/session/status/b", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "connected");
    assert_eq!(body["phone"], "15551234567");
    assert_eq!(body["name"], "Device");
    assert!(body.get("degraded").is_none());
}

#[tokio::test]
async fn delete_unknown_session_is_404() {
    let (_factory, _registry, app) = setup();
    let (status, body) = request(&app, "DELETE", "/session/delete/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn delete_erases_the_session() {
    let (_factory, _registry, app) = setup();
    request(&app, "POST", "/session/create", Some(json!({"session_id": "d"}))).await;

    let (status, _) = request(&app, "DELETE", "/session/delete/d", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&app, "GET", "/session/status/d", None).await;
    assert_eq!(body["status"], "disconnected");
}

#[tokio::test]
async fn send_text_requires_a_connected_session() {
    let (_factory, _registry, app) = setup();
    request(&app, "POST", "/session/create", Some(json!({"session_id": "s"}))).await;

    let (status, body) = request(
        &app,
        "POST",
        "/message/text",
        Some(json!({"session_id": "s", "to": "15551234567", "message": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not connected"));
}

#[tokio::test]
async fn send_text_round_trip() {
    let (factory, registry, app) = setup();
    request(&app, "POST", "/session/create", Some(json!({"session_id": "s"}))).await;
    connect_session(&factory, &registry, "15559990000").await;

    let (status, body) = request(
        &app,
        "POST",
        "/message/text",
        Some(json!({"session_id": "s", "to": "15551234567", "message": "hello"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message_id"], "MSG-1");
    assert_eq!(factory.connection(0).unwrap().client.sent_count(), 1);
}

#[tokio::test]
async fn send_envelope_dispatches_by_type() {
    let (factory, registry, app) = setup();
    request(&app, "POST", "/session/create", Some(json!({"session_id": "s"}))).await;
    connect_session(&factory, &registry, "15559990000").await;

    let (status, body) = request(
        &app,
        "POST",
        "/message/send",
        Some(json!({
            "type": "contact",
            "session_id": "s",
            "to": "15551234567",
            "contact": {"name": "Ada", "number": "15557654321"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn list_reports_created_sessions() {
    let (factory, registry, app) = setup();
    request(&app, "POST", "/session/create", Some(json!({"session_id": "one"}))).await;
    request(&app, "POST", "/session/create", Some(json!({"session_id": "two"}))).await;
    connect_session(&factory, &registry, "15550000001").await;

    let (status, body) = request(&app, "GET", "/sessions/list", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(
        sessions
            .iter()
            .any(|s| s["status"] == "connected" || s["status"] == "pending")
    );
}
