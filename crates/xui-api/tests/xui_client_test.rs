#![allow(clippy::unwrap_used)]
// Integration tests for `XuiClient` using wiremock.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xui_api::{
    ApiFailure, ApiResponse, ClientPatch, Error, MemoryCache, PanelConfig, SESSION_CACHE_KEY,
    SESSION_TTL, SessionCache, SourceUser, SyncOutcome, XuiClient,
};

// ── Helpers ─────────────────────────────────────────────────────────

const TOKEN: &str = "session-token";

fn panel_config(server: &MockServer) -> PanelConfig {
    let addr = server.address();
    PanelConfig {
        scheme: "http".into(),
        host: addr.ip().to_string(),
        port: addr.port(),
        path: "xui".into(),
        username: "admin".into(),
        password: SecretString::from("secret".to_string()),
        inbound_id: "1".into(),
        ..PanelConfig::default()
    }
}

async fn setup() -> (MockServer, XuiClient) {
    let server = MockServer::start().await;
    let client = XuiClient::new(panel_config(&server)).unwrap();
    (server, client)
}

async fn setup_with_cache(cache: Arc<dyn SessionCache>) -> (MockServer, XuiClient) {
    let server = MockServer::start().await;
    let client = XuiClient::with_cache(panel_config(&server), cache).unwrap();
    (server, client)
}

fn api_path(suffix: &str) -> String {
    format!("/xui/panel/api/inbounds/{suffix}")
}

fn session_cookie() -> String {
    format!("3x-ui={TOKEN}")
}

async fn mount_login(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/xui/login"))
        .and(body_string_contains("username=admin"))
        .and(body_string_contains("password=secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("3x-ui={TOKEN}; Path=/; HttpOnly").as_str())
                .set_body_json(json!({ "success": true, "msg": "Login Successfully", "obj": null })),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn inbound_body(clients: &Value) -> Value {
    json!({
        "success": true,
        "msg": "",
        "obj": {
            "id": 2,
            "remark": "vless-reality",
            "protocol": "vless",
            "port": 443,
            "enable": true,
            "settings": json!({ "clients": clients, "decryption": "none" }).to_string(),
        }
    })
}

async fn mount_inbound(server: &MockServer, inbound: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(api_path(&format!("get/{inbound}"))))
        .and(header("cookie", session_cookie().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn ok_body() -> Value {
    json!({ "success": true, "msg": "ok", "obj": null })
}

fn source_user(telegram_id: i64) -> SourceUser {
    SourceUser {
        uuid: "user-uuid".into(),
        email: "user@example.com".into(),
        telegram_id,
        limit_ip: None,
        total_gb: None,
        reset: None,
        ends_at: Some(Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()),
        is_enabled: None,
        subscription_link: "sub-token".into(),
    }
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_cached_session_skips_login() {
    let cache = Arc::new(MemoryCache::new());
    cache.put(SESSION_CACHE_KEY, "cached-token".into(), SESSION_TTL);
    let (server, client) = setup_with_cache(cache).await;

    mount_login(&server, 0).await;
    Mock::given(method("GET"))
        .and(path(api_path("getClientTrafficsById/u1")))
        .and(header("cookie", "3x-ui=cached-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.traffic_by_uuid("u1").await.unwrap();
    assert!(resp.is_success());
}

#[tokio::test]
async fn test_login_once_then_reuse_session() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(api_path("getClientTrafficsById/u1")))
        .and(header("cookie", session_cookie().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(2)
        .mount(&server)
        .await;

    assert!(client.traffic_by_uuid("u1").await.unwrap().is_success());
    assert!(client.traffic_by_uuid("u1").await.unwrap().is_success());
}

#[tokio::test]
async fn test_shared_cache_reuses_token_across_clients() {
    let cache: Arc<dyn SessionCache> = Arc::new(MemoryCache::new());
    let (server, first) = setup_with_cache(Arc::clone(&cache)).await;
    let second = XuiClient::with_cache(panel_config(&server), cache).unwrap();

    mount_login(&server, 1).await;

    assert_eq!(first.session_token().await.unwrap().as_deref(), Some(TOKEN));
    assert_eq!(second.session_token().await.unwrap().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_login_rejected_short_circuits() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/xui/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "msg": "Wrong username or password" })),
        )
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(client.session_token().await.unwrap(), None);

    let resp = client.list_clients(None).await.unwrap();
    assert_eq!(resp, ApiResponse::Failure(ApiFailure::LoginFailed));
    assert_eq!(resp.to_value(), json!({ "error": "Login failed" }));

    let resp = client.delete_client("u1", Some("2")).await.unwrap();
    assert_eq!(resp.error_message(), Some("Login failed"));

    let found = client.client_by_tg_id(42, None).await.unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn test_login_without_cookie_short_circuits() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/xui/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("addClient")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&server)
        .await;

    let resp = client.add_client(ClientPatch::new("u2"), None).await.unwrap();
    assert_eq!(resp, ApiResponse::Failure(ApiFailure::LoginFailed));
}

#[tokio::test]
async fn test_login_http_error_yields_no_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/xui/login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    assert_eq!(client.session_token().await.unwrap(), None);

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_explicit_login_refreshes_cached_session() {
    let cache = Arc::new(MemoryCache::new());
    cache.put(SESSION_CACHE_KEY, "stale".into(), SESSION_TTL);
    let (server, client) = setup_with_cache(cache.clone()).await;

    mount_login(&server, 1).await;

    assert_eq!(client.login().await.unwrap(), TOKEN);
    assert_eq!(cache.get(SESSION_CACHE_KEY).as_deref(), Some(TOKEN));
}

// ── Client operations ───────────────────────────────────────────────

#[tokio::test]
async fn test_list_clients_uses_default_inbound() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    mount_inbound(&server, "1", inbound_body(&json!([]))).await;

    let resp = client.list_clients(None).await.unwrap();
    let body = resp.body().unwrap();
    assert_eq!(body["obj"]["remark"], "vless-reality");
    assert!(body["obj"]["settings"].is_string());
}

#[tokio::test]
async fn test_update_client_sends_only_supplied_fields() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(api_path("updateClient/u1")))
        .and(header("cookie", session_cookie().as_str()))
        .and(body_json(json!({
            "id": 2,
            "settings": r#"{"clients":[{"id":"u1","email":"a@b.com"}]}"#,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let patch = ClientPatch {
        email: Some("a@b.com".into()),
        ..ClientPatch::new("u1")
    };
    let resp = client.update_client(&patch, Some("2")).await.unwrap();
    assert_eq!(resp, ApiResponse::Success(ok_body()));
}

#[tokio::test]
async fn test_add_client_fills_defaults() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(api_path("addClient")))
        .and(header("cookie", session_cookie().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.add_client(ClientPatch::new("u2"), Some("2")).await.unwrap();
    assert!(resp.is_success());

    let requests = server.received_requests().await.unwrap();
    let add = requests
        .iter()
        .find(|r| r.url.path().ends_with("/addClient"))
        .unwrap();
    let body: Value = add.body_json().unwrap();
    assert_eq!(body["id"], 2);

    let settings: Value = serde_json::from_str(body["settings"].as_str().unwrap()).unwrap();
    let clients = settings["clients"].as_array().unwrap();
    assert_eq!(clients.len(), 1);

    let record = &clients[0];
    assert_eq!(record["id"], "u2");
    assert_eq!(record["flow"], "xtls-rprx-vision");
    assert_eq!(record["limitIp"], 1);
    assert_eq!(record["totalGB"], 0);
    assert_eq!(record["expiryTime"], 0);
    assert_eq!(record["enable"], false);
    assert_eq!(record["reset"], 0);
    assert_eq!(record["tgId"], Value::Null);
    assert_eq!(record["email"].as_str().unwrap().len(), 10);
    assert!(uuid::Uuid::parse_str(record["subId"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_delete_client_sends_inbound_id() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(api_path("deleteClient/u3")))
        .and(header("cookie", session_cookie().as_str()))
        .and(body_json(json!({ "id": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.delete_client("u3", None).await.unwrap().is_success());
}

#[tokio::test]
async fn test_non_numeric_inbound_is_rejected_before_sending() {
    let (server, client) = setup().await;

    mount_login(&server, 0).await;

    let result = client.delete_client("u3", Some("main")).await;
    assert!(matches!(result, Err(Error::InvalidInbound(ref id)) if id == "main"));
}

#[tokio::test]
async fn test_traffic_decodes_into_typed_view() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(api_path("getClientTrafficsById/u4")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "msg": "",
            "obj": [{
                "id": 9, "inboundId": 2, "enable": true, "email": "x",
                "up": 1024, "down": 4096, "expiryTime": 0, "total": 0, "reset": 0
            }]
        })))
        .mount(&server)
        .await;

    let resp = client.traffic_by_uuid("u4").await.unwrap();
    let traffic: Vec<xui_api::ClientTraffic> = resp.obj().unwrap().unwrap();
    assert_eq!(traffic.len(), 1);
    assert_eq!(traffic[0].up, 1024);
    assert_eq!(traffic[0].down, 4096);
    assert_eq!(traffic[0].inbound_id, 2);
}

// ── Lookup by external id ───────────────────────────────────────────

#[tokio::test]
async fn test_client_by_tg_id_found() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    mount_inbound(
        &server,
        "2",
        inbound_body(&json!([
            { "id": "a", "email": "first", "tgId": 7 },
            { "id": "b", "email": "second", "tgId": 42, "enable": true },
        ])),
    )
    .await;

    let found = client.client_by_tg_id(42, Some("2")).await.unwrap().unwrap();
    assert_eq!(found.id, "b");
    assert_eq!(found.email, "second");
    assert!(found.enable);
}

#[tokio::test]
async fn test_client_by_tg_id_matches_string_ids() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    mount_inbound(
        &server,
        "1",
        inbound_body(&json!([{ "id": "c", "email": "str", "tgId": "42" }])),
    )
    .await;

    let found = client.client_by_tg_id(42, None).await.unwrap();
    assert_eq!(found.map(|c| c.id).as_deref(), Some("c"));
}

#[tokio::test]
async fn test_client_by_tg_id_absent() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    mount_inbound(
        &server,
        "1",
        inbound_body(&json!([{ "id": "a", "email": "first", "tgId": 7 }])),
    )
    .await;

    assert_eq!(client.client_by_tg_id(42, None).await.unwrap(), None);
}

#[tokio::test]
async fn test_client_by_tg_id_malformed_settings() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    mount_inbound(
        &server,
        "1",
        json!({ "success": true, "obj": { "id": 1, "settings": "{not json" } }),
    )
    .await;

    assert_eq!(client.client_by_tg_id(42, None).await.unwrap(), None);
}

// ── Error normalization ─────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_is_structured() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(api_path("get/1")))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "success": false, "msg": "db locked" })),
        )
        .mount(&server)
        .await;

    let resp = client.list_clients(None).await.unwrap();
    assert_eq!(resp.status(), Some(500));
    assert_eq!(
        resp.to_value(),
        json!({
            "error": "Request failed",
            "status": 500,
            "details": { "success": false, "msg": "db locked" },
        })
    );

    let err = resp.into_result().unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_non_json_error_body_decodes_to_null() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path(api_path("getClientTrafficsById/u1")))
        .respond_with(ResponseTemplate::new(404).set_body_string("404 page not found"))
        .mount(&server)
        .await;

    let resp = client.traffic_by_uuid("u1").await.unwrap();
    assert_eq!(
        resp,
        ApiResponse::Failure(ApiFailure::RequestFailed {
            status: 404,
            details: Value::Null,
        })
    );
    assert!(resp.into_result().unwrap_err().is_not_found());
}

// ── Sync ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sync_updates_existing_client() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    mount_inbound(
        &server,
        "1",
        inbound_body(&json!([{ "id": "user-uuid", "email": "old", "tgId": 42 }])),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(api_path("updateClient/user-uuid")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("addClient")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = client.sync_user(&source_user(42), None).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Updated(ref r) if r.is_success()));

    let requests = server.received_requests().await.unwrap();
    let update = requests
        .iter()
        .find(|r| r.url.path().ends_with("/updateClient/user-uuid"))
        .unwrap();
    let body: Value = update.body_json().unwrap();
    let settings: Value = serde_json::from_str(body["settings"].as_str().unwrap()).unwrap();
    let record = &settings["clients"][0];
    assert_eq!(record["id"], "user-uuid");
    assert_eq!(record["email"], "user@example.com");
    assert_eq!(record["tgId"], 42);
    assert_eq!(record["limitIp"], 1);
    assert_eq!(record["enable"], true);
    assert_eq!(record["subId"], "sub-token");
    assert_eq!(record["expiryTime"], 1_906_545_600_000_i64);
}

#[tokio::test]
async fn test_sync_updates_record_with_loosely_typed_fields() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    mount_inbound(
        &server,
        "1",
        inbound_body(&json!([
            { "id": "existing", "tgId": 42, "limitIp": "2", "totalGB": null }
        ])),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(api_path("updateClient/user-uuid")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("addClient")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&server)
        .await;

    let found = client.client_by_tg_id(42, None).await.unwrap().unwrap();
    assert_eq!(found.id, "existing");
    assert_eq!(found.limit_ip, 2);
    assert_eq!(found.total_gb, 0);

    let outcome = client.sync_user(&source_user(42), None).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Updated(ref r) if r.is_success()));
}

#[tokio::test]
async fn test_sync_creates_missing_client() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    mount_inbound(
        &server,
        "3",
        inbound_body(&json!([{ "id": "other", "email": "o", "tgId": 7 }])),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(api_path("addClient")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("updateClient/user-uuid")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = client.sync_user(&source_user(42), Some("3")).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Created(_)));
    assert!(outcome.response().is_success());
}

#[tokio::test]
async fn test_sync_failure_is_returned_not_raised() {
    let (server, client) = setup().await;

    mount_login(&server, 1).await;
    mount_inbound(&server, "1", inbound_body(&json!([]))).await;
    Mock::given(method("POST"))
        .and(path(api_path("addClient")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "msg": "duplicate email" })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client.sync_user(&source_user(42), None).await.unwrap();
    assert_eq!(outcome.response().status(), Some(500));
}
