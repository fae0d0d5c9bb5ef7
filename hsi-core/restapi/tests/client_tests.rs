//! REST 客户端集成测试（进程内 axum 模拟 Configuration Manager）

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use hsi_restapi::{select_storage, RestApiError, RestClientConfig, StorageClient};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const TOKEN: &str = "5f84dc06-db56-4800-8fa1-67e3f71bbd41";
const DEVICE_ID: &str = "834000470018";

#[derive(Clone, Default)]
struct MockState {
    /// 收到的 DELETE 会话请求 (session id, body)
    deleted: Arc<Mutex<Vec<(String, Value)>>>,
    /// 收到的 LUN 查询参数
    lun_queries: Arc<Mutex<Vec<(String, String)>>>,
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "errorSource": "/ConfigurationManager", "message": "KART30005-E Authentication failed." })),
    )
        .into_response()
}

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Session {}", TOKEN))
}

fn has_basic(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.starts_with("Basic "))
}

async fn version() -> Json<Value> {
    Json(json!({ "productName": "Configuration Manager REST API", "apiVersion": "1.9.0" }))
}

async fn storages(headers: HeaderMap) -> axum::response::Response {
    if !has_basic(&headers) {
        return unauthorized();
    }
    Json(json!({ "data": [
        { "storageDeviceId": DEVICE_ID, "model": "VSP G400", "serialNumber": 470018, "svpIp": "10.70.5.104" }
    ] }))
    .into_response()
}

async fn create_session(Path(id): Path<String>, headers: HeaderMap) -> axum::response::Response {
    if id != DEVICE_ID || !has_basic(&headers) {
        return unauthorized();
    }
    Json(json!({ "token": TOKEN, "sessionId": 5 })).into_response()
}

async fn delete_session(
    State(state): State<MockState>,
    Path((_id, session)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    state.deleted.lock().unwrap().push((session, body));
    Json(json!({ "affectedResources": [] })).into_response()
}

async fn pools(headers: HeaderMap, Query(query): Query<std::collections::HashMap<String, String>>) -> axum::response::Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    assert_eq!(query.get("detailInfoType").map(String::as_str), Some("FMC"));
    Json(json!({ "data": [
        { "poolId": 3, "poolName": "RT_POOL", "poolType": "RT",
          "totalPoolCapacity": 10000000, "availableVolumeCapacity": 4000000 }
    ] }))
    .into_response()
}

async fn host_groups(headers: HeaderMap) -> axum::response::Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    Json(json!({ "data": [
        { "hostGroupId": "CL1-A,1", "portId": "CL1-A", "hostGroupNumber": 1,
          "hostGroupName": "esx01", "hostMode": "VMWARE_EX" }
    ] }))
    .into_response()
}

async fn luns(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<std::collections::HashMap<String, String>>,
) -> axum::response::Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    state.lun_queries.lock().unwrap().push((
        query.get("portId").cloned().unwrap_or_default(),
        query.get("hostGroupNumber").cloned().unwrap_or_default(),
    ));
    Json(json!({ "data": [
        { "lunId": "CL1-A,1,0", "portId": "CL1-A", "hostGroupNumber": 1, "lun": 0, "ldevId": 13312,
          "luHostReserve": { "openSystem": false, "persistent": false, "pgrKey": true,
                             "mainframe": false, "acaReserve": false } }
    ] }))
    .into_response()
}

async fn spawn_mock() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/ConfigurationManager/configuration/version", get(version))
        .route("/ConfigurationManager/v1/objects/storages", get(storages))
        .route(
            "/ConfigurationManager/v1/objects/storages/:id/sessions/",
            post(create_session),
        )
        .route(
            "/ConfigurationManager/v1/objects/storages/:id/sessions/:session",
            delete(delete_session),
        )
        .route("/ConfigurationManager/v1/objects/storages/:id/pools", get(pools))
        .route(
            "/ConfigurationManager/v1/objects/storages/:id/host-groups",
            get(host_groups),
        )
        .route("/ConfigurationManager/v1/objects/storages/:id/luns", get(luns))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("{}", port), state)
}

fn client(port: &str, password: &str) -> StorageClient {
    StorageClient::new(RestClientConfig {
        protocol: "http".to_string(),
        host: "127.0.0.1".to_string(),
        port: port.parse().unwrap(),
        user: "maintenance".to_string(),
        password: password.to_string(),
        ..RestClientConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_version_and_storage_selection() {
    let (port, _state) = spawn_mock().await;
    let client = client(&port, "raid-maintenance");

    let version = client.api_version().await.unwrap();
    assert_eq!(version.api_version, "1.9.0");
    assert!(version.ensure_at_least("1.5.0").is_ok());

    let storages = client.storage().list().await.unwrap();
    let storage = select_storage(&storages, None).unwrap();
    assert_eq!(storage.storage_device_id, DEVICE_ID);
}

#[tokio::test]
async fn test_session_lifecycle_and_pools() {
    let (port, state) = spawn_mock().await;
    let client = client(&port, "raid-maintenance");

    client.open_session(DEVICE_ID).await.unwrap();
    assert!(client.has_session().await);

    let pools = client.pools().list_raw().await.unwrap();
    assert_eq!(pools["data"][0]["poolName"], json!("RT_POOL"));

    client.close_session().await.unwrap();
    assert!(!client.has_session().await);

    let deleted = state.deleted.lock().unwrap().clone();
    assert_eq!(deleted, vec![("5".to_string(), json!({ "force": false }))]);

    // 第二次关闭无操作
    client.close_session().await.unwrap();
}

#[tokio::test]
async fn test_host_groups_and_luns() {
    let (port, state) = spawn_mock().await;
    let client = client(&port, "raid-maintenance");
    client.open_session(DEVICE_ID).await.unwrap();

    let groups = client.host_groups().list().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].host_group_name, "esx01");

    let luns = client
        .luns()
        .list(&groups[0].port_id, groups[0].host_group_number)
        .await
        .unwrap();
    assert_eq!(luns[0].ldev_id, 13312);
    assert_eq!(luns[0].lu_host_reserve.get("pgrKey"), Some(&true));

    let queries = state.lun_queries.lock().unwrap().clone();
    assert_eq!(queries, vec![("CL1-A".to_string(), "1".to_string())]);

    client.close_session().await.unwrap();
}

#[tokio::test]
async fn test_api_error_message_surfaced() {
    let (port, _state) = spawn_mock().await;
    let client = client(&port, "raid-maintenance");

    let err = client.open_session("000000000000").await.unwrap_err();
    match err {
        RestApiError::ApiError(status, message) => {
            assert_eq!(status, 401);
            assert_eq!(message, "KART30005-E Authentication failed.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_requests_without_session_or_credentials() {
    let (port, _state) = spawn_mock().await;
    let client = client(&port, "");

    assert!(matches!(
        client.storage().list().await,
        Err(RestApiError::AuthError(_))
    ));
    assert!(matches!(
        client.pools().list_raw().await,
        Err(RestApiError::AuthError(_))
    ));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    // 绑定后立即释放，得到一个没有监听者的端口
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port().to_string();
    drop(listener);

    let client = client(&port, "raid-maintenance");
    assert!(matches!(
        client.api_version().await,
        Err(RestApiError::HttpError(_))
    ));
}
