use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, put};
use axum::{Json, Router};
use expenseweb_client::RemoteExpenseApi;
use expenseweb_core::{parse_list_payload, ExpenseDraft, ExpenseSource, SourceError};
use serde_json::{json, Value};

#[derive(Default)]
struct FakeApi {
    records: Vec<Value>,
    next_id: usize,
    /// (method, path, content-type) of every request
    seen: Vec<(String, String, String)>,
}

type Shared = Arc<Mutex<FakeApi>>;

fn remember(api: &Shared, method: &str, path: String, headers: &HeaderMap) {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    api.lock()
        .expect("fake api lock")
        .seen
        .push((method.to_string(), path, content_type));
}

async fn list(State(api): State<Shared>, headers: HeaderMap) -> Json<Value> {
    remember(&api, "GET", "/expenses".to_string(), &headers);
    let records = api.lock().expect("fake api lock").records.clone();
    Json(Value::Array(records))
}

async fn create(
    State(api): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    remember(&api, "POST", "/expenses".to_string(), &headers);
    let mut guard = api.lock().expect("fake api lock");
    guard.next_id += 1;
    body["expense_id"] = json!(format!("srv-{}", guard.next_id));
    guard.records.push(body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn update(
    State(api): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    remember(&api, "PUT", format!("/expenses/{}", id), &headers);
    let mut guard = api.lock().expect("fake api lock");
    let record = guard
        .records
        .iter_mut()
        .find(|r| r["expense_id"] == id.as_str())
        .ok_or(StatusCode::NOT_FOUND)?;
    body["expense_id"] = json!(id);
    *record = body.clone();
    Ok(Json(body))
}

async fn delete(
    State(api): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> StatusCode {
    remember(&api, "DELETE", format!("/expenses/{}", id), &headers);
    let mut guard = api.lock().expect("fake api lock");
    let before = guard.records.len();
    guard.records.retain(|r| r["expense_id"] != id.as_str());
    if guard.records.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve fake api");
    });
    format!("http://{}", addr)
}

async fn spawn_fake_api(records: Vec<Value>) -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(FakeApi {
        records,
        ..FakeApi::default()
    }));
    let router = Router::new()
        .route("/prod/expenses", get(list).post(create))
        .route("/prod/expenses/:id", put(update).delete(delete))
        .with_state(state.clone());
    (format!("{}/prod", spawn(router).await), state)
}

fn draft(notes: &str) -> ExpenseDraft {
    ExpenseDraft {
        amount: 12.5,
        category: "Food".to_string(),
        notes: notes.to_string(),
        date: "2025-01-05T12:00:00.000Z".to_string(),
    }
}

#[tokio::test]
async fn crud_round_trip_against_fake_api() {
    let (base, state) = spawn_fake_api(vec![json!({
        "expense_id": "a b",
        "amount": 1,
        "category": "Bills",
        "notes": "seed",
        "date": "2025-01-01T00:00:00Z",
        "created_at": "2025-01-01T00:00:01",
    })])
    .await;
    // trailing slash is stripped
    let api = RemoteExpenseApi::with_base_url(&format!("{}/", base));
    assert_eq!(api.base_url(), Some(base.as_str()));

    api.probe().await.expect("probe");
    let listed = parse_list_payload(api.list().await.expect("list")).expect("payload");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].extra["created_at"], "2025-01-01T00:00:01");

    let created = api.create(&draft("lunch")).await.expect("create");
    assert_eq!(created["expense_id"], "srv-1");
    assert_eq!(created["amount"], 12.5);

    // ids with spaces travel percent-encoded and arrive decoded
    api.update("a b", &draft("edited")).await.expect("update");
    api.delete("srv-1").await.expect("delete");

    let remaining = parse_list_payload(api.list().await.expect("list")).expect("payload");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].expense_id, "a b");
    assert_eq!(remaining[0].notes, "edited");

    let seen = state.lock().expect("fake api lock").seen.clone();
    let methods: Vec<&str> = seen.iter().map(|(m, _, _)| m.as_str()).collect();
    assert_eq!(methods, vec!["GET", "GET", "POST", "PUT", "DELETE", "GET"]);
    assert!(seen.iter().all(|(_, _, ct)| ct == "application/json"));
    assert_eq!(seen[3].1, "/expenses/a b");
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let (base, _state) = spawn_fake_api(vec![]).await;
    let api = RemoteExpenseApi::with_base_url(&base);

    let err = api.update("missing", &draft("x")).await.unwrap_err();
    assert_eq!(
        err,
        SourceError::Status {
            status: 404,
            reason: "Not Found".to_string(),
            body: String::new(),
        }
    );

    let err = api.delete("missing").await.unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 404, .. }));
}

#[tokio::test]
async fn server_errors_and_odd_payloads() {
    let router = Router::new()
        .route(
            "/expenses",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "{\"error\":\"down\"}") })
                .post(|| async { StatusCode::NO_CONTENT }),
        )
        .route("/expenses/:id", put(|| async { "not json" }));
    let base = spawn(router).await;
    let api = RemoteExpenseApi::with_base_url(&base);

    let probe = api.probe().await.unwrap_err();
    assert!(probe.to_string().starts_with("API error 500 Internal Server Error"));
    assert!(probe.to_string().contains("down"));

    // 204 decodes as null
    assert_eq!(api.create(&draft("x")).await, Ok(Value::Null));

    let decode = api.update("x", &draft("x")).await.unwrap_err();
    assert!(matches!(decode, SourceError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = RemoteExpenseApi::with_base_url(&format!("http://{}", addr));
    let err = api.probe().await.unwrap_err();
    assert!(matches!(err, SourceError::Network { .. }));
}
