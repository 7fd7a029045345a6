//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::{sync::Arc, time::Duration};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::{IntoResponse, Response},
};
use cardsync_core::{Entity, Error, Oib, Status};
use cardsync_lifecycle::{
  CardLifecycle, CardRequest, CardRequester, ClientLifecycle,
  HttpCardRequester, LocalCardRequester, PartitionedChannel, StatusPublisher,
  StatusSubscriber, channel::STATUS_TOPIC,
};
use cardsync_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt as _;

use super::*;

const OIB: &str = "85251569017";

type TestState = AppState<SqliteStore, LocalCardRequester<SqliteStore>>;

/// Wire up the full stack on an in-memory store, with cards requested
/// in-process and one subscriber worker per partition.
async fn make_state() -> TestState {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let cards = Arc::new(CardLifecycle::new(Arc::clone(&store)));
  let requester = Arc::new(LocalCardRequester::new(Arc::clone(&cards)));
  let clients = Arc::new(ClientLifecycle::new(Arc::clone(&store), requester));

  let (channel, partitions) = PartitionedChannel::new(STATUS_TOPIC, 2);
  Arc::new(StatusSubscriber::new(Arc::clone(&clients), Arc::clone(&cards)))
    .spawn(partitions);

  AppState {
    clients,
    cards,
    publisher: StatusPublisher::new(Arc::new(channel)),
  }
}

/// The router as served by default: any origin may call it.
fn app(state: TestState) -> axum::Router {
  router(state, cors_layer(&["*".to_string()]).unwrap())
}

async fn send(
  state: &TestState,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  app(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn client_json(oib: &str) -> Value {
  json!({
    "oib": oib,
    "firstName": "Ivana",
    "lastName": "Kovac",
    "status": "pending",
  })
}

/// Poll `uri` until `check` accepts its JSON body or two seconds pass.
async fn eventually(
  state: &TestState,
  uri: &str,
  check: impl Fn(&Value) -> bool,
) -> Value {
  let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
  loop {
    let resp = send(state, "GET", uri, None).await;
    if resp.status() == StatusCode::OK {
      let body = json_body(resp).await;
      if check(&body) {
        return body;
      }
    }
    assert!(
      tokio::time::Instant::now() < deadline,
      "condition on {uri} not met in time"
    );
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
}

// ── Clients ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_client_returns_201_and_canonical_body() {
  let state = make_state().await;

  let resp = send(&state, "POST", "/api/v1/clients", Some(client_json(OIB))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert_eq!(
    json_body(resp).await,
    json!({
      "oib": OIB,
      "firstName": "Ivana",
      "lastName": "Kovac",
      "status": "PENDING",
    })
  );

  let resp = send(&state, "GET", "/api/v1/clients", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_client_returns_409() {
  let state = make_state().await;
  send(&state, "POST", "/api/v1/clients", Some(client_json(OIB))).await;

  let resp = send(&state, "POST", "/api/v1/clients", Some(client_json(OIB))).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body = json_body(resp).await;
  assert!(body["error"].as_str().unwrap().contains(OIB), "{body}");
}

#[tokio::test]
async fn invalid_oib_in_body_returns_400() {
  let state = make_state().await;

  let resp = send(
    &state,
    "POST",
    "/api/v1/clients",
    Some(client_json("85251569018")),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn invalid_name_returns_400() {
  let state = make_state().await;
  let mut body = client_json(OIB);
  body["firstName"] = json!("Al");

  let resp = send(&state, "POST", "/api/v1/clients", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_returns_400() {
  let state = make_state().await;
  let req = Request::builder()
    .method("POST")
    .uri("/api/v1/clients")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{\"oib\":"))
    .unwrap();

  let resp = app(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn invalid_oib_in_path_returns_400() {
  let state = make_state().await;
  let resp = send(&state, "GET", "/api/v1/clients/123", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_unknown_client_returns_404() {
  let state = make_state().await;
  let resp = send(&state, "GET", &format!("/api/v1/clients/{OIB}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn get_client_requests_a_card() {
  let state = make_state().await;
  send(&state, "POST", "/api/v1/clients", Some(client_json(OIB))).await;

  let resp = send(&state, "GET", &format!("/api/v1/clients/{OIB}"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["oib"], OIB);

  let card =
    eventually(&state, &format!("/api/v1/cards/client/{OIB}"), |_| true).await;
  assert_eq!(card["status"], "PENDING");
  assert_eq!(card["cardNumber"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn update_and_delete_client() {
  let state = make_state().await;
  send(&state, "POST", "/api/v1/clients", Some(client_json(OIB))).await;

  let mut changed = client_json(OIB);
  changed["status"] = json!("ACTIVE");
  let resp = send(&state, "PUT", "/api/v1/clients", Some(changed)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["status"], "ACTIVE");

  let uri = format!("/api/v1/clients/{OIB}");
  let resp = send(&state, "DELETE", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["status"], "ACTIVE");

  let resp = send(&state, "DELETE", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = send(&state, "PUT", "/api/v1/clients", Some(client_json(OIB))).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Cards ───────────────────────────────────────────────────────────────────

fn card_json(number: &str, oib: &str) -> Value {
  json!({ "cardNumber": number, "oib": oib, "status": "PENDING" })
}

#[tokio::test]
async fn card_crud_round_trip() {
  let state = make_state().await;

  let resp = send(
    &state,
    "POST",
    "/api/v1/cards",
    Some(card_json("4111111111111111", OIB)),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send(&state, "GET", "/api/v1/cards/4111111111111111", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["oib"], OIB);

  let resp =
    send(&state, "GET", &format!("/api/v1/cards/client/{OIB}"), None).await;
  assert_eq!(json_body(resp).await["cardNumber"], "4111111111111111");

  let mut blocked = card_json("4111111111111111", OIB);
  blocked["status"] = json!("blocked");
  let resp = send(&state, "PUT", "/api/v1/cards", Some(blocked)).await;
  assert_eq!(json_body(resp).await["status"], "BLOCKED");

  let resp =
    send(&state, "DELETE", "/api/v1/cards/4111111111111111", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["status"], "BLOCKED");

  let resp = send(&state, "GET", "/api/v1/cards", None).await;
  assert_eq!(json_body(resp).await, json!([]));

  let resp =
    send(&state, "DELETE", "/api/v1/cards/4111111111111111", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_card_number_returns_409() {
  let state = make_state().await;
  let body = card_json("4111111111111111", OIB);
  send(&state, "POST", "/api/v1/cards", Some(body.clone())).await;

  let resp = send(&state, "POST", "/api/v1/cards", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_card_number_returns_400() {
  let state = make_state().await;

  let resp = send(
    &state,
    "POST",
    "/api/v1/cards",
    Some(card_json("0111111111111111", OIB)),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = send(&state, "GET", "/api/v1/cards/41111", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_card_returns_404() {
  let state = make_state().await;
  let resp = send(
    &state,
    "PUT",
    "/api/v1/cards",
    Some(card_json("4111111111111111", OIB)),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn card_request_issues_once_per_oib() {
  let state = make_state().await;
  let body = json!({ "oib": OIB, "status": "ACTIVE" });

  let resp = send(&state, "POST", "/api/v1/card-request", Some(body.clone())).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let card = json_body(resp).await;
  assert_eq!(card["oib"], OIB);
  assert_eq!(card["status"], "ACTIVE");

  let resp = send(&state, "POST", "/api/v1/card-request", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn card_request_with_invalid_name_returns_400() {
  let state = make_state().await;
  let body = json!({ "oib": OIB, "status": "PENDING", "firstName": "J0hn" });

  let resp = send(&state, "POST", "/api/v1/card-request", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());

  let resp = send(&state, "GET", &format!("/api/v1/cards/client/{OIB}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Status synchronization ──────────────────────────────────────────────────

#[tokio::test]
async fn status_change_is_accepted_and_applied_to_both() {
  let state = make_state().await;
  send(&state, "POST", "/api/v1/clients", Some(client_json(OIB))).await;
  send(
    &state,
    "POST",
    "/api/v1/cards",
    Some(card_json("4111111111111111", OIB)),
  )
  .await;

  let resp = send(
    &state,
    "POST",
    "/api/v1/card-status",
    Some(json!({ "oib": OIB, "status": "approved" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::ACCEPTED);

  eventually(&state, &format!("/api/v1/cards/client/{OIB}"), |c| {
    c["status"] == "APPROVED"
  })
  .await;
  let resp = send(&state, "GET", "/api/v1/clients", None).await;
  assert_eq!(json_body(resp).await[0]["status"], "APPROVED");
}

#[tokio::test]
async fn status_change_with_unknown_status_returns_400() {
  let state = make_state().await;
  let resp = send(
    &state,
    "POST",
    "/api/v1/card-status",
    Some(json!({ "oib": OIB, "status": "LOST" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Error mapping ───────────────────────────────────────────────────────────

#[tokio::test]
async fn internal_errors_hide_detail_behind_an_id() {
  let detail = "disk on fire";
  let err = ApiError::from(Error::Store(Box::new(std::io::Error::other(detail))));

  let resp = err.into_response();
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body = json_body(resp).await;
  assert_eq!(body["error"], "internal server error");
  assert!(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
  assert!(!body.to_string().contains(detail));
}

#[tokio::test]
async fn entity_errors_map_to_their_status() {
  let resp =
    ApiError::from(Error::NotFound(Entity::Client(OIB.into()))).into_response();
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = ApiError::from(Error::AlreadyExists(Entity::CardForOib(OIB.into())))
    .into_response();
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// ── CORS ────────────────────────────────────────────────────────────────────

fn preflight(origin: &str) -> Request<Body> {
  Request::builder()
    .method("OPTIONS")
    .uri("/api/v1/card-status")
    .header(header::ORIGIN, origin)
    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
    .body(Body::empty())
    .unwrap()
}

#[tokio::test]
async fn preflight_is_answered_for_any_origin_by_default() {
  let state = make_state().await;

  let resp = app(state).oneshot(preflight("http://localhost:5173")).await.unwrap();
  assert!(resp.status().is_success(), "{}", resp.status());
  assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
  let methods = resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
    .to_str()
    .unwrap();
  assert!(methods.contains("POST"), "{methods}");
}

#[tokio::test]
async fn listed_origins_are_echoed_and_others_refused() {
  let origins = vec!["http://localhost:5173".to_string()];

  let resp = router(make_state().await, cors_layer(&origins).unwrap())
    .oneshot(preflight("http://localhost:5173"))
    .await
    .unwrap();
  assert_eq!(
    resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
    "http://localhost:5173"
  );

  let resp = router(make_state().await, cors_layer(&origins).unwrap())
    .oneshot(preflight("http://evil.example"))
    .await
    .unwrap();
  assert!(
    resp
      .headers()
      .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
      .is_none()
  );
}

#[tokio::test]
async fn simple_requests_carry_the_allow_origin_header() {
  let state = make_state().await;
  let req = Request::builder()
    .uri("/api/v1/clients")
    .header(header::ORIGIN, "http://localhost:5173")
    .body(Body::empty())
    .unwrap();

  let resp = app(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[test]
fn unparseable_origin_is_rejected() {
  assert!(cors_layer(&["http://bad\norigin".to_string()]).is_err());
}

// ── HTTP card requester ─────────────────────────────────────────────────────

#[tokio::test]
async fn http_card_requester_talks_to_card_request_endpoint() {
  let state = make_state().await;
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app(state)).await.unwrap();
  });

  let requester = HttpCardRequester::new(
    format!("http://{addr}/api/v1/card-request"),
    Duration::from_secs(2),
  )
  .unwrap();
  let request = CardRequest {
    oib:        Oib::parse(OIB).unwrap(),
    status:     Status::Pending,
    first_name: None,
    last_name:  None,
  };

  requester.submit(request.clone()).await.unwrap();
  let err = requester.submit(request).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyExists(_)), "{err:?}");
}

#[tokio::test]
async fn http_card_requester_reports_unreachable_service() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);

  let requester = HttpCardRequester::new(
    format!("http://{addr}/api/v1/card-request"),
    Duration::from_millis(500),
  )
  .unwrap();
  let err = requester
    .submit(CardRequest {
      oib:        Oib::parse(OIB).unwrap(),
      status:     Status::Pending,
      first_name: None,
      last_name:  None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DownstreamUnavailable(_)), "{err:?}");
}

// ── Configuration ───────────────────────────────────────────────────────────

#[test]
fn config_defaults_point_card_requests_at_this_server() {
  let cfg: ServerConfig = serde_json::from_value(json!({ "port": 9000 })).unwrap();
  assert_eq!(cfg.topic, "card-status");
  assert_eq!(cfg.partitions, 4);
  assert_eq!(cfg.card_request_timeout(), Duration::from_secs(2));
  assert_eq!(cfg.cors_allowed_origins, vec!["*".to_string()]);
  assert_eq!(
    cfg.card_request_url(),
    "http://127.0.0.1:9000/api/v1/card-request"
  );

  let cfg: ServerConfig = serde_json::from_value(json!({
    "card_request_url": "http://cards.internal/api/v1/card-request",
  }))
  .unwrap();
  assert_eq!(cfg.card_request_url(), "http://cards.internal/api/v1/card-request");
}
