use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use forum_api::{app, AppState, Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

fn settings(vars: &[(&str, &str)]) -> Settings {
    let vars: Vec<(String, String)> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Settings::from_lookup(|key| vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
        .unwrap_or_else(|err| panic!("invalid test settings: {err}"))
}

fn router() -> Router {
    app(AppState::memory(&settings(&[])))
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_else(|err| panic!("failed to build request: {err}"));
    router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|err| panic!("router request failed: {err}"))
}

async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap_or_else(|err| panic!("failed to read response body: {err}"));
    serde_json::from_slice(&bytes).unwrap_or_else(|err| panic!("response body is not JSON: {err}"))
}

async fn create_topic(router: &Router, name: &str, description: Option<&str>) -> Value {
    let response = send(router, "POST", "/api/topics", Some(json!({"name": name, "description": description}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

#[tokio::test]
async fn create_then_read_topic_by_id_and_name() {
    let router = router();
    let response = send(&router, "POST", "/api/topics", Some(json!({"name": "Weather", "description": "eh?"}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    let created = response_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(location, format!("/api/topics/{id}"));

    let by_id = send(&router, "GET", &location, None).await;
    assert_eq!(by_id.status(), StatusCode::OK);
    let body = response_json(by_id).await;
    assert_eq!(body, json!({"id": id, "name": "Weather", "description": "eh?"}));

    let by_name = send(&router, "GET", "/api/topics/Weather", None).await;
    assert_eq!(by_name.status(), StatusCode::OK);
    assert_eq!(response_json(by_name).await["id"], id);
}

#[tokio::test]
async fn duplicate_topic_name_is_bad_request() {
    let router = router();
    create_topic(&router, "Dup", None).await;
    let response = send(&router, "POST", "/api/topics", Some(json!({"name": "Dup"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error"]["code"], "duplicate_name");
}

#[tokio::test]
async fn missing_or_null_name_is_bad_request() {
    let router = router();
    for body in [json!({"description": "eh?"}), json!({"name": null}), json!({"name": ""})] {
        let response = send(&router, "POST", "/api/topics", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_json(response).await["error"]["code"], "missing_required_field");
    }
    let list = send(&router, "GET", "/api/topics", None).await;
    assert_eq!(response_json(list).await, json!([]));
}

#[tokio::test]
async fn list_is_capped_at_thirty_and_sorted() {
    let router = router();
    for i in (0..50).rev() {
        create_topic(&router, &format!("Topic {i:02}"), None).await;
    }
    let response = send(&router, "GET", "/api/topics?limit=100", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let names: Vec<&str> = body.as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names.len(), 30);
    assert_eq!(names.first(), Some(&"Topic 00"));
    assert_eq!(names.last(), Some(&"Topic 29"));

    let page2 = response_json(send(&router, "GET", "/api/topics?limit=30&page=2", None).await).await;
    assert_eq!(page2.as_array().unwrap().len(), 20);

    let negative = response_json(send(&router, "GET", "/api/topics?limit=-5", None).await).await;
    assert_eq!(negative, json!([]));

    let garbage = response_json(send(&router, "GET", "/api/topics?limit=abc&page=zero", None).await).await;
    assert_eq!(garbage.as_array().unwrap().len(), 30);
}

#[tokio::test]
async fn empty_list_can_answer_no_content() {
    let router = app(AppState::memory(&settings(&[("EMPTY_LIST_NO_CONTENT", "true")])));
    let response = send(&router, "GET", "/api/posts", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn update_topic_statuses() {
    let router = router();
    let first = create_topic(&router, "First", None).await;
    let second = create_topic(&router, "Second", Some("keep")).await;
    let second_uri = format!("/api/topics/{}", second["id"]);

    let ok = send(&router, "PUT", &second_uri, Some(json!({"name": "Renamed", "description": "new"}))).await;
    assert_eq!(ok.status(), StatusCode::NO_CONTENT);
    let row = response_json(send(&router, "GET", &second_uri, None).await).await;
    assert_eq!(row["name"], "Renamed");

    let dup = send(&router, "PUT", &second_uri, Some(json!({"name": "First"}))).await;
    assert_eq!(dup.status(), StatusCode::BAD_REQUEST);
    let row = response_json(send(&router, "GET", &second_uri, None).await).await;
    assert_eq!(row["name"], "Renamed");
    assert_eq!(first["name"], "First");

    let missing = send(&router, "PUT", "/api/topics/9999", Some(json!({"name": "Ghost"}))).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let blank = send(&router, "PUT", &second_uri, Some(json!({"name": null}))).await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let bad_id = send(&router, "PUT", "/api/topics/Weather", Some(json!({"name": "x"}))).await;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn id_reassignment_follows_policy() {
    let router = app(AppState::memory(&settings(&[("ALLOW_ID_REASSIGNMENT", "true")])));
    let a = create_topic(&router, "A", None).await;
    let b = create_topic(&router, "B", None).await;

    let clash = send(
        &router,
        "PUT",
        &format!("/api/topics/{}", a["id"]),
        Some(json!({"id": b["id"], "name": "A"})),
    )
    .await;
    assert_eq!(clash.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(clash).await["error"]["code"], "duplicate_id");

    let moved = send(&router, "PUT", &format!("/api/topics/{}", a["id"]), Some(json!({"id": 77, "name": "A"}))).await;
    assert_eq!(moved.status(), StatusCode::NO_CONTENT);
    assert_eq!(send(&router, "GET", "/api/topics/77", None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_after_moving_onto_next_id_still_succeeds() {
    let router = app(AppState::memory(&settings(&[("ALLOW_ID_REASSIGNMENT", "true")])));
    let a = create_topic(&router, "A", None).await;
    let next = a["id"].as_i64().unwrap() + 1;
    let moved = send(&router, "PUT", &format!("/api/topics/{}", a["id"]), Some(json!({"id": next, "name": "A"}))).await;
    assert_eq!(moved.status(), StatusCode::NO_CONTENT);

    let fresh = create_topic(&router, "Fresh", None).await;
    assert!(fresh["id"].as_i64().unwrap() > next);
}

#[tokio::test]
async fn delete_is_no_content_then_not_found() {
    let router = router();
    let topic = create_topic(&router, "Gone", None).await;
    let uri = format!("/api/topics/{}", topic["id"]);
    assert_eq!(send(&router, "DELETE", &uri, None).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(send(&router, "DELETE", &uri, None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&router, "DELETE", "/api/topics/9999", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&router, "GET", &uri, None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn posts_allow_repeated_titles() {
    let router = router();
    for content in ["first", "second"] {
        let response = send(&router, "POST", "/api/posts", Some(json!({"title": "Riffs", "content": content}))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let by_title = response_json(send(&router, "GET", "/api/posts/Riffs", None).await).await;
    assert_eq!(by_title["content"], "first");
    let all = response_json(send(&router, "GET", "/api/posts", None).await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let missing = send(&router, "POST", "/api/posts", Some(json!({"content": "no title"}))).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_object_body_is_bad_request() {
    let router = router();
    let response = send(&router, "POST", "/api/topics", Some(json!(["Weather"]))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error"]["code"], "bad_request");
}

#[tokio::test]
async fn common_and_docs_routes() {
    let router = router();
    let health = send(&router, "GET", "/health", None).await;
    assert_eq!(health.status(), StatusCode::OK);
    let ready = response_json(send(&router, "GET", "/ready", None).await).await;
    assert_eq!(ready["database"], "memory");
    let version = response_json(send(&router, "GET", "/version", None).await).await;
    assert_eq!(version["name"], "forum-api");
    let doc = response_json(send(&router, "GET", "/api-docs/openapi.json", None).await).await;
    assert!(doc["components"]["schemas"]["Topic"].is_object());
    assert!(doc["components"]["schemas"]["Post"].is_object());
}
