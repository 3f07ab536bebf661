//! Handler tests for the Users domain
//!
//! These exercise only the users router:
//! - Request deserialization and validation
//! - Response bodies and HTTP status codes
//! - Error bodies
//!
//! The full application (prefix, docs, health, middleware) is covered in the
//! users API app.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_users::*;
use http_body_util::BodyExt;
use messaging::{EventPublisher, InMemoryBroker};
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};
use tower::ServiceExt; // For oneshot()

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app() -> Router {
    handlers::router(UserService::new(InMemoryUserRepository::new()))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn admin() -> Value {
    json!({
        "username": "admin",
        "hashed_password": "admin",
        "email": "gaga@gaga.com",
        "name": "gaga",
        "surname": "gagoso"
    })
}

async fn create(app: &Router, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/users/", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_user_returns_201() {
    let app = app();

    let user = create(&app, admin()).await;

    assert_eq!(user["username"], "admin");
    assert_eq!(user["email"], "gaga@gaga.com");
    assert!(user["id"].as_i64().is_some());
    assert_no_password(&user, "create response");
}

#[tokio::test]
async fn test_create_user_against_sql_store() {
    let db = TestDatabase::sqlite().await;
    let app = handlers::router(UserService::new(SqlUserRepository::new(db.connection())));

    let user = create(&app, admin()).await;
    assert_eq!(user["username"], "admin");
    assert_eq!(db.count_users().await, 1);
}

#[tokio::test]
async fn test_collection_answers_without_trailing_slash() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/users", admin()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(empty_request("GET", "/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let users: Vec<Value> = json_body(response.into_body()).await;
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_create_user_validates_input() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/",
            json!({
                "username": "ab",
                "hashed_password": "x",
                "email": "no-at-sign",
                "name": "",
                "surname": ""
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["username"].is_array());
    assert!(body["details"]["email"].is_array());

    let response = app
        .oneshot(json_request("POST", "/users/", json!({"username": "admin"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_duplicate_email_returns_409() {
    let app = app();
    create(&app, admin()).await;

    let mut duplicate = admin();
    duplicate["username"] = json!("someone-else");

    let response = app
        .oneshot(json_request("POST", "/users/", duplicate))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_list_users_paging() {
    let app = app();
    let builder = TestDataBuilder::from_test_name("handler_list_paging");

    for i in 0..5 {
        let suffix = i.to_string();
        create(
            &app,
            json!({
                "username": builder.username(&suffix),
                "email": builder.email(&suffix),
                "name": "n",
                "surname": "s",
                "hashed_password": "p"
            }),
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/users/?limit=2&offset=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: Vec<Value> = json_body(response.into_body()).await;
    assert_eq!(page.len(), 2);
    assert!(page[0]["id"].as_i64() < page[1]["id"].as_i64());

    let response = app.oneshot(empty_request("GET", "/users/")).await.unwrap();
    let all: Vec<Value> = json_body(response.into_body()).await;
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn test_list_users_accepts_huge_limit_on_sql_store() {
    let db = TestDatabase::sqlite().await;
    let app = handlers::router(UserService::new(SqlUserRepository::new(db.connection())));
    create(&app, admin()).await;

    let response = app
        .oneshot(empty_request("GET", "/users/?limit=18446744073709551615"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let users: Vec<Value> = json_body(response.into_body()).await;
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_list_users_rejects_bad_query() {
    let response = app()
        .oneshot(empty_request("GET", "/users/?limit=lots"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_QUERY");
}

#[tokio::test]
async fn test_get_user_found_and_missing() {
    let app = app();
    let created = create(&app, admin()).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/users/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = json_body(response.into_body()).await;
    assert_eq!(fetched, created);

    let response = app
        .oneshot(empty_request("GET", "/users/9999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], 1004);
    assert_eq!(body["message"], "User 9999 not found");
}

#[tokio::test]
async fn test_get_user_rejects_non_integer_id() {
    let response = app()
        .oneshot(empty_request("GET", "/users/abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_ID");
}

#[tokio::test]
async fn test_patch_updates_only_present_fields() {
    let app = app();
    let created = create(&app, admin()).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/users/{}", id),
            json!({"surname": "rossi"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Value = json_body(response.into_body()).await;
    assert_eq!(updated["surname"], "rossi");
    assert_eq!(updated["name"], "gaga");
    assert_eq!(updated["username"], "admin");

    let response = app
        .oneshot(json_request("PATCH", "/users/424242", json!({"name": "x"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = app();
    let created = create(&app, admin()).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/change-password",
            json!({"user_id": id, "old_password": "admin", "new_password": "n3w"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/change_password",
            json!({"user_id": id, "old_password": "admin", "new_password": "again"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "POST",
            "/users/change-password",
            json!({"user_id": 777, "old_password": "a", "new_password": "b"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_then_get_is_404() {
    let app = app();
    let created = create(&app, admin()).await;
    let uri = format!("/users/{}", created["id"]);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(empty_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mutations_succeed_while_broker_is_down() {
    let broker = Arc::new(InMemoryBroker::unavailable());
    let publisher = EventPublisher::new(broker.clone(), "user.events", "users-test");
    let app = handlers::router(
        UserService::new(InMemoryUserRepository::new()).with_publisher(publisher),
    );

    let created = create(&app, admin()).await;

    let response = app
        .oneshot(empty_request("DELETE", &format!("/users/{}", created["id"])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(broker.published().is_empty());
}

#[tokio::test]
async fn test_openapi_document_lists_user_paths() {
    use utoipa::OpenApi;

    let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/users/"));
    assert!(paths.contains_key("/users/{id}"));
    assert!(paths.contains_key("/users/change-password"));
    assert!(doc["components"]["schemas"].get("UserResponse").is_some());
}
