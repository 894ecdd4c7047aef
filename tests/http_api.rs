//! HTTP surface tests driving the router in-process.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use conduit::config::AppConfig;
use conduit::server::{build_router, AppServices};
use conduit::InMemoryRepositoryProvider;
use serde_json::{json, Value};
use tower::Service;

fn app() -> Router {
    let services = AppServices::new(Arc::new(InMemoryRepositoryProvider::new()));
    build_router(&services, &AppConfig::default(), None, None)
}

async fn send(
    app: &mut Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.call(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn register(app: &mut Router, name: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({"user": {"username": name, "email": format!("{}@x.com", name), "password": "pw123456"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["user"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_then_fetch_current_user() {
    let mut app = app();
    let token = register(&mut app, "alice").await;

    let (status, body) = send(&mut app, Method::GET, "/api/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@x.com");
    assert_eq!(body["user"]["token"], token.as_str());
    assert!(body["user"]["bio"].is_null());
}

#[tokio::test]
async fn current_user_requires_a_valid_token() {
    let mut app = app();

    let (status, body) = send(&mut app, Method::GET, "/api/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
    assert!(body["errors"]["body"].is_array());

    let (status, _) = send(&mut app, Method::GET, "/api/user", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_masks_the_failure_reason() {
    let mut app = app();
    register(&mut app, "alice").await;

    let (status, body) = send(
        &mut app,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({"user": {"email": "alice@x.com", "password": "wrong-one"}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let wrong_password = body["errors"]["body"].clone();

    let (status, body) = send(
        &mut app,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({"user": {"email": "nobody@x.com", "password": "pw123456"}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"]["body"], wrong_password);

    let (status, body) = send(
        &mut app,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({"user": {"email": "alice@x.com", "password": "pw123456"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user"]["token"].is_string());
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let mut app = app();

    let (status, body) = send(
        &mut app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({"user": {"username": "alice", "email": "not-an-email", "password": "pw123456"}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation");

    let response = app
        .call(
            Request::builder()
                .method(Method::POST)
                .uri("/api/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let mut app = app();
    register(&mut app, "alice").await;

    let (status, _) = send(
        &mut app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({"user": {"username": "alice2", "email": "alice@x.com", "password": "pw123456"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn article_lifecycle() {
    let mut app = app();
    let author = register(&mut app, "author").await;
    let reader = register(&mut app, "reader").await;

    let (status, body) = send(
        &mut app,
        Method::POST,
        "/api/articles",
        Some(&author),
        Some(json!({"article": {
            "title": "How to train your dragon",
            "description": "Ever wonder how?",
            "body": "You have to believe",
            "tagList": ["dragons", "training"]
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let article = &body["article"];
    assert_eq!(article["slug"], "how-to-train-your-dragon");
    assert_eq!(article["favoritesCount"], 0);
    assert_eq!(article["favorited"], false);
    assert_eq!(article["author"]["username"], "author");
    let tags: Vec<&str> = article["tagList"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(tags.contains(&"dragons"));
    assert!(tags.contains(&"training"));

    let slug = "/api/articles/how-to-train-your-dragon";
    let (status, body) = send(
        &mut app,
        Method::POST,
        &format!("{}/favorite", slug),
        Some(&reader),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["favorited"], true);
    assert_eq!(body["article"]["favoritesCount"], 1);

    let (status, body) = send(
        &mut app,
        Method::GET,
        "/api/articles?favorited=reader",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articlesCount"], 1);
    assert_eq!(body["articles"][0]["favorited"], false);

    let (status, body) = send(&mut app, Method::GET, "/api/tags", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"].as_array().unwrap().len(), 2);

    let (status, _) = send(&mut app, Method::DELETE, slug, Some(&reader), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&mut app, Method::DELETE, slug, Some(&author), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&mut app, Method::GET, slug, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creating_an_article_requires_auth() {
    let mut app = app();
    let (status, _) = send(
        &mut app,
        Method::POST,
        "/api/articles",
        None,
        Some(json!({"article": {"title": "t", "description": "d", "body": "b"}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_author_filter_is_not_found() {
    let mut app = app();
    let (status, _) = send(
        &mut app,
        Method::GET,
        "/api/articles?author=ghost",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn follow_shapes_the_feed_and_profile() {
    let mut app = app();
    let writer = register(&mut app, "writer").await;
    let reader = register(&mut app, "reader").await;

    send(
        &mut app,
        Method::POST,
        "/api/articles",
        Some(&writer),
        Some(json!({"article": {"title": "Dispatch", "description": "d", "body": "b"}})),
    )
    .await;

    let (_, body) = send(&mut app, Method::GET, "/api/articles/feed", Some(&reader), None).await;
    assert_eq!(body["articlesCount"], 0);

    let (status, body) = send(
        &mut app,
        Method::POST,
        "/api/profiles/writer/follow",
        Some(&reader),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["following"], true);

    let (_, body) = send(&mut app, Method::GET, "/api/articles/feed", Some(&reader), None).await;
    assert_eq!(body["articlesCount"], 1);
    assert_eq!(body["articles"][0]["author"]["following"], true);

    let (_, body) = send(&mut app, Method::GET, "/api/profiles/writer", None, None).await;
    assert_eq!(body["profile"]["following"], false);

    let (status, body) = send(
        &mut app,
        Method::DELETE,
        "/api/profiles/writer/follow",
        Some(&reader),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["following"], false);
}

#[tokio::test]
async fn comment_flow() {
    let mut app = app();
    let author = register(&mut app, "author").await;
    let guest = register(&mut app, "guest").await;

    send(
        &mut app,
        Method::POST,
        "/api/articles",
        Some(&author),
        Some(json!({"article": {"title": "Talk", "description": "d", "body": "b"}})),
    )
    .await;

    let (status, body) = send(
        &mut app,
        Method::POST,
        "/api/articles/talk/comments",
        Some(&guest),
        Some(json!({"comment": {"body": "first!"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["comment"]["id"].as_i64().unwrap();
    assert_eq!(body["comment"]["author"]["username"], "guest");

    let (status, body) = send(&mut app, Method::GET, "/api/articles/talk/comments", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);

    let uri = format!("/api/articles/talk/comments/{}", id);
    let (status, _) = send(&mut app, Method::DELETE, &uri, Some(&author), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&mut app, Method::DELETE, &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&mut app, Method::GET, "/api/articles/talk/comments", None, None).await;
    assert!(body["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_memory_storage() {
    let mut app = app();
    let (status, body) = send(&mut app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
