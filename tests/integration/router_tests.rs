//! Router tests that never reach the database: the pool connects lazily and
//! every request here is answered before a query would run.

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use libcat_server::{api, AppConfig, AppState};

fn app() -> Router {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    api::router(AppState::new(config, pool))
}

async fn send(method: Method, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_toggle_favorite_requires_login() {
    let (status, body) = send(Method::POST, "/api/v1/favorites/1", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Please login to save favorites");
    assert_eq!(body["redirect_url"], "/api/v1/auth/login?next=/api/v1/favorites/1");
}

#[tokio::test]
async fn test_favorites_and_profile_require_login() {
    for uri in ["/api/v1/favorites", "/api/v1/auth/profile"] {
        let (status, body) = send(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["redirect_url"], format!("/api/v1/auth/login?next={}", uri));
    }
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let (status, body) = send(Method::GET, "/api/v1/auth/profile", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect_url"], "/api/v1/auth/login?next=/api/v1/auth/profile");
}

#[tokio::test]
async fn test_search_form_errors_are_reported_per_field() {
    let (status, body) = send(
        Method::GET,
        "/api/v1/resources?year_range=1990-1995&sort_by=popularity&resource_type=abc",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["year_range", "sort_by", "resource_type"] {
        assert!(body["fields"][field].is_array(), "missing error for {}", field);
    }
}

#[tokio::test]
async fn test_short_autocomplete_term_returns_nothing() {
    let (status, body) = send(Method::GET, "/api/v1/keywords/autocomplete?term=a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = send(Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/resources"].is_object());
}
