use super::*;
use crate::error::AuthErrorKind;
use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

async fn handle_login(Json(request): Json<LoginRequest>) -> AxumResponse {
    match (request.email.as_str(), request.password.as_str()) {
        ("a@b.com", "secret1") => Json(json!({
            "token": "T1",
            "user": { "id": 1, "name": "Ada", "email": "a@b.com" }
        }))
        .into_response(),
        ("crash@b.com", _) => (StatusCode::BAD_GATEWAY, "upstream exploded").into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response(),
    }
}

async fn handle_register(Json(request): Json<RegisterRequest>) -> AxumResponse {
    if request.email == "taken@b.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "User already exists" })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "token": "T-new",
            "user": { "id": "u-9", "name": request.name, "email": request.email }
        })),
    )
        .into_response()
}

async fn handle_profile(headers: HeaderMap) -> AxumResponse {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    match bearer {
        "Bearer T1" => Json(json!({ "id": 1, "name": "Ada", "email": "a@b.com" })).into_response(),
        "Bearer expired" => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Token expired" })),
        )
            .into_response(),
        "Bearer legacy" => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid token" })),
        )
            .into_response(),
        "Bearer garbage" => (StatusCode::OK, "definitely not json").into_response(),
        "Bearer boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Database unavailable" })),
        )
            .into_response(),
        _ => (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Access denied" })),
        )
            .into_response(),
    }
}

async fn spawn_auth_server() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/api/login", post(handle_login))
        .route("/api/register", post(handle_register))
        .route("/api/profile", get(handle_profile));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/api")
}

fn client(base_url: &str) -> HttpAuthApi {
    HttpAuthApi::new(base_url, Duration::from_secs(5)).expect("http client")
}

fn credentials(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let api = client(&spawn_auth_server().await);
    let response = api
        .login(credentials("a@b.com", "secret1"))
        .await
        .expect("login");
    assert_eq!(response.token.as_str(), "T1");
    assert_eq!(response.user.id.0, "1");
    assert_eq!(response.user.name, "Ada");
}

#[tokio::test]
async fn login_rejection_carries_server_message_verbatim() {
    let api = client(&spawn_auth_server().await);
    let err = api
        .login(credentials("a@b.com", "wrong-password"))
        .await
        .expect_err("must fail");
    assert_eq!(err.kind, AuthErrorKind::Rejected);
    assert_eq!(err.message, "Invalid credentials");
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_generic_message() {
    let api = client(&spawn_auth_server().await);
    let err = api
        .login(credentials("crash@b.com", "secret1"))
        .await
        .expect_err("must fail");
    assert_eq!(err.kind, AuthErrorKind::Rejected);
    assert_eq!(err.message, "Request failed");
}

#[tokio::test]
async fn register_accepts_created_status_and_string_ids() {
    let api = client(&spawn_auth_server().await);
    let response = api
        .register(RegisterRequest {
            name: "Bob".to_string(),
            email: "bob@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .expect("register");
    assert_eq!(response.token.as_str(), "T-new");
    assert_eq!(response.user.id.0, "u-9");
    assert_eq!(response.user.email, "bob@b.com");

    let err = api
        .register(RegisterRequest {
            name: "Bob".to_string(),
            email: "taken@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .expect_err("duplicate");
    assert_eq!(err.kind, AuthErrorKind::Rejected);
    assert_eq!(err.message, "User already exists");
}

#[tokio::test]
async fn profile_sends_bearer_token() {
    let api = client(&spawn_auth_server().await);
    let profile = api.profile(&Token::new("T1")).await.expect("profile");
    assert_eq!(profile.email, "a@b.com");
}

#[tokio::test]
async fn profile_auth_statuses_map_to_invalid_token() {
    let api = client(&spawn_auth_server().await);

    let err = api
        .profile(&Token::new("expired"))
        .await
        .expect_err("expired");
    assert_eq!(err.kind, AuthErrorKind::InvalidOrExpiredToken);
    assert_eq!(err.message, "Token expired");

    let err = api
        .profile(&Token::new("someone-else"))
        .await
        .expect_err("forbidden");
    assert_eq!(err.kind, AuthErrorKind::InvalidOrExpiredToken);
}

#[tokio::test]
async fn profile_invalid_token_message_is_recognised_on_other_statuses() {
    let api = client(&spawn_auth_server().await);
    let err = api
        .profile(&Token::new("legacy"))
        .await
        .expect_err("legacy");
    assert_eq!(err.kind, AuthErrorKind::InvalidOrExpiredToken);
    assert_eq!(err.message, "Invalid token");
}

#[tokio::test]
async fn profile_server_failure_is_not_a_token_problem() {
    let api = client(&spawn_auth_server().await);
    let err = api.profile(&Token::new("boom")).await.expect_err("boom");
    assert_eq!(err.kind, AuthErrorKind::Rejected);
    assert_eq!(err.message, "Database unavailable");
}

#[tokio::test]
async fn undecodable_success_body_is_malformed() {
    let api = client(&spawn_auth_server().await);
    let err = api
        .profile(&Token::new("garbage"))
        .await
        .expect_err("garbage");
    assert_eq!(err.kind, AuthErrorKind::Malformed);
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = client(&format!("http://{addr}/api"));
    let err = api
        .login(credentials("a@b.com", "secret1"))
        .await
        .expect_err("unreachable");
    assert_eq!(err.kind, AuthErrorKind::Network);
}

#[test]
fn trailing_slash_in_base_url_is_ignored() {
    let api = HttpAuthApi::with_client(Client::new(), "http://localhost:3001/api/");
    assert_eq!(api.base_url(), "http://localhost:3001/api");
    assert_eq!(api.endpoint("/login"), "http://localhost:3001/api/login");
}
