#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use sitetrack_api::auth::jwt::{generate_access_token, JwtConfig};
use sitetrack_api::auth::password::hash_password;
use sitetrack_api::config::ServerConfig;
use sitetrack_api::routes;
use sitetrack_api::state::AppState;
use sitetrack_core::task_state::{plan_transition, TaskStatus};
use sitetrack_core::types::{Date, DbId};
use sitetrack_db::models::category::CreateCategory;
use sitetrack_db::models::project::{CreateProject, Project};
use sitetrack_db::models::task::{CreateTask, Task};
use sitetrack_db::models::user::User;
use sitetrack_db::repositories::{CategoryRepo, ProjectRepo, TaskRepo, UserRepo};

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let state = AppState {
        pool,
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a request against the app with an optional bearer token and JSON
/// body.
pub async fn request(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response {
    request(app, Method::GET, uri, token, None).await
}

pub async fn post(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    request(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    request(app, Method::PUT, uri, token, Some(body)).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Insert a user with the given role; password is always `password123`.
pub async fn seed_user(pool: &PgPool, username: &str, role: &str) -> User {
    let hash = hash_password("password123").expect("hashing should succeed");
    UserRepo::create(pool, username, &hash, username, role)
        .await
        .expect("user insert should succeed")
}

/// Generate a valid bearer token for a seeded user.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &test_config().jwt)
        .expect("token generation should succeed")
}

/// Insert a project with optional schedule dates.
pub async fn seed_project(
    pool: &PgPool,
    name: &str,
    start_date: Option<Date>,
    expected_end_date: Option<Date>,
) -> Project {
    ProjectRepo::create(
        pool,
        &CreateProject {
            name: name.to_string(),
            client: None,
            address: None,
            start_date,
            expected_end_date,
        },
    )
    .await
    .expect("project insert should succeed")
}

/// Insert a category under a project.
pub async fn seed_category(pool: &PgPool, project_id: DbId, name: &str) -> DbId {
    CategoryRepo::create(
        pool,
        project_id,
        &CreateCategory {
            name: name.to_string(),
            description: None,
            deadline: None,
        },
    )
    .await
    .expect("category insert should succeed")
    .id
}

/// Insert a task at the given percentage, with derived state planned the
/// same way the API plans it.
pub async fn seed_task(pool: &PgPool, category_id: DbId, name: &str, percent: i32) -> Task {
    let today = Utc::now().date_naive();
    let transition = plan_transition(TaskStatus::NotStarted, None, percent, 0, today, name)
        .expect("transition should be valid");
    TaskRepo::create(
        pool,
        category_id,
        &CreateTask {
            name: name.to_string(),
            description: None,
            position: None,
            planned_start: None,
            planned_end: None,
            percent: Some(i64::from(percent)),
        },
        &transition,
    )
    .await
    .expect("task insert should succeed")
}
