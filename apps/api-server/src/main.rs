//! api-server — HTTP API for the user directory workspace.
//!
//! Exposes the users resource and wires the process together:
//! - Storage: In-memory (default) or SQLite (file) when the `sqlite` feature is enabled.
//! - Cache: external backend connected at startup; the handle is kept for the
//!   process lifetime and no endpoint consults it.
//! - CORS: Configurable via CORS_ALLOW_ORIGIN (origin string).
//!
//! Run:
//! ```bash
//! # pretty logs (default); PORT optional
//! cargo run -p api-server
//!
//! # file-backed storage instead of the in-memory default
//! STORAGE_PROVIDER=sqlite DB_PATH=./data/users.db cargo run -p api-server
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.
//!

mod cache;
mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use domain::adapters::memory_repo::InMemoryUserRepo;
use domain::service::UserService;
use domain::{CoreError, NewUser, User, UserRepository};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Local repo abstraction supporting memory or sqlite (feature-gated).
enum RepoKind {
    Memory(InMemoryUserRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite_adapter::SqliteUserRepo),
}

/// Repository selected at startup; dispatches port calls to the active kind
/// so the service stays generic over one concrete type.
struct AnyRepo {
    kind: RepoKind,
}

impl AnyRepo {
    fn memory() -> Self {
        Self {
            kind: RepoKind::Memory(InMemoryUserRepo::new()),
        }
    }

    #[cfg(feature = "sqlite")]
    fn sqlite(path: &std::path::Path) -> Result<Self, CoreError> {
        Ok(Self {
            kind: RepoKind::Sqlite(sqlite_adapter::SqliteUserRepo::new(path)?),
        })
    }
}

impl UserRepository for AnyRepo {
    fn create(&self, input: NewUser) -> Result<User, CoreError> {
        match &self.kind {
            RepoKind::Memory(r) => r.create(input),
            #[cfg(feature = "sqlite")]
            RepoKind::Sqlite(r) => r.create(input),
        }
    }

    fn list(&self) -> Result<Vec<User>, CoreError> {
        match &self.kind {
            RepoKind::Memory(r) => r.list(),
            #[cfg(feature = "sqlite")]
            RepoKind::Sqlite(r) => r.list(),
        }
    }
}

#[derive(Clone)]
struct AppState {
    service: Arc<UserService<AnyRepo>>,
    /// Connected at startup and held for the process lifetime. No request
    /// handler reads or writes cache keys. `None` only in router unit tests,
    /// which exercise the HTTP surface without external collaborators.
    #[allow(dead_code)]
    cache: Option<cache::CacheHandle>,
}

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);

    // The cache backend is a startup dependency: if it is unreachable the
    // process exits instead of serving without it.
    let cache = match cache::connect(&cfg.redis_url).await {
        Ok(handle) => {
            info!(url = %cfg.redis_url, "cache backend connected");
            handle
        }
        Err(e) => {
            error!(err = %e, "cache backend connection failed");
            std::process::exit(1);
        }
    };

    let repo = build_repo(&cfg);
    let state = AppState {
        service: Arc::new(UserService::new(repo, cfg.simulated_latency)),
        cache: Some(cache),
    };

    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    let mut app = Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/users",
            post(create_user).get(list_users).options(preflight_users),
        )
        .fallback(not_found)
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .with_state(state);

    // CORS - already validated in Config::from_env()
    let cors = if cfg.cors_allow_origin == HeaderValue::from_static("*") {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([cfg.cors_allow_origin]))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    };
    app = app.layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(%addr, "api-server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind port");
    axum::serve(listener, app).await.expect("server error");
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

// Construct a repository instance based on config and feature flags.
fn build_repo(cfg: &config::Config) -> AnyRepo {
    match cfg.storage_provider {
        #[cfg(feature = "sqlite")]
        config::StorageProvider::Sqlite => match AnyRepo::sqlite(&cfg.db_path) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("failed to init sqlite repository: {e}");
                AnyRepo::memory()
            }
        },
        _ => AnyRepo::memory(),
    }
}

#[derive(Deserialize)]
struct CreateUserReq {
    name: String,
    email: String,
}

#[derive(Serialize)]
struct UserOut {
    id: u64,
    name: String,
    email: String,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Serialize)]
struct HealthOut {
    status: &'static str,
    version: &'static str,
}

async fn healthz() -> Json<HealthOut> {
    Json(HealthOut {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserReq>,
) -> impl IntoResponse {
    let input = NewUser {
        name: body.name,
        email: body.email,
    };
    match state.service.create_user(input).await {
        Ok(user) => {
            info!(user_id = user.id, "create ok");
            (StatusCode::CREATED, Json(UserOut::from(user))).into_response()
        }
        Err(e) => {
            error!(err=?e, "create error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(http_common::json_error_with_message(
                    "internal",
                    "server error",
                )),
            )
                .into_response()
        }
    }
}

async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.list_users().await {
        Ok(users) => {
            let out: Vec<UserOut> = users.into_iter().map(UserOut::from).collect();
            (StatusCode::OK, Json(out)).into_response()
        }
        Err(e) => {
            error!(err=?e, "list error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(http_common::json_error_with_message(
                    "internal",
                    "server error",
                )),
            )
                .into_response()
        }
    }
}

async fn preflight_users() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(http_common::json_err("not_found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn app() -> Router {
        let state = AppState {
            service: Arc::new(UserService::new(AnyRepo::memory(), Duration::ZERO)),
            cache: None,
        };
        Router::new()
            .route("/healthz", get(healthz))
            .route(
                "/users",
                post(create_user).get(list_users).options(preflight_users),
            )
            .fallback(not_found)
            .with_state(state)
    }

    async fn read_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_users(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_list_flow() {
        let router = app();

        // Create two users; ids come back sequential from 1
        let resp = router
            .clone()
            .oneshot(post_users(
                r#"{"name":"Alice","email":"alice@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = read_json(resp).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["name"], "Alice");
        assert_eq!(body["email"], "alice@example.com");

        let resp = router
            .clone()
            .oneshot(post_users(r#"{"name":"Bob","email":"bob@example.com"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = read_json(resp).await;
        assert_eq!(body["id"], 2);

        // List returns both in creation order
        let resp = router
            .clone()
            .oneshot(Request::builder().uri("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!([
                {"id": 1, "name": "Alice", "email": "alice@example.com"},
                {"id": 2, "name": "Bob", "email": "bob@example.com"},
            ])
        );
    }

    #[tokio::test]
    async fn list_is_empty_before_any_create() {
        let router = app();
        let resp = router
            .oneshot(Request::builder().uri("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_json(resp).await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn rejected_create_does_not_consume_an_id() {
        let router = app();

        // Missing required field: rejected before reaching the service
        let resp = router
            .clone()
            .oneshot(post_users(r#"{"name":"Alice"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        // Not JSON at all
        let resp = router
            .clone()
            .oneshot(post_users("not json"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // The next valid create still gets id 1
        let resp = router
            .clone()
            .oneshot(post_users(
                r#"{"name":"Alice","email":"alice@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = read_json(resp).await;
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn unknown_route_returns_json_not_found() {
        let router = app();
        let resp = router
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = read_json(resp).await;
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn preflight_returns_no_content() {
        let router = app();
        let resp = router
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let router = app();
        let resp = router
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
