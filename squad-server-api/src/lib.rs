use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode, Uri, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde_json::json;
use squad_server_domain::{ServiceError, player::ArcPlayerService};
use tower_http::cors::CorsLayer;

mod players;

#[derive(Clone)]
pub struct AppState {
    pub players: ArcPlayerService,
}

pub async fn run(
    players: ArcPlayerService,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) {
    let router = Router::new()
        .route("/api/players", get(players::get_all).post(players::create))
        .route("/api/players/search", get(players::search))
        .route("/api/players/stats", get(players::stats))
        .route("/api/players/seed", post(players::seed))
        .route(
            "/api/players/{id}",
            get(players::get_by_id)
                .put(players::update)
                .delete(players::delete),
        )
        .route("/api/health", get(health))
        .fallback(not_found)
        .layer(cors_layer())
        .with_state(AppState { players });

    let port = std::env::var("CATALOG_HTTP_PORT")
        .expect("CATALOG_HTTP_PORT must be set")
        .parse::<u16>()
        .expect("CATALOG_HTTP_PORT must be a valid u16");

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .unwrap();

    info!("API server listening on port {}", port);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .unwrap();

    info!("HTTP API shut down gracefully");
}

fn cors_layer() -> CorsLayer {
    let origin = std::env::var("CORS_ALLOWED_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    CorsLayer::new()
        .allow_origin(
            origin
                .parse::<HeaderValue>()
                .expect("CORS_ALLOWED_ORIGIN must be a valid origin"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
}

fn environment() -> String {
    std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
}

fn is_development() -> bool {
    environment() == "development"
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Player catalog API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": environment(),
    }))
}

async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found", "path": uri.path() })),
    )
        .into_response()
}

pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            ServiceError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": msg }),
            ),
            ServiceError::BadRequest(msg) | ServiceError::NotPossible(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": msg }),
            ),
            ServiceError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": "Invalid player data", "errors": errors }),
            ),
            ServiceError::Internal(msg) => {
                error!("Internal error: {}", msg);
                let mut body = json!({ "success": false, "message": "Internal server error" });
                // Detail only leaves the process in development mode.
                if is_development() {
                    body["error"] = json!(msg);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(body)).into_response()
    }
}
