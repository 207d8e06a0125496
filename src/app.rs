//! Router assembly: public routes, token-protected routes and global layers.

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ApiError;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new().route("/auth/login", post(auth::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(interface_routes())
        .merge(execution_record_routes())
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn auth_routes() -> Router<AppState> {
    use handlers::protected::auth;

    Router::new()
        .route("/auth/current/user", get(auth::session_current_user))
        .route("/auth/refresh/token", post(auth::session_refresh))
        .route("/auth/logout", post(auth::session_logout))
}

fn interface_routes() -> Router<AppState> {
    use handlers::protected::interface;

    Router::new()
        .route("/interface", post(interface::interface_create))
        .route("/interface/list", get(interface::interface_list))
        .route("/interface/most/used", get(interface::interface_most_used))
        .route("/interface/execute", post(interface::interface_execute))
        .route(
            "/interface/:id",
            get(interface::interface_get)
                .put(interface::interface_update)
                .delete(interface::interface_delete),
        )
        .route("/interface/:id/status", put(interface::interface_status))
        .route("/interface/:id/copy", post(interface::interface_copy))
}

fn execution_record_routes() -> Router<AppState> {
    use handlers::protected::execution_record as record;

    Router::new()
        .route("/interface/execution/record/list", post(record::record_list))
        .route("/interface/execution/record/count", get(record::record_count))
        .route("/interface/execution/record/cleanup", delete(record::record_cleanup))
        .route(
            "/interface/execution/record/executor/:executor_id",
            get(record::records_by_executor),
        )
        .route(
            "/interface/execution/record/stats/:interface_id",
            get(record::record_stats),
        )
        .route("/interface/execution/record/:id", get(record::record_get))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    if state.config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = state
        .config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "code": 200,
        "message": "success",
        "data": {
            "name": "Infra Market API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "public_auth": "/auth/login (public - token acquisition)",
                "auth": "/auth/current/user, /auth/refresh/token, /auth/logout (protected)",
                "interface": "/interface[/:id], /interface/list, /interface/execute (protected)",
                "records": "/interface/execution/record/* (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    let database = match state.database.as_ref() {
        None => "memory",
        Some(db) => match db.health_check().await {
            Ok(_) => "ok",
            Err(e) => {
                tracing::warn!("health check failed: {}", e);
                return ApiError::service_unavailable("degraded: database unavailable")
                    .into_response();
            }
        },
    };

    Json(json!({
        "code": 200,
        "message": "success",
        "data": { "status": "ok", "timestamp": now, "database": database }
    }))
    .into_response()
}
