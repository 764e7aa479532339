use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public, system};
use crate::middleware::session_auth_middleware;
use crate::state::AppState;

/// Full HTTP application
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/validate", post(public::validate))
        // Public auth routes
        .merge(auth_public_routes())
        // Protected API
        .merge(auth_routes(state.clone()))
        .merge(account_routes(state.clone()));

    if let Some(cors) = cors_layer(&state.config.security) {
        router = router.layer(cors);
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
}

fn auth_routes(state: AppState) -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::session_whoami))
        .route("/api/auth/permissions/:permission", get(auth::session_permission))
        .route("/api/auth/session", delete(auth::session_logout))
        .route_layer(from_fn_with_state(state, session_auth_middleware))
}

fn account_routes(state: AppState) -> Router<AppState> {
    use protected::accounts;

    Router::new()
        .route(
            "/api/accounts",
            get(accounts::account_list).post(accounts::account_create),
        )
        .route(
            "/api/accounts/:id",
            put(accounts::account_update).delete(accounts::account_delete),
        )
        .route(
            "/api/accounts/:id/toggle-admin",
            post(accounts::account_toggle_admin),
        )
        .route_layer(from_fn_with_state(state, session_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let origin = if security.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = security
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}
