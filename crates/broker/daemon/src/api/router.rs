//! API Router configuration

use super::handlers;
use super::state::AppState;
use super::version::require_api_version;
use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Protocol routes; all of them require the broker API version header
    let broker_routes = Router::new()
        .route("/catalog", get(handlers::get_catalog))
        .route(
            "/service_instances/:instance_id",
            put(handlers::provision_instance)
                .patch(handlers::update_instance)
                .delete(handlers::deprovision_instance),
        )
        .route(
            "/service_instances/:instance_id/service_bindings/:binding_id",
            put(handlers::create_binding).delete(handlers::delete_binding),
        )
        .layer(middleware::from_fn(require_api_version));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v2", broker_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
