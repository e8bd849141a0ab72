use std::sync::Arc;

use axum::{
    routing::{any, get, post, put},
    Router,
};

use config::ApiMode;
use db::Db;
use handlers::{dispatch, health, path_not_found::handler_404, vouchers};

use tower::ServiceBuilder;

use crate::appstate::AppState;

pub mod appstate;
pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod model;

/// Path-style API: the voucher id is a path segment and the method names the
/// operation. A bare `DELETE /api/vouchers` wipes the store. A known path hit
/// with an unsupported method is a 404 like any unknown path.
pub fn router(db: Arc<Db>) -> Router {
    let app_state = Arc::new(AppState::new(db));

    Router::new()
        .route(
            "/api/vouchers",
            get(vouchers::list)
                .post(vouchers::create)
                .delete(vouchers::delete_all)
                .fallback(handler_404),
        )
        .route(
            "/api/vouchers/import",
            post(vouchers::import).fallback(handler_404),
        )
        .route(
            "/api/vouchers/:id",
            put(vouchers::update)
                .delete(vouchers::delete)
                .fallback(handler_404),
        )
        .route("/api/health", get(health::health).fallback(handler_404))
        .fallback(handler_404)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(
                    crate::middleware::request_tracing::request_tracing,
                ))
                .layer(crate::middleware::cors::cors_layer()),
        )
        .with_state(app_state)
}

/// Query-style API: one route per resource, with `id` and `action` query
/// parameters selecting the operation.
pub fn stateless_router(db: Arc<Db>) -> Router {
    let app_state = Arc::new(AppState::new(db));

    Router::new()
        .route("/api/vouchers", any(dispatch::dispatch))
        .route("/api/health", get(health::health).fallback(handler_404))
        .fallback(handler_404)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(
                    crate::middleware::request_tracing::request_tracing,
                ))
                .layer(crate::middleware::cors::cors_layer()),
        )
        .with_state(app_state)
}

pub fn app(db: Arc<Db>, mode: ApiMode) -> Router {
    match mode {
        ApiMode::Server => router(db),
        ApiMode::Handler => stateless_router(db),
    }
}
