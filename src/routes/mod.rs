//! Router assembly.

mod common;
mod docs;
mod entity;

pub use common::common_routes;
pub use docs::{docs_routes, ApiDoc};
pub use entity::{entity_routes, forum_routes};

use crate::state::AppState;
use axum::Router;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Request bodies above this size are rejected with 413.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Full application: common, docs and forum routes with CORS, tracing and body limit layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(docs_routes())
        .merge(forum_routes(&state))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
