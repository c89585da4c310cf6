//! Entity CRUD routes, one pair of paths per record table:
//! `/api/{table}` for list/create and `/api/{table}/:segment` for read/update/delete.

use crate::handlers::entity::{create, delete as delete_handler, list, read, update};
use crate::model::Record;
use crate::state::{AppState, EntityState};
use axum::{routing::get, Router};

pub fn entity_routes<R: Record>(state: EntityState<R>) -> Router {
    let base = format!("/api/{}", R::TABLE);
    Router::new()
        .route(&base, get(list::<R>).post(create::<R>))
        .route(
            &format!("{}/:segment", base),
            get(read::<R>).put(update::<R>).delete(delete_handler::<R>),
        )
        .with_state(state)
}

/// Topic and post routes.
pub fn forum_routes(state: &AppState) -> Router {
    Router::new()
        .merge(entity_routes(state.topics.clone()))
        .merge(entity_routes(state.posts.clone()))
}
