//! Generated OpenAPI document for the record schemas.

use crate::model::{Post, Topic};
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Forum API", description = "An API for a forum: topics and posts."),
    components(schemas(Topic, Post)),
    tags(
        (name = "topics", description = "GET/POST /api/topics, GET/PUT/DELETE /api/topics/{id}"),
        (name = "posts", description = "GET/POST /api/posts, GET/PUT/DELETE /api/posts/{id}")
    )
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn docs_routes() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi))
}
