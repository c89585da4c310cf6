//! Response helpers: plain JSON bodies, `Location` on create.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub fn success_one<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// 201 with the created body and a `Location` pointing at it.
pub fn created<T: Serialize>(location: String, data: T) -> Response {
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(data)).into_response()
}

/// 200 with a JSON array, or 204 when empty and `no_content_when_empty` is set.
pub fn success_many<T: Serialize>(data: Vec<T>, no_content_when_empty: bool) -> Response {
    if data.is_empty() && no_content_when_empty {
        return StatusCode::NO_CONTENT.into_response();
    }
    (StatusCode::OK, Json(data)).into_response()
}

/// 204 when a write touched a row, 404 otherwise.
pub fn affected_or_not_found(count: u64) -> Response {
    if count == 0 {
        StatusCode::NOT_FOUND.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}
