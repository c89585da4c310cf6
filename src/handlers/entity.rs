//! Entity CRUD handlers: list, read (by id or natural key), create, update, delete.

use crate::error::AppError;
use crate::model::Record;
use crate::response;
use crate::service::{DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::state::EntityState;
use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn parse_id(id_str: &str) -> Result<i32, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}

fn parse_body<R: Record>(value: Value) -> Result<R, AppError> {
    if !value.is_object() {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn log_rejection<R: Record>(err: &AppError) {
    if err.status_and_code().0.is_client_error() {
        tracing::warn!(kind = R::KIND, error = %err, "write rejected");
    }
}

pub async fn list<R: Record>(
    State(state): State<EntityState<R>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let mut limit = DEFAULT_LIMIT;
    let mut page = DEFAULT_PAGE;
    for (k, v) in params {
        match k.as_str() {
            "limit" => limit = v.parse().unwrap_or(DEFAULT_LIMIT),
            "page" => page = v.parse().unwrap_or(DEFAULT_PAGE),
            _ => {}
        }
    }

    tracing::info!(kind = R::KIND, limit, page, "searching");
    let rows = state.service.get_all(limit, page).await?;
    tracing::info!(kind = R::KIND, count = rows.len(), "found");
    Ok(response::success_many(rows, state.empty_list_no_content))
}

/// An integer segment is an id; anything else is a natural key.
pub async fn read<R: Record>(
    State(state): State<EntityState<R>>,
    Path(segment): Path<String>,
) -> Result<Response, AppError> {
    let found = match segment.parse::<i32>() {
        Ok(id) => {
            tracing::info!(kind = R::KIND, id, "searching by id");
            state.service.get_by_id(id).await?
        }
        Err(_) => {
            tracing::info!(kind = R::KIND, key = %segment, "searching by {}", R::KEY_COLUMN);
            state.service.get_by_key(&segment).await?
        }
    };
    match found {
        Some(row) => Ok(response::success_one(row)),
        None => {
            tracing::warn!(kind = R::KIND, segment = %segment, "could not locate");
            Err(AppError::NotFound(format!("{} {}", R::KIND, segment)))
        }
    }
}

pub async fn create<R: Record>(
    State(state): State<EntityState<R>>,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let record: R = parse_body(body)?;
    tracing::info!(kind = R::KIND, key = record.key(), "creating");
    let created = state.service.add(record).await.map_err(|e| {
        log_rejection::<R>(&e);
        e
    })?;
    tracing::info!(kind = R::KIND, id = created.id(), "created");
    let location = format!("/api/{}/{}", R::TABLE, created.id());
    Ok(response::created(location, created))
}

pub async fn update<R: Record>(
    State(state): State<EntityState<R>>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let id = parse_id(&id_str)?;
    let record: R = parse_body(body)?;
    tracing::info!(kind = R::KIND, id, new_id = record.id(), key = record.key(), "updating");
    let updated = state.service.update(id, record).await.map_err(|e| {
        log_rejection::<R>(&e);
        e
    })?;
    tracing::info!(kind = R::KIND, id, updated, "updated");
    Ok(response::affected_or_not_found(updated))
}

pub async fn delete<R: Record>(
    State(state): State<EntityState<R>>,
    Path(id_str): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id_str)?;
    tracing::info!(kind = R::KIND, id, "removing");
    let removed = state.service.remove(id).await?;
    tracing::info!(kind = R::KIND, id, removed, "removed");
    Ok(response::affected_or_not_found(removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Topic;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("Weather"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn body_must_be_an_object() {
        assert!(parse_body::<Topic>(serde_json::json!(["Weather"])).is_err());
        let t: Topic = parse_body(serde_json::json!({"name": "Weather"})).unwrap();
        assert_eq!(t.name, "Weather");
    }
}
