//! EntityService: pagination, existence checks and constraint translation over an [`EntityStore`].

use super::pagination::PageWindow;
use super::validation::RequestValidator;
use crate::error::AppError;
use crate::model::Record;
use crate::sql::{ConstraintViolation, ViolationKind};
use crate::store::{EntityStore, StoreError};
use std::sync::Arc;

/// Whether an update body may move a row to a different id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdPolicy {
    /// The id in the body is ignored; the path id always wins.
    #[default]
    Immutable,
    /// A non-zero id in the body replaces the row's id, subject to the primary key constraint.
    Reassignable,
}

pub struct EntityService<R: Record> {
    store: Arc<dyn EntityStore<R>>,
    id_policy: IdPolicy,
}

impl<R: Record> EntityService<R> {
    pub fn new(store: Arc<dyn EntityStore<R>>, id_policy: IdPolicy) -> Self {
        EntityService { store, id_policy }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore<R>> {
        &self.store
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy
    }

    /// One page in natural key order. Out of range `limit`/`page` are clamped, never rejected.
    pub async fn get_all(&self, limit: i64, page: i64) -> Result<Vec<R>, AppError> {
        let window = PageWindow::clamp(limit, page);
        if window.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.page(window.limit, window.offset).await?)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<R>, AppError> {
        Ok(self.store.by_id(id).await?)
    }

    pub async fn get_by_key(&self, key: &str) -> Result<Option<R>, AppError> {
        Ok(self.store.by_key(key).await?)
    }

    pub async fn exists_id(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.store.count_id(id).await? > 0)
    }

    pub async fn exists_key(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.store.count_key(key).await? > 0)
    }

    /// Advisory: a concurrent writer can still take the key before `add` runs.
    pub async fn key_is_unique(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.store.count_key(key).await? == 0)
    }

    /// True when no row other than `exclude_id` holds `key`.
    pub async fn new_key_is_unique(&self, exclude_id: i32, key: &str) -> Result<bool, AppError> {
        Ok(self.store.count_key_excluding(key, exclude_id).await? == 0)
    }

    /// True when no row other than `current_id` holds `new_id`.
    pub async fn new_id_is_unique(&self, current_id: i32, new_id: i32) -> Result<bool, AppError> {
        Ok(self.store.count_id_excluding(new_id, current_id).await? == 0)
    }

    /// Insert and return the row as committed.
    ///
    /// A taken natural key is reported before the insert; the constraint
    /// still decides when a concurrent writer wins the race.
    pub async fn add(&self, record: R) -> Result<R, AppError> {
        RequestValidator::validate(&record)?;
        if R::KEY_UNIQUE && !self.key_is_unique(record.key()).await? {
            return Err(AppError::DuplicateName(record.key().to_string()));
        }
        let id = match self.store.create(&record).await {
            Ok(id) => id,
            // The sequence has already moved past an id taken by reassignment.
            Err(StoreError::Violation(v)) if is_primary_key::<R>(&v) => {
                tracing::warn!(kind = R::KIND, "generated id already taken, retrying insert");
                self.store
                    .create(&record)
                    .await
                    .map_err(|e| translate(e, &record, WriteOp::Create))?
            }
            Err(e) => return Err(translate(e, &record, WriteOp::Create)),
        };
        self.store
            .by_id(id)
            .await?
            .ok_or(AppError::Store(StoreError::Db(sqlx::Error::RowNotFound)))
    }

    /// Full-row replacement. Returns 0 when `id` does not exist.
    pub async fn update(&self, id: i32, mut record: R) -> Result<u64, AppError> {
        RequestValidator::validate(&record)?;
        let target = match self.id_policy {
            IdPolicy::Reassignable if record.id() != 0 => record.id(),
            _ => id,
        };
        if R::KEY_UNIQUE && !self.new_key_is_unique(id, record.key()).await? {
            return Err(AppError::DuplicateName(record.key().to_string()));
        }
        if target != id && !self.new_id_is_unique(id, target).await? {
            return Err(AppError::DuplicateId(target));
        }
        record.set_id(target);
        self.store
            .update(id, &record)
            .await
            .map_err(|e| translate(e, &record, WriteOp::Update))
    }

    /// Physical delete. Returns 0 when nothing matched.
    pub async fn remove(&self, id: i32) -> Result<u64, AppError> {
        Ok(self.store.delete(id).await?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WriteOp {
    Create,
    Update,
}

fn is_primary_key<R: Record>(v: &ConstraintViolation) -> bool {
    v.kind == ViolationKind::Unique && v.constraint.as_deref() == Some(R::primary_key_constraint().as_str())
}

/// Map a write-time constraint violation to the domain error for `record`.
/// A primary key collision is the caller's fault only when an update moves identity.
fn translate<R: Record>(err: StoreError, record: &R, op: WriteOp) -> AppError {
    let violation = match err {
        StoreError::Violation(v) => v,
        other => return AppError::Store(other),
    };
    if is_primary_key::<R>(&violation) {
        return match op {
            WriteOp::Update => AppError::DuplicateId(record.id()),
            WriteOp::Create => AppError::Store(StoreError::Violation(violation)),
        };
    }
    match violation.kind {
        ViolationKind::NotNull => AppError::MissingRequiredField(
            violation.column.unwrap_or_else(|| R::KEY_COLUMN.to_string()),
        ),
        ViolationKind::Unique => AppError::DuplicateName(record.key().to_string()),
    }
}
