//! In-process store with the same constraint behaviour as the PostgreSQL tables:
//! serial ids, primary key uniqueness, optional natural key uniqueness and
//! not-null required columns.

use super::{EntityStore, StoreError, StoreResult};
use crate::model::Record;
use crate::sql::ConstraintViolation;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

struct Table<R> {
    rows: BTreeMap<i32, R>,
    next_id: i32,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Table {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<R: Record> Table<R> {
    fn check_not_null(record: &R) -> StoreResult<()> {
        for (col, value) in R::columns().iter().zip(record.values()) {
            if col.required && value == crate::sql::BindValue::Null {
                return Err(StoreError::Violation(ConstraintViolation::not_null(col.name)));
            }
        }
        Ok(())
    }

    fn check_key(&self, record: &R, skip_id: Option<i32>) -> StoreResult<()> {
        if !R::KEY_UNIQUE {
            return Ok(());
        }
        let taken = self
            .rows
            .values()
            .any(|r| Some(r.id()) != skip_id && r.key() == record.key());
        if taken {
            return Err(StoreError::Violation(ConstraintViolation::unique(R::key_constraint())));
        }
        Ok(())
    }

    fn sorted(&self) -> Vec<&R> {
        let mut rows: Vec<&R> = self.rows.values().collect();
        rows.sort_by(|a, b| a.key().cmp(b.key()).then(a.id().cmp(&b.id())));
        rows
    }
}

pub struct MemoryStore<R> {
    table: RwLock<Table<R>>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        MemoryStore {
            table: RwLock::new(Table::default()),
        }
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> EntityStore<R> for MemoryStore<R> {
    async fn page(&self, limit: i64, offset: i64) -> StoreResult<Vec<R>> {
        let table = self.table.read().await;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(0);
        Ok(table.sorted().into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn all(&self) -> StoreResult<Vec<R>> {
        let table = self.table.read().await;
        Ok(table.sorted().into_iter().cloned().collect())
    }

    async fn by_id(&self, id: i32) -> StoreResult<Option<R>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn by_key(&self, key: &str) -> StoreResult<Option<R>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|r| r.key() == key).cloned())
    }

    async fn create(&self, record: &R) -> StoreResult<i32> {
        let mut table = self.table.write().await;
        Table::check_not_null(record)?;
        table.check_key(record, None)?;
        let id = table.next_id;
        // A serial sequence does not skip ids taken by reassignment either.
        if table.rows.contains_key(&id) {
            table.next_id += 1;
            return Err(StoreError::Violation(ConstraintViolation::unique(R::primary_key_constraint())));
        }
        table.next_id += 1;
        let mut row = record.clone();
        row.set_id(id);
        table.rows.insert(id, row);
        Ok(id)
    }

    async fn update(&self, id: i32, record: &R) -> StoreResult<u64> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(0);
        }
        Table::check_not_null(record)?;
        let new_id = record.id();
        if new_id != id && table.rows.contains_key(&new_id) {
            return Err(StoreError::Violation(ConstraintViolation::unique(R::primary_key_constraint())));
        }
        table.check_key(record, Some(id))?;
        table.rows.remove(&id);
        table.rows.insert(new_id, record.clone());
        Ok(1)
    }

    async fn delete(&self, id: i32) -> StoreResult<u64> {
        Ok(self.table.write().await.rows.remove(&id).map_or(0, |_| 1))
    }

    async fn count_id(&self, id: i32) -> StoreResult<i64> {
        Ok(i64::from(self.table.read().await.rows.contains_key(&id)))
    }

    async fn count_key(&self, key: &str) -> StoreResult<i64> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|r| r.key() == key).count() as i64)
    }

    async fn count_key_excluding(&self, key: &str, exclude_id: i32) -> StoreResult<i64> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|r| r.id() != exclude_id && r.key() == key)
            .count() as i64)
    }

    async fn count_id_excluding(&self, new_id: i32, current_id: i32) -> StoreResult<i64> {
        if new_id == current_id {
            return Ok(0);
        }
        self.count_id(new_id).await
    }

    async fn initialize(&self) -> StoreResult<()> {
        *self.table.write().await = Table::default();
        tracing::info!(table = R::TABLE, "table initialized (memory)");
        Ok(())
    }

    async fn truncate(&self) -> StoreResult<()> {
        self.initialize().await
    }
}
