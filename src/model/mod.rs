//! Persisted records: the `Record` trait and the two forum tables that implement it.

mod post;
mod topic;

pub use post::Post;
pub use topic::Topic;

use crate::sql::BindValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::postgres::PgRow;

/// A value column of a record table (the `id` column is implicit).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// Declared `NOT NULL`; blank strings are rejected before reaching the store.
    pub required: bool,
}

/// A row type stored in a single table with a serial `id` primary key and one
/// caller-visible natural key column.
pub trait Record:
    Clone
    + std::fmt::Debug
    + Serialize
    + DeserializeOwned
    + for<'r> sqlx::FromRow<'r, PgRow>
    + Send
    + Sync
    + Unpin
    + 'static
{
    /// Singular name used in log fields and error messages.
    const KIND: &'static str;
    /// Table name; also the route segment under `/api`.
    const TABLE: &'static str;
    /// Natural key column, used for lookup and canonical ordering.
    const KEY_COLUMN: &'static str;
    /// Whether the natural key carries a `UNIQUE` constraint.
    const KEY_UNIQUE: bool;

    /// Value columns in bind order. The natural key column comes first.
    fn columns() -> &'static [ColumnSpec];

    fn id(&self) -> i32;

    fn set_id(&mut self, id: i32);

    fn key(&self) -> &str;

    /// Bind values for [`Record::columns`], same order and length.
    fn values(&self) -> Vec<BindValue>;

    /// PostgreSQL default name of the primary key constraint.
    fn primary_key_constraint() -> String {
        format!("{}_pkey", Self::TABLE)
    }

    /// PostgreSQL default name of the natural key unique constraint.
    fn key_constraint() -> String {
        format!("{}_{}_key", Self::TABLE, Self::KEY_COLUMN)
    }
}

/// Deserialize a required text field so that `null` and a missing field both
/// become an empty string; validation then reports the field as missing.
pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn optional_text(value: &Option<String>) -> BindValue {
    match value {
        Some(s) => BindValue::Text(s.clone()),
        None => BindValue::Null,
    }
}
