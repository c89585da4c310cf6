//! Builds parameterized SELECT, INSERT, UPDATE, DELETE and DDL for a [`Record`] table.

use super::BindValue;
use crate::model::Record;

/// Quote identifier for PostgreSQL (safe: only from `Record` constants).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// `"id", "col1", "col2"` in `Record::columns` order.
fn select_column_list<R: Record>() -> String {
    std::iter::once("id")
        .chain(R::columns().iter().map(|c| c.name))
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Byte-order collation, so every database and the in-process store agree.
fn order_by<R: Record>() -> String {
    format!("ORDER BY {} COLLATE \"C\", \"id\"", quoted(R::KEY_COLUMN))
}

/// One page in canonical order (natural key, then id).
pub fn select_page<R: Record>(limit: i64, offset: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let l = q.push_param(BindValue::BigInt(limit));
    let o = q.push_param(BindValue::BigInt(offset));
    q.sql = format!(
        "SELECT {} FROM {} {} LIMIT ${} OFFSET ${}",
        select_column_list::<R>(),
        quoted(R::TABLE),
        order_by::<R>(),
        l,
        o
    );
    q
}

pub fn select_all<R: Record>() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} {}",
        select_column_list::<R>(),
        quoted(R::TABLE),
        order_by::<R>()
    );
    q
}

pub fn select_by_id<R: Record>(id: i32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::Int(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE \"id\" = ${}",
        select_column_list::<R>(),
        quoted(R::TABLE),
        n
    );
    q
}

/// First row (lowest id) with the given natural key.
pub fn select_by_key<R: Record>(key: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::Text(key.to_string()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${} ORDER BY \"id\" LIMIT 1",
        select_column_list::<R>(),
        quoted(R::TABLE),
        quoted(R::KEY_COLUMN),
        n
    );
    q
}

/// INSERT of all value columns, returning the generated id.
pub fn insert<R: Record>(record: &R) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (col, value) in R::columns().iter().zip(record.values()) {
        cols.push(quoted(col.name));
        placeholders.push(format!("${}", q.push_param(value)));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING \"id\"",
        quoted(R::TABLE),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// Full-row replacement of the row with `id`. The `id` column is rewritten to
/// `record.id()`, which equals `id` unless the caller is reassigning identity.
pub fn update<R: Record>(id: i32, record: &R) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    let n = q.push_param(BindValue::Int(record.id()));
    sets.push(format!("\"id\" = ${}", n));
    for (col, value) in R::columns().iter().zip(record.values()) {
        let n = q.push_param(value);
        sets.push(format!("{} = ${}", quoted(col.name), n));
    }
    let w = q.push_param(BindValue::Int(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE \"id\" = ${}",
        quoted(R::TABLE),
        sets.join(", "),
        w
    );
    q
}

pub fn delete<R: Record>(id: i32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::Int(id));
    q.sql = format!("DELETE FROM {} WHERE \"id\" = ${}", quoted(R::TABLE), n);
    q
}

pub fn count_by_id<R: Record>(id: i32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::Int(id));
    q.sql = format!("SELECT COUNT(*) FROM {} WHERE \"id\" = ${}", quoted(R::TABLE), n);
    q
}

pub fn count_by_key<R: Record>(key: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::Text(key.to_string()));
    q.sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ${}",
        quoted(R::TABLE),
        quoted(R::KEY_COLUMN),
        n
    );
    q
}

/// Rows holding `key`, other than the row `exclude_id`.
pub fn count_key_excluding<R: Record>(key: &str, exclude_id: i32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let k = q.push_param(BindValue::Text(key.to_string()));
    let i = q.push_param(BindValue::Int(exclude_id));
    q.sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ${} AND \"id\" <> ${}",
        quoted(R::TABLE),
        quoted(R::KEY_COLUMN),
        k,
        i
    );
    q
}

/// Rows holding `new_id`, other than the row `current_id`.
pub fn count_id_excluding<R: Record>(new_id: i32, current_id: i32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let a = q.push_param(BindValue::Int(new_id));
    let b = q.push_param(BindValue::Int(current_id));
    q.sql = format!(
        "SELECT COUNT(*) FROM {} WHERE \"id\" = ${} AND \"id\" <> ${}",
        quoted(R::TABLE),
        a,
        b
    );
    q
}

pub fn drop_table<R: Record>() -> String {
    format!("DROP TABLE IF EXISTS {}", quoted(R::TABLE))
}

/// `CREATE TABLE` with a serial primary key; constraint names are left to
/// PostgreSQL so they come out as `<table>_pkey` and `<table>_<key>_key`.
pub fn create_table<R: Record>() -> String {
    let mut defs = vec!["\"id\" SERIAL PRIMARY KEY".to_string()];
    for col in R::columns() {
        let mut def = format!("{} TEXT", quoted(col.name));
        if col.required {
            def.push_str(" NOT NULL");
        }
        if col.name == R::KEY_COLUMN && R::KEY_UNIQUE {
            def.push_str(" UNIQUE");
        }
        defs.push(def);
    }
    format!("CREATE TABLE {} (\n  {}\n)", quoted(R::TABLE), defs.join(",\n  "))
}

pub fn truncate_table<R: Record>() -> String {
    format!("TRUNCATE {} RESTART IDENTITY", quoted(R::TABLE))
}
