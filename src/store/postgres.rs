//! PostgreSQL store. Every call borrows a pooled connection for its own duration only.

use super::{EntityStore, StoreError, StoreResult};
use crate::model::Record;
use crate::sql::{self, QueryBuf};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnectOptions};
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::{ConnectOptions, PgPool, Postgres};
use std::marker::PhantomData;
use std::str::FromStr;

pub struct PgStore<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> PgStore<R> {
    pub fn new(pool: PgPool) -> Self {
        PgStore {
            pool,
            _record: PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn statement(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

fn rows<R: Record>(q: &QueryBuf) -> QueryAs<'_, Postgres, R, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query_as::<_, R>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

fn scalar<T>(q: &QueryBuf) -> QueryScalar<'_, Postgres, T, PgArguments>
where
    (T,): for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query_scalar::<_, T>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

#[async_trait]
impl<R: Record> EntityStore<R> for PgStore<R> {
    async fn page(&self, limit: i64, offset: i64) -> StoreResult<Vec<R>> {
        let q = sql::select_page::<R>(limit, offset);
        Ok(rows::<R>(&q).fetch_all(&self.pool).await?)
    }

    async fn all(&self) -> StoreResult<Vec<R>> {
        let q = sql::select_all::<R>();
        Ok(rows::<R>(&q).fetch_all(&self.pool).await?)
    }

    async fn by_id(&self, id: i32) -> StoreResult<Option<R>> {
        let q = sql::select_by_id::<R>(id);
        Ok(rows::<R>(&q).fetch_optional(&self.pool).await?)
    }

    async fn by_key(&self, key: &str) -> StoreResult<Option<R>> {
        let q = sql::select_by_key::<R>(key);
        Ok(rows::<R>(&q).fetch_optional(&self.pool).await?)
    }

    async fn create(&self, record: &R) -> StoreResult<i32> {
        let q = sql::insert(record);
        Ok(scalar::<i32>(&q).fetch_one(&self.pool).await?)
    }

    async fn update(&self, id: i32, record: &R) -> StoreResult<u64> {
        let q = sql::update(id, record);
        Ok(statement(&q).execute(&self.pool).await?.rows_affected())
    }

    async fn delete(&self, id: i32) -> StoreResult<u64> {
        let q = sql::delete::<R>(id);
        Ok(statement(&q).execute(&self.pool).await?.rows_affected())
    }

    async fn count_id(&self, id: i32) -> StoreResult<i64> {
        let q = sql::count_by_id::<R>(id);
        Ok(scalar::<i64>(&q).fetch_one(&self.pool).await?)
    }

    async fn count_key(&self, key: &str) -> StoreResult<i64> {
        let q = sql::count_by_key::<R>(key);
        Ok(scalar::<i64>(&q).fetch_one(&self.pool).await?)
    }

    async fn count_key_excluding(&self, key: &str, exclude_id: i32) -> StoreResult<i64> {
        let q = sql::count_key_excluding::<R>(key, exclude_id);
        Ok(scalar::<i64>(&q).fetch_one(&self.pool).await?)
    }

    async fn count_id_excluding(&self, new_id: i32, current_id: i32) -> StoreResult<i64> {
        let q = sql::count_id_excluding::<R>(new_id, current_id);
        Ok(scalar::<i64>(&q).fetch_one(&self.pool).await?)
    }

    async fn initialize(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&sql::drop_table::<R>()).execute(&mut *tx).await?;
        sqlx::query(&sql::create_table::<R>()).execute(&mut *tx).await?;
        tx.commit().await?;
        tracing::info!(table = R::TABLE, "table initialized");
        Ok(())
    }

    async fn truncate(&self) -> StoreResult<()> {
        sqlx::query(&sql::truncate_table::<R>()).execute(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> StoreResult<()> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> StoreResult<(String, String)> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = match url[scheme_end..].find('/') {
        Some(i) => scheme_end + i + 1,
        None => {
            return Err(StoreError::Db(sqlx::Error::Configuration(
                "DATABASE_URL: no database path".into(),
            )))
        }
    };
    let db_name = url[path_start..].split('?').next().unwrap_or("").trim();
    let admin_url = format!("{}postgres", &url[..path_start]);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_name_is_split_from_url() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/forum?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "forum");
    }

    #[test]
    fn url_without_path_is_rejected() {
        assert!(parse_db_name_from_url("postgres://localhost").is_err());
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("my\"db"), "\"my\"\"db\"");
    }
}
