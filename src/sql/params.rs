//! Values that can be bound to a PostgreSQL statement built at runtime.

use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// A bind parameter. Each variant reports its own type so integer and text
/// parameters can share one `Vec` and one `bind` loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindValue {
    /// SQL `NULL`, typed as text (only text columns are nullable here).
    Null,
    Int(i32),
    BigInt(i64),
    Text(String),
}

impl BindValue {
    pub fn is_blank(&self) -> bool {
        match self {
            BindValue::Null => true,
            BindValue::Text(s) => s.trim().is_empty(),
            BindValue::Int(_) | BindValue::BigInt(_) => false,
        }
    }
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            BindValue::Null => Ok(IsNull::Yes),
            BindValue::Int(n) => <i32 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::BigInt(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::Text(s) => <&str as Encode<Postgres>>::encode_by_ref(&s.as_str(), buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            BindValue::Int(_) => <i32 as Type<Postgres>>::type_info(),
            BindValue::BigInt(_) => <i64 as Type<Postgres>>::type_info(),
            BindValue::Null | BindValue::Text(_) => <String as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}
