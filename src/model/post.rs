use super::{nullable_string, optional_text, ColumnSpec, Record};
use crate::sql::BindValue;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A post. Titles are not unique; lookup by title returns the oldest match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Post {
    #[serde(default)]
    pub id: i32,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl Post {
    pub fn new(title: impl Into<String>, content: Option<&str>) -> Self {
        Post {
            id: 0,
            title: title.into(),
            content: content.map(String::from),
        }
    }
}

const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "title", required: true },
    ColumnSpec { name: "content", required: false },
];

impl Record for Post {
    const KIND: &'static str = "post";
    const TABLE: &'static str = "posts";
    const KEY_COLUMN: &'static str = "title";
    const KEY_UNIQUE: bool = false;

    fn columns() -> &'static [ColumnSpec] {
        COLUMNS
    }

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn key(&self) -> &str {
        &self.title
    }

    fn values(&self) -> Vec<BindValue> {
        vec![BindValue::Text(self.title.clone()), optional_text(&self.content)]
    }
}
