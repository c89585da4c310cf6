use super::{nullable_string, optional_text, ColumnSpec, Record};
use crate::sql::BindValue;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A forum topic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Topic {
    /// Store-generated identifier. Ignored on create.
    #[serde(default)]
    pub id: i32,
    /// Unique human-readable name.
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    /// Optional detailed description.
    #[serde(default)]
    pub description: Option<String>,
}

impl Topic {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Topic {
            id: 0,
            name: name.into(),
            description: description.map(String::from),
        }
    }
}

const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "name", required: true },
    ColumnSpec { name: "description", required: false },
];

impl Record for Topic {
    const KIND: &'static str = "topic";
    const TABLE: &'static str = "topics";
    const KEY_COLUMN: &'static str = "name";
    const KEY_UNIQUE: bool = true;

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
        &self.name
    }

    fn values(&self) -> Vec<BindValue> {
        vec![BindValue::Text(self.name.clone()), optional_text(&self.description)]
    }
}
