//! Constraint violation descriptors. The only place that reads PostgreSQL's native error shape.

use std::fmt;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for `not_null_violation`.
const NOT_NULL_VIOLATION: &str = "23502";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    Unique,
    NotNull,
}

/// A rejected write, described by kind and the constraint or column involved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub kind: ViolationKind,
    pub constraint: Option<String>,
    pub column: Option<String>,
}

impl ConstraintViolation {
    pub fn unique(constraint: impl Into<String>) -> Self {
        ConstraintViolation {
            kind: ViolationKind::Unique,
            constraint: Some(constraint.into()),
            column: None,
        }
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        ConstraintViolation {
            kind: ViolationKind::NotNull,
            constraint: None,
            column: Some(column.into()),
        }
    }

    /// Classify a driver error. `None` for anything that is not a unique or
    /// not-null violation.
    pub fn from_sqlx(err: &sqlx::Error) -> Option<Self> {
        let sqlx::Error::Database(db_err) = err else {
            return None;
        };
        let kind = match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => ViolationKind::Unique,
            Some(NOT_NULL_VIOLATION) => ViolationKind::NotNull,
            _ => return None,
        };
        let column = db_err
            .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
            .and_then(|pg| pg.column())
            .map(String::from);
        Some(ConstraintViolation {
            kind,
            constraint: db_err.constraint().map(String::from),
            column,
        })
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::Unique => write!(f, "unique violation")?,
            ViolationKind::NotNull => write!(f, "not-null violation")?,
        }
        if let Some(c) = &self.constraint {
            write!(f, " on constraint {}", c)?;
        }
        if let Some(c) = &self.column {
            write!(f, " on column {}", c)?;
        }
        Ok(())
    }
}
