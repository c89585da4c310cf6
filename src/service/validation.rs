//! Request validation from record column rules.

use crate::error::AppError;
use crate::model::Record;

pub struct RequestValidator;

impl RequestValidator {
    /// All required columns must carry a non-blank value.
    pub fn validate<R: Record>(record: &R) -> Result<(), AppError> {
        for (col, value) in R::columns().iter().zip(record.values()) {
            if col.required && value.is_blank() {
                return Err(AppError::MissingRequiredField(col.name.to_string()));
            }
        }
        Ok(())
    }
}
