//! EntityService: clamped listing, uniqueness checks and write-time error translation.

mod entity;
pub mod pagination;
mod validation;
pub use entity::{EntityService, IdPolicy};
pub use pagination::{PageWindow, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_PAGE_SIZE};
pub use validation::RequestValidator;
