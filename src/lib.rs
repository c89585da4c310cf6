//! Forum API: topics and posts over PostgreSQL with clamped pagination and
//! constraint-aware validation.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{Settings, StoreBackend};
pub use error::{AppError, ConfigError};
pub use model::{Post, Record, Topic};
pub use routes::{app, common_routes, docs_routes, entity_routes, forum_routes};
pub use service::{EntityService, IdPolicy, PageWindow, MAX_PAGE_SIZE};
pub use state::{AppState, EntityState};
pub use store::{ensure_database_exists, EntityStore, MemoryStore, PgStore, StoreError};
