//! Shared application state for all routes.

use crate::config::Settings;
use crate::model::{Post, Record, Topic};
use crate::service::EntityService;
use crate::store::{EntityStore, MemoryStore, PgStore};
use sqlx::PgPool;
use std::sync::Arc;

/// Per-entity route state: the service plus list response policy.
pub struct EntityState<R: Record> {
    pub service: Arc<EntityService<R>>,
    pub empty_list_no_content: bool,
}

impl<R: Record> Clone for EntityState<R> {
    fn clone(&self) -> Self {
        EntityState {
            service: Arc::clone(&self.service),
            empty_list_no_content: self.empty_list_no_content,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    /// `None` when running on the in-process store.
    pub pool: Option<PgPool>,
    pub topics: EntityState<Topic>,
    pub posts: EntityState<Post>,
}

impl AppState {
    /// Services backed by PostgreSQL tables reached through `pool`.
    pub fn postgres(pool: PgPool, settings: &Settings) -> Self {
        let topics: Arc<dyn EntityStore<Topic>> = Arc::new(PgStore::<Topic>::new(pool.clone()));
        let posts: Arc<dyn EntityStore<Post>> = Arc::new(PgStore::<Post>::new(pool.clone()));
        Self::with_stores(Some(pool), topics, posts, settings)
    }

    /// Services backed by the in-process store; nothing survives a restart.
    pub fn memory(settings: &Settings) -> Self {
        let topics: Arc<dyn EntityStore<Topic>> = Arc::new(MemoryStore::<Topic>::new());
        let posts: Arc<dyn EntityStore<Post>> = Arc::new(MemoryStore::<Post>::new());
        Self::with_stores(None, topics, posts, settings)
    }

    pub fn with_stores(
        pool: Option<PgPool>,
        topics: Arc<dyn EntityStore<Topic>>,
        posts: Arc<dyn EntityStore<Post>>,
        settings: &Settings,
    ) -> Self {
        AppState {
            pool,
            topics: EntityState {
                service: Arc::new(EntityService::new(topics, settings.id_policy)),
                empty_list_no_content: settings.empty_list_no_content,
            },
            posts: EntityState {
                service: Arc::new(EntityService::new(posts, settings.id_policy)),
                empty_list_no_content: settings.empty_list_no_content,
            },
        }
    }

    /// Drop and recreate every table.
    pub async fn initialize_tables(&self) -> Result<(), crate::error::AppError> {
        self.topics.service.store().initialize().await?;
        self.posts.service.store().initialize().await?;
        Ok(())
    }
}
