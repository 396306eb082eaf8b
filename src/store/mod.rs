//! Persistence seams.
//!
//! Handlers and the auth gateway only see the [`UserStore`] and [`TaskStore`] traits.
//! [`postgres::PgStore`] is the production backend; [`memory::MemoryStore`] keeps the
//! same contract in process and is selected with `DATABASE_URL=memory://`.
//!
//! Every task mutation is scoped by owner: a task that does not exist and a task that
//! belongs to somebody else are both reported as `AppError::NotFound`.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

const MEMORY_URL_SCHEME: &str = "memory:";

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Duplicate usernames or emails are `AppError::Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks of `owner_id`, newest first.
    async fn find_tasks_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError>;

    async fn create_task(&self, task: Task) -> Result<Task, AppError>;

    async fn update_task(
        &self,
        id: Uuid,
        owner_id: i32,
        input: TaskInput,
    ) -> Result<Task, AppError>;

    async fn update_task_status(
        &self,
        id: Uuid,
        owner_id: i32,
        completed: bool,
    ) -> Result<Task, AppError>;

    async fn delete_task(&self, id: Uuid, owner_id: i32) -> Result<(), AppError>;
}

/// Both store handles, backed by the same instance.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl Stores {
    pub fn from_backend<S>(backend: S) -> Self
    where
        S: UserStore + TaskStore + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            users: backend.clone(),
            tasks: backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backend(MemoryStore::new())
    }

    /// Opens the backend named by `config.database_url` and, for PostgreSQL, applies
    /// pending migrations.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        if config.database_url.starts_with(MEMORY_URL_SCHEME) {
            log::warn!("using the in-memory store; data is lost on shutdown");
            return Ok(Self::in_memory());
        }

        let store = PgStore::connect(&config.database_url, config.database_max_connections).await?;
        store.migrate().await?;
        Ok(Self::from_backend(store))
    }
}
