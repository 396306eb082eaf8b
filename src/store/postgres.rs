use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, User};

/// PostgreSQL backend. Every operation is a single statement, so each insert or update is
/// atomic and persisted before the call returns.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        log::info!("connected to database (max {} connections)", max_connections);
        Ok(Self::new(pool))
    }

    /// Applies the migrations embedded from `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("migration failed: {}", e)))?;
        log::info!("database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id, username, email, password_hash, created_at",
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn find_tasks_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, due_date, completed, completed_at, priority, user_id, created_at, updated_at
             FROM tasks WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn create_task(&self, task: Task) -> Result<Task, AppError> {
        let created = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (id, title, description, due_date, completed, completed_at, priority, user_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id, title, description, due_date, completed, completed_at, priority, user_id, created_at, updated_at",
        )
        .bind(task.id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.due_date)
        .bind(task.completed)
        .bind(task.completed_at)
        .bind(task.priority)
        .bind(task.user_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner_id: i32,
        input: TaskInput,
    ) -> Result<Task, AppError> {
        // completed_at follows the flag: stamped on the false -> true edge, kept while
        // true, cleared on false.
        let updated = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET title = $1, description = $2, due_date = $3, priority = $4,
                 completed = $5,
                 completed_at = CASE WHEN $5 THEN COALESCE(completed_at, NOW()) ELSE NULL END,
                 updated_at = NOW()
             WHERE id = $6 AND user_id = $7
             RETURNING id, title, description, due_date, completed, completed_at, priority, user_id, created_at, updated_at",
        )
        .bind(input.title)
        .bind(input.description)
        .bind(input.due_date)
        .bind(input.priority.unwrap_or_default())
        .bind(input.completed)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        owner_id: i32,
        completed: bool,
    ) -> Result<Task, AppError> {
        let updated = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET completed = $1,
                 completed_at = CASE WHEN $1 THEN COALESCE(completed_at, NOW()) ELSE NULL END,
                 updated_at = NOW()
             WHERE id = $2 AND user_id = $3
             RETURNING id, title, description, due_date, completed, completed_at, priority, user_id, created_at, updated_at",
        )
        .bind(completed)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn delete_task(&self, id: Uuid, owner_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task not found".into()));
        }

        Ok(())
    }
}
