use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, User};

/// In-process store with the same contract as [`super::PgStore`].
///
/// Each operation takes the lock once, which gives the same per-call atomicity the
/// database provides for single statements.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    next_user_id: i32,
    users: Vec<User>,
    tasks: HashMap<Uuid, Task>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned_task<'a>(
    tasks: &'a mut HashMap<Uuid, Task>,
    id: Uuid,
    owner_id: i32,
) -> Result<&'a mut Task, AppError> {
    tasks
        .get_mut(&id)
        .filter(|task| task.user_id == owner_id)
        .ok_or_else(|| AppError::NotFound("Task not found".into()))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.state.write().await;

        if state
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Conflict(
                "Username or email already registered".into(),
            ));
        }

        state.next_user_id += 1;
        let created = User {
            id: state.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn find_tasks_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.user_id == owner_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn create_task(&self, task: Task) -> Result<Task, AppError> {
        let mut state = self.state.write().await;

        if !state.users.iter().any(|u| u.id == task.user_id) {
            return Err(AppError::NotFound("Owner not found".into()));
        }
        if state.tasks.contains_key(&task.id) {
            return Err(AppError::Conflict("Task already exists".into()));
        }

        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner_id: i32,
        input: TaskInput,
    ) -> Result<Task, AppError> {
        let mut state = self.state.write().await;
        let task = owned_task(&mut state.tasks, id, owner_id)?;
        task.apply_update(input, Utc::now());
        Ok(task.clone())
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        owner_id: i32,
        completed: bool,
    ) -> Result<Task, AppError> {
        let mut state = self.state.write().await;
        let task = owned_task(&mut state.tasks, id, owner_id)?;
        task.set_completed(completed, Utc::now());
        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid, owner_id: i32) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        owned_task(&mut state.tasks, id, owner_id)?;
        state.tasks.remove(&id);
        Ok(())
    }
}
