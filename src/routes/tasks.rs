use crate::{
    auth::{AuthService, AuthenticatedUser},
    error::AppError,
    models::{user::normalize_email, Task, TaskInput, TaskStatusUpdate},
    store::TaskStore,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Lists the tasks owned by `user_id`, newest first.
///
/// `user_id` must be the caller's own id.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects (possibly empty).
/// - `401 Unauthorized`: missing or invalid token.
/// - `403 Forbidden`: `user_id` belongs to someone else.
#[get("/{user_id}")]
pub async fn get_tasks(
    auth: web::Data<AuthService>,
    tasks: web::Data<dyn TaskStore>,
    caller: AuthenticatedUser,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let owner = auth.current_user(&caller.0).await?;
    if owner.id != user_id.into_inner() {
        return Err(AppError::Forbidden(
            "Cannot list another user's tasks".into(),
        ));
    }

    let owned = tasks.find_tasks_by_owner(owner.id).await?;
    Ok(HttpResponse::Ok().json(owned))
}

/// Creates a task owned by the user with the given email.
///
/// The email in the path must be the caller's. Omitted fields take their defaults:
/// `completed: false`, `priority: MEDIUM`, no description or due date.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `403 Forbidden`: `email` is not the caller's.
/// - `422 Unprocessable Entity`: title empty or too long, description too long.
#[post("/{email}")]
pub async fn create_task(
    auth: web::Data<AuthService>,
    tasks: web::Data<dyn TaskStore>,
    caller: AuthenticatedUser,
    email: web::Path<String>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let owner = auth.current_user(&caller.0).await?;
    if normalize_email(&email) != owner.email {
        return Err(AppError::Forbidden(
            "Cannot create tasks for another user".into(),
        ));
    }

    let created = tasks
        .create_task(Task::new(task_data.into_inner(), owner.id))
        .await?;
    log::info!("user {} created task {}", owner.id, created.id);

    Ok(HttpResponse::Created().json(created))
}

/// Sets or clears a task's completion flag.
///
/// Completing a task stamps `completedAt`; reopening it clears the stamp.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `404 Not Found`: no such task among the caller's tasks.
#[patch("/{id}/status")]
pub async fn update_task_status(
    auth: web::Data<AuthService>,
    tasks: web::Data<dyn TaskStore>,
    caller: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    status: web::Json<TaskStatusUpdate>,
) -> Result<impl Responder, AppError> {
    let owner = auth.current_user(&caller.0).await?;
    let updated = tasks
        .update_task_status(task_id.into_inner(), owner.id, status.completed)
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Replaces a task's title, description, due date, priority and completion flag.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `404 Not Found`: no such task among the caller's tasks.
/// - `422 Unprocessable Entity`: invalid input.
#[put("/{id}")]
pub async fn update_task(
    auth: web::Data<AuthService>,
    tasks: web::Data<dyn TaskStore>,
    caller: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let owner = auth.current_user(&caller.0).await?;
    let updated = tasks
        .update_task(task_id.into_inner(), owner.id, task_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such task among the caller's tasks.
#[delete("/{id}")]
pub async fn delete_task(
    auth: web::Data<AuthService>,
    tasks: web::Data<dyn TaskStore>,
    caller: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let owner = auth.current_user(&caller.0).await?;
    let task_uuid = task_id.into_inner();
    tasks.delete_task(task_uuid, owner.id).await?;
    log::info!("user {} deleted task {}", owner.id, task_uuid);

    Ok(HttpResponse::NoContent().finish())
}
