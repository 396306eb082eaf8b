pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskPriority, TaskStatusUpdate};
pub use user::{NewUser, User};
