#![doc = "The `taskdesk` library crate."]
#![doc = ""]
#![doc = "Domain models, the authentication gateway (bcrypt passwords, JWT sessions and the"]
#![doc = "request gate), the storage backends, routing and error handling of the taskdesk"]
#![doc = "task manager. The binary (`main.rs`) wires them together from a `Config`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
