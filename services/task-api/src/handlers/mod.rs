//! HTTP handlers

mod auth;
mod health;
mod tasks;

pub use auth::{login, logout, me, refresh, register};
pub use health::{health, ready};
pub use tasks::{create_task, delete_task, get_task, list_tasks, toggle_task, update_task};
