//! Taskvault Client - SDK for service consumers
//!
//! HTTP client for the Taskvault API with transparent access token
//! renewal: a 401 triggers one refresh attempt before the original
//! request is resent.

pub mod client;
pub mod config;
pub mod error;
pub mod optimistic;
pub mod session;

pub use client::{
    CreateTaskRequest, Pagination, TaskClient, TaskDto, TaskList, TaskStats, UpdateTaskRequest,
};
pub use config::ClientConfig;
pub use error::ClientError;
pub use optimistic::{MutationId, OptimisticTaskList};
pub use session::{SessionContext, SessionSnapshot, SessionStore};
