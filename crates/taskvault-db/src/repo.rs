//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use taskvault_types::{TaskPriority, TaskStatus};

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Create a new user
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// Refresh token repository trait
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Store a newly issued refresh token
    async fn create(&self, token: CreateRefreshToken) -> DbResult<RefreshTokenRow>;

    /// Find a live token record by its exact token string.
    ///
    /// Expired records are treated as absent.
    async fn find_by_token(&self, token: &str) -> DbResult<Option<RefreshTokenRow>>;

    /// Delete a token record, returning how many rows went away
    async fn delete_by_token(&self, token: &str) -> DbResult<u64>;

    /// Delete expired token records
    async fn delete_expired(&self) -> DbResult<u64>;
}

/// Create refresh token input
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Task repository trait
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Find a task by ID, scoped to its owner
    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> DbResult<Option<TaskRow>>;

    /// List a user's tasks with filtering, sorting and pagination.
    ///
    /// Returns the page of rows plus the total count matching the filters.
    async fn list(&self, user_id: Uuid, query: &TaskQuery) -> DbResult<(Vec<TaskRow>, i64)>;

    /// Per-status counts across all of a user's tasks
    async fn count_by_status(&self, user_id: Uuid) -> DbResult<TaskCounts>;

    /// Create a new task
    async fn create(&self, task: CreateTask) -> DbResult<TaskRow>;

    /// Apply a partial update, scoped to the owner.
    ///
    /// Returns the updated row, or None when no such task exists for the user.
    async fn update(&self, user_id: Uuid, id: Uuid, update: UpdateTask)
        -> DbResult<Option<TaskRow>>;

    /// Delete a task, scoped to the owner. Returns whether a row was deleted.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> DbResult<bool>;
}

/// Create task input
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial task update. None fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Sortable task columns.
///
/// A closed set so user input can never name an arbitrary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    #[default]
    CreatedAt,
    DueDate,
    Priority,
    Title,
}

impl TaskSort {
    /// Column name used in ORDER BY
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::DueDate => "due_date",
            Self::Priority => "priority",
            Self::Title => "title",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for this direction
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Task listing parameters
#[derive(Debug, Clone)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive substring match over title and description
    pub search: Option<String>,
    pub sort_by: TaskSort,
    pub sort_order: SortOrder,
    /// 1-based page number
    pub page: i64,
    pub limit: i64,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            search: None,
            sort_by: TaskSort::default(),
            sort_order: SortOrder::default(),
            page: 1,
            limit: 10,
        }
    }
}

impl TaskQuery {
    /// Row offset for the requested page.
    ///
    /// Saturates so an absurd page number yields a huge offset (an
    /// empty page) instead of wrapping negative.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit.max(0))
    }
}

/// Per-status task counts
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct TaskCounts {
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_from_page_and_limit() {
        let query = TaskQuery {
            page: 3,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(query.offset(), 20);

        // Pages below 1 are floored
        let query = TaskQuery {
            page: 0,
            ..Default::default()
        };
        assert_eq!(query.offset(), 0);
        let query = TaskQuery {
            page: i64::MIN,
            ..Default::default()
        };
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let query = TaskQuery {
            page: i64::MAX,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(query.offset(), i64::MAX);

        // Never negative, whatever the inputs
        let query = TaskQuery {
            page: i64::MAX,
            limit: -1,
            ..Default::default()
        };
        assert_eq!(query.offset(), 0);
    }
}
