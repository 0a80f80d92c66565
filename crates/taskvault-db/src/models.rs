//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use taskvault_types::{PublicUser, TaskPriority, TaskStatus};

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Refresh token row from the database
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRow {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Task row from the database
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Conversion implementations from Row types to taskvault-types domain types
impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> taskvault_types::UserId {
        taskvault_types::UserId(self.id)
    }

    /// Public view of this user. The password hash stays behind.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.user_id(),
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

impl RefreshTokenRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> taskvault_types::UserId {
        taskvault_types::UserId(self.user_id)
    }
}

impl TaskRow {
    /// Convert to domain TaskId
    pub fn task_id(&self) -> taskvault_types::TaskId {
        taskvault_types::TaskId(self.id)
    }

    /// Convert to domain UserId
    pub fn user_id(&self) -> taskvault_types::UserId {
        taskvault_types::UserId(self.user_id)
    }

    /// Parse the stored status string
    pub fn status(&self) -> Result<TaskStatus, taskvault_types::ParseEnumError> {
        self.status.parse()
    }

    /// Parse the stored priority string
    pub fn priority(&self) -> Result<TaskPriority, taskvault_types::ParseEnumError> {
        self.priority.parse()
    }
}
