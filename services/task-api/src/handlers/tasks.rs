//! Task CRUD handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use taskvault_db::{
    CreateTask, SortOrder, TaskQuery, TaskRepository, TaskRow, TaskSort, UpdateTask,
};
use taskvault_types::{TaskPriority, TaskStatus};

use crate::error::{ApiError, ApiResult, FieldError};
use crate::extractors::AuthUser;
use crate::response::ApiEnvelope;
use crate::state::AppState;
use crate::validation;

/// Default page size
const DEFAULT_LIMIT: i64 = 10;
/// Largest allowed page size
const MAX_LIMIT: i64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Task as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for TaskDto {
    type Error = ApiError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        // A parse failure here means the table holds a value the enum
        // whitelist never wrote
        let status = row
            .status()
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let priority = row
            .priority()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status,
            priority,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TaskData {
    pub task: TaskDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct TaskStats {
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
}

#[derive(Debug, Serialize)]
pub struct TaskListData {
    pub tasks: Vec<TaskDto>,
    pub pagination: Pagination,
    pub stats: TaskStats,
}

/// Listing filters, all optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

/// Partial update. For `description` and `dueDate` an explicit null
/// clears the field while absence leaves it alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskBody {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,
}

/// Distinguish a missing key from an explicit null
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// ============================================================================
// Parsing helpers
// ============================================================================

fn parse_status(s: &str) -> Result<TaskStatus, FieldError> {
    s.parse()
        .map_err(|_| FieldError::new("status", "Status must be PENDING or COMPLETED"))
}

fn parse_priority(s: &str) -> Result<TaskPriority, FieldError> {
    s.parse()
        .map_err(|_| FieldError::new("priority", "Priority must be LOW, MEDIUM or HIGH"))
}

fn parse_due_date(s: &str) -> Result<DateTime<Utc>, FieldError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| FieldError::new("dueDate", "Due date must be an RFC 3339 timestamp"))
}

fn parse_sort(params: &ListParams) -> Result<(TaskSort, SortOrder), Vec<FieldError>> {
    let mut errors = Vec::new();

    let sort_by = match params.sort_by.as_deref() {
        None | Some("createdAt") => TaskSort::CreatedAt,
        Some("dueDate") => TaskSort::DueDate,
        Some("priority") => TaskSort::Priority,
        Some("title") => TaskSort::Title,
        Some(_) => {
            errors.push(FieldError::new(
                "sortBy",
                "Sort field must be createdAt, dueDate, priority or title",
            ));
            TaskSort::CreatedAt
        }
    };

    let sort_order = match params.sort_order.as_deref() {
        None | Some("desc") => SortOrder::Desc,
        Some("asc") => SortOrder::Asc,
        Some(_) => {
            errors.push(FieldError::new("sortOrder", "Sort order must be asc or desc"));
            SortOrder::Desc
        }
    };

    if errors.is_empty() {
        Ok((sort_by, sort_order))
    } else {
        Err(errors)
    }
}

fn build_query(params: ListParams) -> Result<TaskQuery, ApiError> {
    let mut errors = Vec::new();

    let status = match params.status.as_deref() {
        Some(s) => match parse_status(s) {
            Ok(status) => Some(status),
            Err(e) => {
                errors.push(e);
                None
            }
        },
        None => None,
    };

    let priority = match params.priority.as_deref() {
        Some(s) => match parse_priority(s) {
            Ok(priority) => Some(priority),
            Err(e) => {
                errors.push(e);
                None
            }
        },
        None => None,
    };

    let (sort_by, sort_order) = match parse_sort(&params) {
        Ok(sort) => sort,
        Err(mut sort_errors) => {
            errors.append(&mut sort_errors);
            (TaskSort::CreatedAt, SortOrder::Desc)
        }
    };

    validation::collect(errors)?;

    Ok(TaskQuery {
        status,
        priority,
        search: params.search.filter(|s| !s.trim().is_empty()),
        sort_by,
        sort_order,
        page: params.page.unwrap_or(1).max(1),
        limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ApiEnvelope<TaskListData>>> {
    let query = build_query(params)?;

    let (rows, total) = state.repos.tasks.list(auth_user.user_id.0, &query).await?;
    let counts = state
        .repos
        .tasks
        .count_by_status(auth_user.user_id.0)
        .await?;

    let tasks = rows
        .into_iter()
        .map(TaskDto::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let total_pages = if total == 0 {
        0
    } else {
        (total + query.limit - 1) / query.limit
    };

    Ok(Json(ApiEnvelope::data(TaskListData {
        tasks,
        pagination: Pagination {
            page: query.page,
            limit: query.limit,
            total,
            total_pages,
        },
        stats: TaskStats {
            total: counts.total,
            pending: counts.pending,
            completed: counts.completed,
        },
    })))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<TaskData>>> {
    let row = state
        .repos
        .tasks
        .find_by_id(auth_user.user_id.0, id)
        .await?
        .ok_or(ApiError::TaskNotFound)?;

    Ok(Json(ApiEnvelope::data(TaskData {
        task: row.try_into()?,
    })))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<CreateTaskBody>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = Vec::new();

    if let Err(e) = validation::validate_title(&body.title) {
        errors.push(e);
    }
    if let Err(e) = validation::validate_description(body.description.as_deref()) {
        errors.push(e);
    }

    let priority = match body.priority.as_deref() {
        Some(s) => match parse_priority(s) {
            Ok(priority) => priority,
            Err(e) => {
                errors.push(e);
                TaskPriority::Medium
            }
        },
        None => TaskPriority::Medium,
    };

    let due_date = match body.due_date.as_deref() {
        Some(s) => match parse_due_date(s) {
            Ok(dt) => Some(dt),
            Err(e) => {
                errors.push(e);
                None
            }
        },
        None => None,
    };

    validation::collect(errors)?;

    let row = state
        .repos
        .tasks
        .create(CreateTask {
            id: Uuid::new_v4(),
            user_id: auth_user.user_id.0,
            title: body.title.trim().to_string(),
            description: body.description,
            status: TaskStatus::Pending,
            priority,
            due_date,
        })
        .await?;

    tracing::debug!(task_id = %row.id, user_id = %auth_user.user_id, "task created");

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::with_message(
            "Task created successfully",
            TaskData {
                task: row.try_into()?,
            },
        )),
    ))
}

/// PATCH /api/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTaskBody>,
) -> ApiResult<Json<ApiEnvelope<TaskData>>> {
    let mut errors = Vec::new();
    let mut update = UpdateTask::default();

    if let Some(title) = body.title {
        match validation::validate_title(&title) {
            Ok(()) => update.title = Some(title.trim().to_string()),
            Err(e) => errors.push(e),
        }
    }

    if let Some(description) = body.description {
        match validation::validate_description(description.as_deref()) {
            Ok(()) => update.description = Some(description),
            Err(e) => errors.push(e),
        }
    }

    if let Some(status) = body.status.as_deref() {
        match parse_status(status) {
            Ok(status) => update.status = Some(status),
            Err(e) => errors.push(e),
        }
    }

    if let Some(priority) = body.priority.as_deref() {
        match parse_priority(priority) {
            Ok(priority) => update.priority = Some(priority),
            Err(e) => errors.push(e),
        }
    }

    if let Some(due_date) = body.due_date {
        match due_date.as_deref().map(parse_due_date).transpose() {
            Ok(dt) => update.due_date = Some(dt),
            Err(e) => errors.push(e),
        }
    }

    validation::collect(errors)?;

    let row = state
        .repos
        .tasks
        .update(auth_user.user_id.0, id, update)
        .await?
        .ok_or(ApiError::TaskNotFound)?;

    Ok(Json(ApiEnvelope::with_message(
        "Task updated successfully",
        TaskData {
            task: row.try_into()?,
        },
    )))
}

/// PATCH /api/tasks/:id/toggle
///
/// Flip the task between pending and completed
pub async fn toggle_task(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<TaskData>>> {
    let row = state
        .repos
        .tasks
        .find_by_id(auth_user.user_id.0, id)
        .await?
        .ok_or(ApiError::TaskNotFound)?;

    let toggled = row
        .status()
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .toggled();

    let update = UpdateTask {
        status: Some(toggled),
        ..Default::default()
    };

    let row = state
        .repos
        .tasks
        .update(auth_user.user_id.0, id, update)
        .await?
        .ok_or(ApiError::TaskNotFound)?;

    Ok(Json(ApiEnvelope::with_message(
        "Task updated successfully",
        TaskData {
            task: row.try_into()?,
        },
    )))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    let deleted = state.repos.tasks.delete(auth_user.user_id.0, id).await?;

    if !deleted {
        return Err(ApiError::TaskNotFound);
    }

    Ok(Json(ApiEnvelope::message("Task deleted successfully")))
}
