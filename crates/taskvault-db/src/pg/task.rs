//! PostgreSQL task repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::TaskRow;
use crate::repo::{CreateTask, TaskCounts, TaskQuery, TaskRepository, UpdateTask};

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, priority, due_date, created_at, updated_at";

/// PostgreSQL task repository
#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    /// Create a new task repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the WHERE clause shared by the list and count queries.
///
/// Every user-supplied value goes through push_bind; only whitelisted
/// keywords are pushed as raw SQL.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, query: &TaskQuery) {
    builder.push(" WHERE user_id = ");
    builder.push_bind(user_id);

    if let Some(status) = query.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }

    if let Some(priority) = query.priority {
        builder.push(" AND priority = ");
        builder.push_bind(priority.as_str());
    }

    if let Some(search) = &query.search {
        let pattern = format!("%{search}%");
        builder.push(" AND (title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR description ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> DbResult<Option<TaskRow>> {
        let task = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, user_id, title, description, status, priority,
                   due_date, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list(&self, user_id: Uuid, query: &TaskQuery) -> DbResult<(Vec<TaskRow>, i64)> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
        push_filters(&mut builder, user_id, query);

        builder.push(" ORDER BY ");
        builder.push(query.sort_by.column());
        builder.push(" ");
        builder.push(query.sort_order.keyword());

        builder.push(" LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset());

        let rows = builder
            .build_query_as::<TaskRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM tasks");
        push_filters(&mut count_builder, user_id, query);

        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn count_by_status(&self, user_id: Uuid) -> DbResult<TaskCounts> {
        let counts = sqlx::query_as::<_, TaskCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'PENDING') AS pending,
                   COUNT(*) FILTER (WHERE status = 'COMPLETED') AS completed
            FROM tasks
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn create(&self, task: CreateTask) -> DbResult<TaskRow> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (id, user_id, title, description, status, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, title, description, status, priority,
                      due_date, created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: UpdateTask,
    ) -> DbResult<Option<TaskRow>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = update.title {
            builder.push(", title = ");
            builder.push_bind(title);
        }
        if let Some(description) = update.description {
            builder.push(", description = ");
            builder.push_bind(description);
        }
        if let Some(status) = update.status {
            builder.push(", status = ");
            builder.push_bind(status.as_str());
        }
        if let Some(priority) = update.priority {
            builder.push(", priority = ");
            builder.push_bind(priority.as_str());
        }
        if let Some(due_date) = update.due_date {
            builder.push(", due_date = ");
            builder.push_bind(due_date);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" AND user_id = ");
        builder.push_bind(user_id);
        builder.push(format!(" RETURNING {TASK_COLUMNS}"));

        let row = builder
            .build_query_as::<TaskRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
