//! Task API client with transparent access token renewal

use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use taskvault_types::{PublicUser, TaskPriority, TaskStatus};

use crate::{ClientConfig, ClientError, SessionContext};

/// Task API client.
///
/// Holds a cookie jar for the refresh token and a [`SessionContext`]
/// for the access token. Any request that comes back 401 triggers a
/// single refresh attempt before the original request is resent
/// unchanged.
pub struct TaskClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: SessionContext,
}

/// Response envelope used by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)]
    success: bool,
    message: Option<String>,
    code: Option<String>,
    data: Option<T>,
}

/// Auth payload returned by register, login and refresh
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthData {
    user: PublicUser,
    access_token: String,
}

/// Task as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Page metadata for task listings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Per-status counts for a user's tasks
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
}

/// A page of tasks with pagination and stats
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub tasks: Vec<TaskDto>,
    pub pagination: Pagination,
    pub stats: TaskStats,
}

/// Input for creating a task
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Input for a partial task update
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl TaskClient {
    /// Create a new client with a fresh, unpersisted session
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_session(config, SessionContext::new())
    }

    /// Create a client around an existing session context, e.g. one
    /// restored from a [`SessionStore`](crate::SessionStore).
    pub fn with_session(
        config: ClientConfig,
        session: SessionContext,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            session,
        })
    }

    /// The shared session state
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register a new account.
    ///
    /// Registration does not open a session; call [`login`](Self::login)
    /// afterwards.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<PublicUser, ClientError> {
        #[derive(Deserialize)]
        struct UserData {
            user: PublicUser,
        }

        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&RegisterRequest {
                email,
                password,
                name,
            })
            .send()
            .await?;

        let data: UserData = Self::take_data(parse_envelope(response).await?)?;
        Ok(data.user)
    }

    /// Log in and start a session
    pub async fn login(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        self.adopt_auth_data(response).await
    }

    /// Log out, invalidating the refresh token server-side
    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.url("/api/auth/logout")).send().await?;

        self.session.clear();
        parse_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Fetch the data payload out of a successful envelope
    fn take_data<T>(envelope: Envelope<T>) -> Result<T, ClientError> {
        envelope
            .data
            .ok_or_else(|| ClientError::UnexpectedResponse("missing data field".to_string()))
    }

    /// Fetch the current user's profile
    pub async fn me(&self) -> Result<PublicUser, ClientError> {
        #[derive(Deserialize)]
        struct UserData {
            user: PublicUser,
        }

        let data: UserData =
            Self::take_data(self.request(Method::GET, "/api/auth/me", None).await?)?;
        Ok(data.user)
    }

    /// Cache the token and user from an auth response
    async fn adopt_auth_data(&self, response: reqwest::Response) -> Result<PublicUser, ClientError> {
        let data: AuthData = Self::take_data(parse_envelope(response).await?)?;
        self.session.set_access_token(&data.access_token);
        self.session.set_user(data.user.clone());
        Ok(data.user)
    }

    /// Renew the access token with the refresh token cookie.
    ///
    /// On failure the session is cleared; the caller must log in again.
    async fn refresh(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.url("/api/auth/refresh")).send().await?;

        match parse_envelope::<AuthData>(response)
            .await
            .and_then(Self::take_data)
        {
            Ok(data) => {
                tracing::debug!("access token renewed");
                self.session.set_access_token(&data.access_token);
                self.session.set_user(data.user);
                Ok(())
            }
            Err(e) => {
                tracing::debug!("refresh failed: {}", e);
                self.session.clear();
                Err(ClientError::SessionExpired)
            }
        }
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// List tasks. `query` is a raw query string like
    /// `status=PENDING&page=2`; pass "" for defaults.
    pub async fn list_tasks(&self, query: &str) -> Result<TaskList, ClientError> {
        let path = if query.is_empty() {
            "/api/tasks".to_string()
        } else {
            format!("/api/tasks?{query}")
        };
        Self::take_data(self.request(Method::GET, &path, None).await?)
    }

    /// Fetch one task
    pub async fn get_task(&self, id: &str) -> Result<TaskDto, ClientError> {
        self.task_data(Method::GET, &format!("/api/tasks/{id}"), None)
            .await
    }

    /// Create a task
    pub async fn create_task(&self, task: &CreateTaskRequest) -> Result<TaskDto, ClientError> {
        let body = serde_json::to_value(task)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        self.task_data(Method::POST, "/api/tasks", Some(body)).await
    }

    /// Update a task
    pub async fn update_task(
        &self,
        id: &str,
        update: &UpdateTaskRequest,
    ) -> Result<TaskDto, ClientError> {
        let body = serde_json::to_value(update)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        self.task_data(Method::PATCH, &format!("/api/tasks/{id}"), Some(body))
            .await
    }

    /// Flip a task between pending and completed
    pub async fn toggle_task(&self, id: &str) -> Result<TaskDto, ClientError> {
        self.task_data(Method::PATCH, &format!("/api/tasks/{id}/toggle"), None)
            .await
    }

    /// Toggle a task with an optimistic local update.
    ///
    /// The flip is applied to `list` before the request goes out. On
    /// success the server's row replaces the speculative one; on any
    /// error the list is rolled back to its prior state before the
    /// error is returned.
    pub async fn toggle_task_optimistic(
        &self,
        list: &crate::OptimisticTaskList,
        id: &str,
    ) -> Result<TaskDto, ClientError> {
        let mutation = list.apply(id, |t| t.status = t.status.toggled());

        match self.toggle_task(id).await {
            Ok(task) => {
                if let Some(mutation) = mutation {
                    list.commit(mutation, task.clone());
                }
                Ok(task)
            }
            Err(e) => {
                if let Some(mutation) = mutation {
                    list.roll_back(mutation);
                }
                Err(e)
            }
        }
    }

    /// Delete a task
    pub async fn delete_task(&self, id: &str) -> Result<(), ClientError> {
        let _: Envelope<serde_json::Value> = self
            .request(Method::DELETE, &format!("/api/tasks/{id}"), None)
            .await?;
        Ok(())
    }

    async fn task_data(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<TaskDto, ClientError> {
        #[derive(Deserialize)]
        struct TaskData {
            task: TaskDto,
        }

        let data: TaskData = Self::take_data(self.request(method, path, body).await?)?;
        Ok(data.task)
    }

    // =========================================================================
    // Renewal interceptor
    // =========================================================================

    /// Send an authenticated request, renewing the access token once on 401.
    ///
    /// The request is rebuilt from scratch for the resend, so method,
    /// path and body are identical both times. A second 401 is returned
    /// to the caller as-is; there is no renewal loop.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Envelope<T>, ClientError> {
        let response = self.send_once(method.clone(), path, body.as_ref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return parse_envelope(response).await;
        }

        // Drain the 401 body before retrying
        let _ = response.bytes().await;

        self.refresh().await?;

        let response = self.send_once(method, path, body.as_ref()).await?;
        parse_envelope(response).await
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self.http.request(method, self.url(path));

        if let Some(token) = self.session.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

impl std::fmt::Debug for TaskClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Decode a response envelope, mapping error bodies to [`ClientError`]
async fn parse_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Envelope<T>, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        return serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()));
    }

    let envelope: Envelope<serde_json::Value> = serde_json::from_slice(&bytes)
        .unwrap_or(Envelope {
            success: false,
            message: None,
            code: None,
            data: None,
        });
    let message = envelope
        .message
        .unwrap_or_else(|| format!("http status {status}"));

    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthenticated(message));
    }

    Err(ClientError::Api {
        status: status.as_u16(),
        code: envelope.code,
        message,
    })
}
