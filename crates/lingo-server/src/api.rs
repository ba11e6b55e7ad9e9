use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::Method,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use lingo_shared::{Message, Task, User, UserPublic, UserRole};
use lingo_store::Database;

use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/login", post(login))
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/:username", delete(delete_user))
        .route("/users/:username/password", patch(update_password))
        .route("/messages/:user_id", get(get_messages))
        .route("/messages/:user_id/:counterparty_id", get(get_thread))
        .route("/messages/:user_id/:counterparty_id", post(save_message))
        .route("/messages/:user_id/:counterparty_id", put(replace_thread))
        .route("/tasks/:user_id", get(get_tasks))
        .route("/tasks/:user_id", put(replace_tasks));

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl AppState {
    fn db(&self) -> Result<std::sync::MutexGuard<'_, Database>, ServerError> {
        self.db
            .lock()
            .map_err(|e| ServerError::Internal(format!("Lock poisoned: {e}")))
    }
}

fn success() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true }))
}

// ─── Health ───

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
    })
}

// ─── Auth ───

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    user: UserPublic,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = {
        let db = state.db()?;
        db.get_user(&req.username)
    };

    match user {
        Ok(ref user) if user.password == req.password => {
            info!(username = %req.username, "login succeeded");
            Ok(Json(LoginResponse {
                success: true,
                user: user.public(),
            }))
        }
        _ => Err(ServerError::Unauthorized(
            "Invalid username or password".into(),
        )),
    }
}

// ─── Users ───

async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, User>>, ServerError> {
    let users = state.db()?.list_users()?;
    Ok(Json(users))
}

async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if user.username.trim().is_empty() {
        return Err(ServerError::BadRequest("username must not be empty".into()));
    }

    state.db()?.insert_user(&user)?;

    info!(username = %user.username, "user created");
    Ok(success())
}

/// Delete is immediate and unconditional, except that removing the last
/// remaining admin account is refused.
async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let db = state.db()?;

    match db.get_user(&username) {
        Ok(user) => {
            if user.role == UserRole::Admin && db.count_admins()? <= 1 {
                return Err(ServerError::BadRequest(
                    "cannot delete the last admin account".into(),
                ));
            }
            db.delete_user(&username)?;
            info!(username = %username, "user deleted");
        }
        // Deleting a missing account is a no-op, not an error.
        Err(lingo_store::StoreError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(success())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePasswordRequest {
    new_password: String,
}

async fn update_password(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state.db()?.update_password(&username, &req.new_password)?;
    info!(username = %username, "password changed");
    Ok(success())
}

// ─── Messages ───

async fn get_messages(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BTreeMap<String, Vec<Message>>>, ServerError> {
    let grouped = state.db()?.messages_for_user(&user_id)?;
    Ok(Json(grouped))
}

async fn get_thread(
    State(state): State<AppState>,
    Path((user_id, counterparty_id)): Path<(String, String)>,
) -> Result<Json<Vec<Message>>, ServerError> {
    let key = lingo_shared::conversation_key(&user_id, &counterparty_id);
    let messages = state.db()?.messages_for_thread(&key)?;
    Ok(Json(messages))
}

#[derive(Deserialize)]
struct SaveMessageRequest {
    message: Message,
}

async fn save_message(
    State(state): State<AppState>,
    Path((user_id, counterparty_id)): Path<(String, String)>,
    Json(req): Json<SaveMessageRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state
        .db()?
        .save_message(&user_id, &counterparty_id, &req.message)?;
    Ok(success())
}

#[derive(Deserialize)]
struct ReplaceThreadRequest {
    messages: Vec<Message>,
}

async fn replace_thread(
    State(state): State<AppState>,
    Path((user_id, counterparty_id)): Path<(String, String)>,
    Json(req): Json<ReplaceThreadRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state
        .db()?
        .replace_thread(&user_id, &counterparty_id, &req.messages)?;
    Ok(success())
}

// ─── Tasks ───

async fn get_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BTreeMap<String, Vec<Task>>>, ServerError> {
    let grouped = state.db()?.tasks_for_user(&user_id)?;
    Ok(Json(grouped))
}

#[derive(Deserialize)]
struct ReplaceTasksRequest {
    tasks: BTreeMap<String, Vec<Task>>,
}

async fn replace_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<ReplaceTasksRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state.db()?.replace_tasks_for_user(&user_id, &req.tasks)?;
    Ok(success())
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
