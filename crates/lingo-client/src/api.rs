//! REST client for the Lingo server.
//!
//! One thin method per endpoint; error bodies are decoded into
//! [`ApiError::Server`] with the server's human-readable reason.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use lingo_shared::{Message, Task, User, UserPublic};

use crate::error::ApiError;
use crate::session::{Session, WriteIntent};

/// Timeout for the liveness probe used by [`ApiClient::test_connection`].
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Normalize a user-configured server address into an API base URL.
///
/// Bare `host:port` gets an `http://` scheme; full URLs pass through with a
/// trailing slash trimmed.  The `/api` prefix is appended either way.
pub fn api_base(address: &str) -> String {
    let base = if address.starts_with("http://") || address.starts_with("https://") {
        address.trim_end_matches('/').to_string()
    } else {
        format!("http://{address}")
    };
    format!("{base}/api")
}

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    user: UserPublic,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl ApiClient {
    pub fn new(address: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: api_base(address),
        }
    }

    /// Probe `/health`, bounded by a fixed timeout.  Never errors: an
    /// unreachable server is simply "not connected".
    pub async fn test_connection(&self) -> bool {
        self.http
            .get(format!("{}/health", self.base))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<UserPublic, ApiError> {
        let response = self
            .http
            .post(format!("{}/login", self.base))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        let body: LoginResponse = Self::check(response).await?.json().await?;
        Ok(body.user)
    }

    pub async fn list_users(&self) -> Result<BTreeMap<String, User>, ApiError> {
        let response = self.http.get(format!("{}/users", self.base)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn add_user(&self, user: &User) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/users", self.base))
            .json(user)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn delete_user(&self, username: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(format!("{}/users/{username}", self.base))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn update_password(
        &self,
        username: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .patch(format!("{}/users/{username}/password", self.base))
            .json(&serde_json::json!({ "newPassword": new_password }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn messages_for_user(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<String, Vec<Message>>, ApiError> {
        let response = self
            .http
            .get(format!("{}/messages/{user_id}", self.base))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn thread(
        &self,
        user_id: &str,
        counterparty_id: &str,
    ) -> Result<Vec<Message>, ApiError> {
        let response = self
            .http
            .get(format!("{}/messages/{user_id}/{counterparty_id}", self.base))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn save_message(
        &self,
        user_id: &str,
        counterparty_id: &str,
        message: &Message,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/messages/{user_id}/{counterparty_id}", self.base))
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn replace_thread(
        &self,
        user_id: &str,
        counterparty_id: &str,
        messages: &[Message],
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .put(format!("{}/messages/{user_id}/{counterparty_id}", self.base))
            .json(&serde_json::json!({ "messages": messages }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn tasks_for_user(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<String, Vec<Task>>, ApiError> {
        let response = self
            .http
            .get(format!("{}/tasks/{user_id}", self.base))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn replace_tasks(
        &self,
        user_id: &str,
        tasks: &BTreeMap<String, Vec<Task>>,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .put(format!("{}/tasks/{user_id}", self.base))
            .json(&serde_json::json!({ "tasks": tasks }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Refresh the session from the server: the full user map always, plus
    /// the signed-in user's messages and tasks.
    pub async fn load_remote_state(&self, session: &mut Session) -> Result<(), ApiError> {
        let users = self.list_users().await?;
        session.set_users(users);

        if let Some(user_id) = session.current_user().map(|u| u.id.clone()) {
            session.load_messages(self.messages_for_user(&user_id).await?);
            session.load_tasks(self.tasks_for_user(&user_id).await?);
        }
        Ok(())
    }

    /// Execute the session's queued write intents.
    ///
    /// The local state is already updated; a failed write is logged and
    /// retained on the session for inspection, never surfaced as an error.
    pub async fn flush(&self, session: &mut Session) {
        for intent in session.drain_intents() {
            let result = match &intent {
                WriteIntent::SaveMessage {
                    user_id,
                    counterparty_id,
                    message,
                } => self.save_message(user_id, counterparty_id, message).await,
                WriteIntent::ReplaceTasks { user_id, tasks } => {
                    self.replace_tasks(user_id, tasks).await
                }
            };

            match result {
                Ok(()) => info!("write intent flushed"),
                Err(e) => {
                    warn!(error = %e, "write intent failed, keeping local state");
                    session.record_failure(intent);
                }
            }
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| "request failed".to_string());

        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_adds_scheme_to_bare_addresses() {
        assert_eq!(api_base("localhost:3001"), "http://localhost:3001/api");
        assert_eq!(api_base("192.168.0.7:3001"), "http://192.168.0.7:3001/api");
    }

    #[test]
    fn api_base_keeps_full_urls() {
        assert_eq!(
            api_base("https://lingo.example.com"),
            "https://lingo.example.com/api"
        );
        assert_eq!(
            api_base("http://localhost:3001/"),
            "http://localhost:3001/api"
        );
    }

    #[tokio::test]
    async fn test_connection_false_when_unreachable() {
        let client = ApiClient::new("127.0.0.1:1");
        assert!(!client.test_connection().await);
    }
}
