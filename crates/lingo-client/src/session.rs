//! Session-scoped client state.
//!
//! One explicit [`Session`] object replaces ambient per-component caches:
//! the signed-in user, the known-user map, and per-counterparty message and
//! task caches all live here, rebuilt from server responses and never
//! treated as source of truth beyond the active session.
//!
//! Mutations follow a two-phase pattern.  Message sends and task edits
//! apply locally first and enqueue a [`WriteIntent`] for the caller to
//! flush; a failed flush is logged and the intent retained for inspection,
//! so the UI never blocks on the network.  Account mutations are the
//! opposite: confirm-first, local state only changes after the server (or
//! the local fallback set) accepts.

use std::collections::{BTreeMap, VecDeque};

use chrono::Utc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use lingo_shared::projection::contact_list;
use lingo_shared::{Contact, Message, Task, User, UserPublic};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("not signed in")]
    NotSignedIn,

    #[error("username already exists: {0}")]
    DuplicateUser(String),

    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// Deleting the account you are signed in as is forbidden.
    #[error("cannot delete the signed-in account")]
    SelfDelete,
}

/// A durable write the server still owes us, captured when the local state
/// was updated optimistically.
#[derive(Debug, Clone)]
pub enum WriteIntent {
    SaveMessage {
        user_id: String,
        counterparty_id: String,
        message: Message,
    },
    /// Full-state task snapshot; the server replaces, never merges.
    ReplaceTasks {
        user_id: String,
        tasks: BTreeMap<String, Vec<Task>>,
    },
}

#[derive(Default)]
pub struct Session {
    current_user: Option<UserPublic>,
    users: BTreeMap<String, User>,
    /// Message cache keyed by counterparty id.
    messages: BTreeMap<String, Vec<Message>>,
    /// Task cache keyed by counterparty id.
    tasks: BTreeMap<String, Vec<Task>>,
    pending: VecDeque<WriteIntent>,
    failed: Vec<WriteIntent>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known user set (server response or the offline
    /// fallback set).
    pub fn with_users(users: BTreeMap<String, User>) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    // ── Auth ──

    /// Authenticate against the in-memory user set (offline/local mode).
    pub fn login_local(&mut self, username: &str, password: &str) -> Result<&UserPublic, SessionError> {
        let user = self
            .users
            .get(username)
            .filter(|u| u.password == password)
            .ok_or(SessionError::InvalidCredentials)?;

        Ok(self.current_user.insert(user.public()))
    }

    /// Adopt a server-authenticated user (or one restored from prefs).
    pub fn sign_in(&mut self, user: UserPublic) {
        self.current_user = Some(user);
    }

    pub fn logout(&mut self) {
        self.current_user = None;
        self.messages.clear();
        self.tasks.clear();
        self.pending.clear();
        self.failed.clear();
    }

    pub fn current_user(&self) -> Option<&UserPublic> {
        self.current_user.as_ref()
    }

    // ── State loading ──

    pub fn set_users(&mut self, users: BTreeMap<String, User>) {
        self.users = users;
    }

    pub fn users(&self) -> &BTreeMap<String, User> {
        &self.users
    }

    /// Find a known user by their row identifier (as opposed to username).
    pub fn user_by_id(&self, id: &str) -> Option<&User> {
        self.users.values().find(|u| u.id == id)
    }

    pub fn load_messages(&mut self, messages: BTreeMap<String, Vec<Message>>) {
        self.messages = messages;
    }

    pub fn load_tasks(&mut self, tasks: BTreeMap<String, Vec<Task>>) {
        self.tasks = tasks;
    }

    pub fn messages_with(&self, counterparty_id: &str) -> &[Message] {
        self.messages
            .get(counterparty_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn tasks_with(&self, counterparty_id: &str) -> &[Task] {
        self.tasks
            .get(counterparty_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every other known user as a friend-list entry, with a last-message
    /// preview from the cached threads.
    pub fn contacts(&self) -> Vec<Contact> {
        let Some(ref me) = self.current_user else {
            return Vec::new();
        };

        let mut previews = BTreeMap::new();
        for (counterparty, thread) in &self.messages {
            if let Some(last) = thread.last() {
                previews.insert(counterparty.clone(), last.clone());
            }
        }
        contact_list(&me.username, &self.users, &previews)
    }

    // ── Optimistic mutations (messages / tasks) ──

    /// Append a composed message to the local thread and queue the server
    /// write.
    pub fn append_message(
        &mut self,
        counterparty_id: &str,
        message: Message,
    ) -> Result<(), SessionError> {
        let me = self.current_user.as_ref().ok_or(SessionError::NotSignedIn)?;
        let user_id = me.id.clone();

        self.messages
            .entry(counterparty_id.to_string())
            .or_default()
            .push(message.clone());

        self.pending.push_back(WriteIntent::SaveMessage {
            user_id,
            counterparty_id: counterparty_id.to_string(),
            message,
        });
        Ok(())
    }

    /// Create a task for a counterparty and queue the full-state write.
    pub fn add_task(&mut self, counterparty_id: &str, text: &str) -> Result<Task, SessionError> {
        if self.current_user.is_none() {
            return Err(SessionError::NotSignedIn);
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            text: text.trim().to_string(),
            completed: false,
            timestamp: Utc::now(),
        };
        self.tasks
            .entry(counterparty_id.to_string())
            .or_default()
            .push(task.clone());

        self.queue_task_snapshot()?;
        Ok(task)
    }

    pub fn toggle_task(&mut self, counterparty_id: &str, task_id: &str) -> Result<(), SessionError> {
        if let Some(list) = self.tasks.get_mut(counterparty_id) {
            if let Some(task) = list.iter_mut().find(|t| t.id == task_id) {
                task.completed = !task.completed;
            }
        }
        self.queue_task_snapshot()
    }

    pub fn remove_task(&mut self, counterparty_id: &str, task_id: &str) -> Result<(), SessionError> {
        if let Some(list) = self.tasks.get_mut(counterparty_id) {
            list.retain(|t| t.id != task_id);
        }
        self.queue_task_snapshot()
    }

    fn queue_task_snapshot(&mut self) -> Result<(), SessionError> {
        let me = self.current_user.as_ref().ok_or(SessionError::NotSignedIn)?;
        self.pending.push_back(WriteIntent::ReplaceTasks {
            user_id: me.id.clone(),
            tasks: self.tasks.clone(),
        });
        Ok(())
    }

    // ── Confirm-first account mutations ──
    //
    // Callers run the server call first and apply these only on success;
    // in offline mode they apply directly against the fallback set.

    pub fn add_user(&mut self, user: User) -> Result<(), SessionError> {
        if self.users.contains_key(&user.username) {
            return Err(SessionError::DuplicateUser(user.username));
        }
        self.users.insert(user.username.clone(), user);
        Ok(())
    }

    /// Remove an account locally.  Deleting the signed-in account is
    /// rejected and leaves the user set untouched.
    pub fn remove_user(&mut self, username: &str) -> Result<(), SessionError> {
        if self.current_user.as_ref().map(|u| u.username.as_str()) == Some(username) {
            return Err(SessionError::SelfDelete);
        }
        self.users
            .remove(username)
            .map(|_| ())
            .ok_or_else(|| SessionError::UnknownUser(username.to_string()))
    }

    pub fn update_user_password(
        &mut self,
        username: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        let user = self
            .users
            .get_mut(username)
            .ok_or_else(|| SessionError::UnknownUser(username.to_string()))?;
        user.password = new_password.to_string();
        Ok(())
    }

    // ── Write intents ──

    /// Take the queued writes; the caller executes them (see
    /// `ApiClient::flush`).
    pub fn drain_intents(&mut self) -> Vec<WriteIntent> {
        self.pending.drain(..).collect()
    }

    /// Record a write that the server refused or never received.  The
    /// optimistic local state stands; the intent stays inspectable.
    pub fn record_failure(&mut self, intent: WriteIntent) {
        warn!("persistence write failed; local state kept");
        self.failed.push(intent);
    }

    pub fn failed_intents(&self) -> &[WriteIntent] {
        &self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::fallback_users;
    use lingo_shared::MessageRole;

    fn signed_in_session(username: &str) -> Session {
        let mut session = Session::with_users(fallback_users());
        session.login_local(username, "1234").unwrap();
        session
    }

    fn message(id: &str, text: &str, sender: &str) -> Message {
        Message {
            id: id.into(),
            role: MessageRole::User,
            text: text.into(),
            translated_text: None,
            timestamp: Utc::now(),
            sender_id: Some(sender.into()),
            sender_name: None,
            is_error: false,
        }
    }

    #[test]
    fn local_login_against_fallback_set() {
        let mut session = Session::with_users(fallback_users());

        assert_eq!(
            session.login_local("admin", "wrong").unwrap_err(),
            SessionError::InvalidCredentials
        );
        assert!(session.current_user().is_none());

        let user = session.login_local("admin", "1234").unwrap();
        assert_eq!(user.username, "admin");
    }

    #[test]
    fn self_delete_is_rejected_and_account_survives() {
        let mut session = signed_in_session("admin");

        assert_eq!(
            session.remove_user("admin").unwrap_err(),
            SessionError::SelfDelete
        );
        assert!(session.users().contains_key("admin"));

        // Other accounts delete fine.
        session.remove_user("user").unwrap();
        assert!(!session.users().contains_key("user"));
    }

    #[test]
    fn duplicate_user_rejected_locally() {
        let mut session = signed_in_session("admin");
        let existing = session.users()["user"].clone();

        let mut clone = existing.clone();
        clone.name = "Impostor".into();
        assert_eq!(
            session.add_user(clone).unwrap_err(),
            SessionError::DuplicateUser("user".into())
        );
        assert_eq!(session.users()["user"].name, existing.name);
    }

    #[test]
    fn append_message_updates_cache_and_queues_intent() {
        let mut session = signed_in_session("admin");
        session
            .append_message("user1", message("m1", "hi", "admin1"))
            .unwrap();

        assert_eq!(session.messages_with("user1").len(), 1);

        let intents = session.drain_intents();
        assert_eq!(intents.len(), 1);
        assert!(matches!(
            &intents[0],
            WriteIntent::SaveMessage { user_id, counterparty_id, .. }
                if user_id == "admin1" && counterparty_id == "user1"
        ));
        assert!(session.drain_intents().is_empty());
    }

    #[test]
    fn task_edits_queue_full_state_snapshots() {
        let mut session = signed_in_session("admin");

        let task_id = session.add_task("user1", "  review  ").unwrap().id.clone();
        assert_eq!(session.tasks_with("user1")[0].text, "review");

        session.toggle_task("user1", &task_id).unwrap();
        assert!(session.tasks_with("user1")[0].completed);

        session.remove_task("user1", &task_id).unwrap();
        assert!(session.tasks_with("user1").is_empty());

        // Three snapshots, one per edit; the last reflects the empty state.
        let intents = session.drain_intents();
        assert_eq!(intents.len(), 3);
        match &intents[2] {
            WriteIntent::ReplaceTasks { tasks, .. } => {
                assert!(tasks.get("user1").map(|l| l.is_empty()).unwrap_or(true));
            }
            other => panic!("expected task snapshot, got {other:?}"),
        }
    }

    #[test]
    fn failed_intents_stay_inspectable() {
        let mut session = signed_in_session("admin");
        session
            .append_message("user1", message("m1", "hi", "admin1"))
            .unwrap();

        let intent = session.drain_intents().remove(0);
        session.record_failure(intent);

        // Local state untouched by the failure.
        assert_eq!(session.messages_with("user1").len(), 1);
        assert_eq!(session.failed_intents().len(), 1);
    }

    #[test]
    fn contacts_exclude_self_and_carry_previews() {
        let mut session = signed_in_session("admin");
        session
            .append_message("user1", message("m1", "hello there", "admin1"))
            .unwrap();

        let contacts = session.contacts();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, "user1");
        assert_eq!(contacts[0].last_message.as_deref(), Some("hello there"));
    }

    #[test]
    fn logout_clears_session_state() {
        let mut session = signed_in_session("admin");
        session
            .append_message("user1", message("m1", "hi", "admin1"))
            .unwrap();

        session.logout();
        assert!(session.current_user().is_none());
        assert!(session.messages_with("user1").is_empty());
        assert!(session.drain_intents().is_empty());
    }
}
