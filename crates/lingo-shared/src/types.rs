//! Domain model structs exchanged between client, server, and store.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so the same shape travels over the REST API and into SQLite helper
//! code unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Account privilege level.
///
/// An explicit attribute rather than a magic username: admin-only operations
/// check this enum, never the literal string `"admin"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Member,
}

/// A full account record, including the credential secret.
///
/// This shape only exists server-side and in the client's account-admin
/// paths; anything rendered for other users goes through [`User::public`]
/// first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique login name, primary key.
    pub username: String,
    /// Stable identifier used in message/task rows (distinct from username).
    pub id: String,
    /// Credential secret, stored as-is.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Free-form status line.
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    /// Locale key, e.g. `"Korea"` or `"USA"`.  Drives translation targeting.
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    /// The same account with the secret stripped.
    pub fn public(&self) -> UserPublic {
        UserPublic {
            username: self.username.clone(),
            id: self.id.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            status_message: self.status_message.clone(),
            gender: self.gender.clone(),
            age: self.age,
            nationality: self.nationality.clone(),
            role: self.role,
        }
    }
}

/// An account as rendered to other users: everything except the secret.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub username: String,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// A person typed it.
    User,
    /// Produced by the system / language model.
    Model,
}

/// A single chat message carrying both text renditions.
///
/// `text` is what the author wrote; `translated_text` is the localized
/// rendition for a differing-locale recipient.  When no translation applies
/// (same locale, or the translation call failed) the stored translated text
/// falls back to the original, so [`Message::translated`] is never empty for
/// a non-empty message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    /// Original, authored-language text.
    pub text: String,
    /// Localized rendition; `None` means "fall back to `text`".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Identifier of the true sender.  Defaults to the acting user when the
    /// store persists the row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    /// Display name override for multi-party attribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    /// The translated rendition, falling back to the original text whenever
    /// no distinct (non-empty) translation is present.
    pub fn translated(&self) -> &str {
        match self.translated_text.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => &self.text,
        }
    }

    /// Reject malformed payloads before any write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingId);
        }
        if self.text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One checklist entry shared with a counterparty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Contact (derived, never persisted)
// ---------------------------------------------------------------------------

/// A friend-list entry projected from another user's account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Status line shown under the name.
    #[serde(default)]
    pub description: Option<String>,
    /// Preview of the most recent message exchanged, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(text: &str) -> Message {
        Message {
            id: "m1".into(),
            role: MessageRole::User,
            text: text.into(),
            translated_text: None,
            timestamp: Utc::now(),
            sender_id: Some("u1".into()),
            sender_name: None,
            is_error: false,
        }
    }

    #[test]
    fn translated_falls_back_to_original() {
        let mut msg = message("안녕");
        assert_eq!(msg.translated(), "안녕");

        msg.translated_text = Some(String::new());
        assert_eq!(msg.translated(), "안녕");

        msg.translated_text = Some("Hello".into());
        assert_eq!(msg.translated(), "Hello");
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut msg = message("hi");
        msg.id = "  ".into();
        assert_eq!(msg.validate(), Err(ValidationError::MissingId));

        let mut msg = message("hi");
        msg.text = String::new();
        assert_eq!(msg.validate(), Err(ValidationError::EmptyText));

        assert!(message("hi").validate().is_ok());
    }

    #[test]
    fn public_strips_secret() {
        let user = User {
            username: "kim".into(),
            id: "kim1".into(),
            password: "1234".into(),
            name: "Kim".into(),
            avatar: None,
            status_message: None,
            gender: None,
            age: Some(25),
            nationality: Some("Korea".into()),
            role: UserRole::Member,
        };
        let public = user.public();
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("1234"));
        assert!(json.contains("\"nationality\":\"Korea\""));
    }

    #[test]
    fn role_defaults_to_member_when_absent() {
        let json = r#"{"username":"a","id":"a1","password":"x","name":"A"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, UserRole::Member);
    }
}
