//! Outgoing-message composition.
//!
//! Builds the dual-text record the store expects: the original text plus a
//! translated rendition for the recipient.  Translation is skipped when
//! both parties share a locale, and any adapter failure falls back to the
//! original text, so composition never fails.

use chrono::Utc;
use uuid::Uuid;

use lingo_shared::{Message, MessageRole, UserPublic};
use lingo_translate::{TranslationRequest, Translator};

/// Compose a user-authored message from `sender` to `recipient`,
/// translating for the recipient's locale when it differs from the
/// sender's.
pub async fn compose_outgoing(
    sender: &UserPublic,
    recipient: &UserPublic,
    text: &str,
    translator: &Translator,
) -> Message {
    let translated_text = if recipient.nationality != sender.nationality {
        let request = TranslationRequest {
            text: text.to_string(),
            target_nationality: recipient
                .nationality
                .clone()
                .unwrap_or_else(|| "Korea".to_string()),
            target_gender: recipient.gender.clone().unwrap_or_else(|| "male".to_string()),
            target_age: recipient.age.unwrap_or(25),
            sender_name: sender.name.clone(),
        };
        translator.translate(&request).await
    } else {
        text.to_string()
    };

    Message {
        id: Uuid::new_v4().to_string(),
        role: MessageRole::User,
        text: text.to_string(),
        translated_text: Some(translated_text),
        timestamp: Utc::now(),
        sender_id: Some(sender.id.clone()),
        sender_name: Some(sender.name.clone()),
        is_error: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_shared::projection::display_text;
    use lingo_shared::UserRole;

    fn user(id: &str, name: &str, nationality: &str) -> UserPublic {
        UserPublic {
            username: id.trim_end_matches('1').to_string(),
            id: id.into(),
            name: name.into(),
            avatar: None,
            status_message: None,
            gender: Some("female".into()),
            age: Some(28),
            nationality: Some(nationality.into()),
            role: UserRole::Member,
        }
    }

    fn unreachable_translator() -> Translator {
        Translator::with_base_url("test-key", "http://127.0.0.1:1")
    }

    #[tokio::test]
    async fn same_locale_skips_translation() {
        let kim = user("kim1", "Kim", "Korea");
        let lee = user("lee1", "Lee", "Korea");

        // The unreachable adapter would fall back anyway, but same-locale
        // sends never reach it.
        let msg = compose_outgoing(&kim, &lee, "안녕", &unreachable_translator()).await;
        assert_eq!(msg.text, "안녕");
        assert_eq!(msg.translated_text.as_deref(), Some("안녕"));
        assert_eq!(msg.sender_id.as_deref(), Some("kim1"));
    }

    #[tokio::test]
    async fn translation_failure_still_delivers_original() {
        let kim = user("kim1", "Kim", "Korea");
        let jane = user("jane1", "Jane", "USA");

        let msg = compose_outgoing(&kim, &jane, "안녕", &unreachable_translator()).await;
        // Adapter failed; both renditions carry the original text and the
        // message is still deliverable.
        assert_eq!(msg.text, "안녕");
        assert_eq!(msg.translated(), "안녕");
        assert!(msg.validate().is_ok());
    }

    #[tokio::test]
    async fn viewer_projection_of_composed_message() {
        let kim = user("kim1", "Kim", "Korea");
        let jane = user("jane1", "Jane", "USA");

        let mut msg = compose_outgoing(&kim, &jane, "안녕", &unreachable_translator()).await;
        // Stand in for a successful adapter response.
        msg.translated_text = Some("Hello".into());

        assert_eq!(display_text(&msg, "kim1"), "안녕");
        assert_eq!(display_text(&msg, "jane1"), "Hello");
    }
}
