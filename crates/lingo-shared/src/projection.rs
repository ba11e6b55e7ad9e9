//! Viewer-dependent message projection and contact-list derivation.
//!
//! The sender reads their own words; everyone else reads the localized
//! rendition.  Both functions are pure given `(message, viewer_id)`, so the
//! UI can re-run them freely.

use std::collections::BTreeMap;

use crate::types::{Contact, Message, User};

/// Which rendition to show a given viewer: the sender sees the original
/// text, any other viewer sees the translated text (which falls back to the
/// original when no distinct translation exists).
pub fn display_text<'a>(message: &'a Message, viewer_id: &str) -> &'a str {
    if message.sender_id.as_deref() == Some(viewer_id) {
        &message.text
    } else {
        message.translated()
    }
}

/// The rendition `display_text` does *not* pick, for a show-other-variant
/// toggle.
pub fn alternate_text<'a>(message: &'a Message, viewer_id: &str) -> &'a str {
    if message.sender_id.as_deref() == Some(viewer_id) {
        message.translated()
    } else {
        &message.text
    }
}

/// Map every other known user into a friend-list entry, secrets stripped.
///
/// `previews` supplies an optional last-message line per counterparty id,
/// typically the tail of the viewer's cached thread.
pub fn contact_list(
    viewer_username: &str,
    users: &BTreeMap<String, User>,
    previews: &BTreeMap<String, Message>,
) -> Vec<Contact> {
    users
        .values()
        .filter(|u| u.username != viewer_username)
        .map(|u| {
            let last = previews.get(&u.id);
            Contact {
                id: u.id.clone(),
                name: u.name.clone(),
                avatar: u.avatar.clone(),
                description: u.status_message.clone(),
                last_message: last.map(|m| m.text.clone()),
                last_message_time: last.map(|m| m.timestamp),
            }
        })
        .collect()
}
