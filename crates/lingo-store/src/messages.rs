//! Message persistence.
//!
//! One normalized table serves both participants: every row carries the
//! derived `thread_key` plus the resolved sender and recipient, and grouped
//! retrieval re-derives the per-counterparty view for whichever user asks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use lingo_shared::{conversation_key, Message, MessageRole};

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Append one message to the thread between `acting_user` and
    /// `counterparty`.
    ///
    /// The true sender defaults to the acting user when the payload leaves
    /// it unspecified; the recipient is whichever of the pair the sender is
    /// not.  The stored translated text falls back to the original so it is
    /// never empty.  The thread key is recomputed here, never trusted from
    /// the caller.
    pub fn save_message(
        &self,
        acting_user: &str,
        counterparty: &str,
        message: &Message,
    ) -> Result<()> {
        message.validate()?;

        let (sender, recipient) = resolve_parties(acting_user, counterparty, message);
        let thread_key = conversation_key(&sender, &recipient);

        insert_row(self.conn(), &thread_key, &sender, &recipient, message)?;

        tracing::debug!(
            id = %message.id,
            thread = %thread_key,
            sender = %sender,
            "message stored"
        );
        Ok(())
    }

    /// Replace the entire thread between `acting_user` and `counterparty`.
    ///
    /// Delete plus reinsert runs in one transaction: a failure anywhere in
    /// the batch leaves the prior thread state intact.
    pub fn replace_thread(
        &mut self,
        acting_user: &str,
        counterparty: &str,
        messages: &[Message],
    ) -> Result<()> {
        for message in messages {
            message.validate()?;
        }

        let thread_key = conversation_key(acting_user, counterparty);

        let tx = self.conn_mut().transaction()?;
        tx.execute(
            "DELETE FROM messages WHERE thread_key = ?1",
            params![thread_key],
        )?;
        for message in messages {
            let (sender, recipient) = resolve_parties(acting_user, counterparty, message);
            let key = conversation_key(&sender, &recipient);
            insert_row(&tx, &key, &sender, &recipient, message)?;
        }
        tx.commit()?;

        tracing::debug!(thread = %thread_key, count = messages.len(), "thread replaced");
        Ok(())
    }

    /// Every message the user sent or received, grouped by counterparty
    /// (the other party relative to `user_id`), timestamp-ascending within
    /// each group.
    ///
    /// The same rows yield a symmetric view for the other participant: A's
    /// group for B holds exactly the messages B's group for A holds.
    pub fn messages_for_user(&self, user_id: &str) -> Result<BTreeMap<String, Vec<Message>>> {
        let mut stmt = self.conn().prepare(
            "SELECT sender_id, recipient_id,
                    id, role, text, translated_text, timestamp, sender_name, is_error
             FROM messages
             WHERE sender_id = ?1 OR recipient_id = ?1
             ORDER BY timestamp ASC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            let sender: String = row.get(0)?;
            let recipient: String = row.get(1)?;
            let mut message = row_to_message(row, 2)?;
            message.sender_id = Some(sender.clone());
            Ok((sender, recipient, message))
        })?;

        let mut grouped: BTreeMap<String, Vec<Message>> = BTreeMap::new();
        for row in rows {
            let (sender, recipient, message) = row?;
            let other = if sender == user_id { recipient } else { sender };
            grouped.entry(other).or_default().push(message);
        }
        Ok(grouped)
    }

    /// The flat ordered list for one thread, independent of viewer.
    pub fn messages_for_thread(&self, thread_key: &str) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, role, text, translated_text, timestamp, sender_name, is_error,
                    sender_id
             FROM messages
             WHERE thread_key = ?1
             ORDER BY timestamp ASC",
        )?;

        let rows = stmt.query_map(params![thread_key], |row| {
            let mut message = row_to_message(row, 0)?;
            message.sender_id = Some(row.get(7)?);
            Ok(message)
        })?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}

/// Resolve the true sender and recipient for a row.
///
/// Sender defaults to the acting user; the recipient is the other member of
/// the pair, so a message authored by the counterparty is addressed back to
/// the acting user.
fn resolve_parties(acting_user: &str, counterparty: &str, message: &Message) -> (String, String) {
    let sender = message
        .sender_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(acting_user)
        .to_string();
    let recipient = if sender == counterparty {
        acting_user.to_string()
    } else {
        counterparty.to_string()
    };
    (sender, recipient)
}

fn insert_row(
    conn: &Connection,
    thread_key: &str,
    sender: &str,
    recipient: &str,
    message: &Message,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO messages (id, thread_key, sender_id, recipient_id, role,
                               text, translated_text, timestamp, sender_name, is_error)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            message.id,
            thread_key,
            sender,
            recipient,
            role_to_str(message.role),
            message.text,
            message.translated(),
            message.timestamp.to_rfc3339(),
            message.sender_name,
            message.is_error as i32,
        ],
    )
}

fn role_to_str(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Model => "model",
    }
}

/// Build a [`Message`] from a row slice starting at `base`:
/// `id, role, text, translated_text, timestamp, sender_name, is_error`.
fn row_to_message(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Message> {
    let role_str: String = row.get(base + 1)?;
    let role = match role_str.as_str() {
        "model" => MessageRole::Model,
        _ => MessageRole::User,
    };

    let ts_str: String = row.get(base + 4)?;
    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                base + 4,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

    let is_error: i32 = row.get(base + 6)?;

    Ok(Message {
        id: row.get(base)?,
        role,
        text: row.get(base + 2)?,
        translated_text: Some(row.get(base + 3)?),
        timestamp,
        sender_id: None,
        sender_name: row.get(base + 5)?,
        is_error: is_error != 0,
    })
}
