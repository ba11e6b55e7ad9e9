//! v001 -- Initial schema creation.
//!
//! Creates the three core tables: `users`, `messages`, and `tasks`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    username       TEXT PRIMARY KEY NOT NULL,  -- unique login name
    id             TEXT NOT NULL,              -- stable identifier used in rows
    password       TEXT NOT NULL,
    name           TEXT NOT NULL,
    avatar         TEXT,
    status_message TEXT,
    gender         TEXT,
    age            INTEGER,
    nationality    TEXT,                       -- locale key, e.g. 'Korea'
    role           TEXT NOT NULL DEFAULT 'member'
);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id              TEXT PRIMARY KEY NOT NULL, -- UUID v4
    thread_key      TEXT NOT NULL,             -- conversation_key(sender, recipient)
    sender_id       TEXT NOT NULL,
    recipient_id    TEXT NOT NULL,
    role            TEXT NOT NULL,             -- 'user' | 'model'
    text            TEXT NOT NULL,             -- original rendition
    translated_text TEXT NOT NULL,             -- localized rendition, never empty
    timestamp       TEXT NOT NULL,             -- ISO-8601 / RFC-3339
    sender_name     TEXT,
    is_error        INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_messages_thread_ts
    ON messages(thread_key, timestamp ASC);

CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages(sender_id);
CREATE INDEX IF NOT EXISTS idx_messages_recipient ON messages(recipient_id);

-- ----------------------------------------------------------------
-- Tasks
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS tasks (
    id              TEXT PRIMARY KEY NOT NULL, -- UUID v4
    user_id         TEXT NOT NULL,             -- owning user
    counterparty_id TEXT NOT NULL,
    text            TEXT NOT NULL,
    completed       INTEGER NOT NULL DEFAULT 0,
    timestamp       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id, timestamp ASC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
