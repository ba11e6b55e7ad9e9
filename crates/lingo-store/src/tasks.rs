//! Task checklist persistence.
//!
//! Tasks use replace-on-write semantics: every save deletes the user's
//! entire task set and reinserts the supplied state in one transaction.
//! Callers must always submit the complete desired state; concurrent
//! writers experience last-write-wins.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::params;

use lingo_shared::Task;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// All tasks owned by the user, grouped by counterparty,
    /// timestamp-ascending within each group.
    pub fn tasks_for_user(&self, user_id: &str) -> Result<BTreeMap<String, Vec<Task>>> {
        let mut stmt = self.conn().prepare(
            "SELECT counterparty_id, id, text, completed, timestamp
             FROM tasks
             WHERE user_id = ?1
             ORDER BY timestamp ASC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            let counterparty: String = row.get(0)?;
            let completed: i32 = row.get(3)?;
            let ts_str: String = row.get(4)?;
            let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        4,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
            Ok((
                counterparty,
                Task {
                    id: row.get(1)?,
                    text: row.get(2)?,
                    completed: completed != 0,
                    timestamp,
                },
            ))
        })?;

        let mut grouped: BTreeMap<String, Vec<Task>> = BTreeMap::new();
        for row in rows {
            let (counterparty, task) = row?;
            grouped.entry(counterparty).or_default().push(task);
        }
        Ok(grouped)
    }

    /// Replace every task owned by `user_id` with the supplied
    /// per-counterparty map, atomically.
    ///
    /// A full-state overwrite, not an incremental diff: replacing with an
    /// empty map empties the user's task set.
    pub fn replace_tasks_for_user(
        &mut self,
        user_id: &str,
        tasks: &BTreeMap<String, Vec<Task>>,
    ) -> Result<()> {
        let tx = self.conn_mut().transaction()?;
        tx.execute("DELETE FROM tasks WHERE user_id = ?1", params![user_id])?;
        for (counterparty, list) in tasks {
            for task in list {
                tx.execute(
                    "INSERT INTO tasks (id, user_id, counterparty_id, text, completed, timestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        task.id,
                        user_id,
                        counterparty,
                        task.text,
                        task.completed as i32,
                        task.timestamp.to_rfc3339(),
                    ],
                )?;
            }
        }
        tx.commit()?;

        tracing::debug!(user = %user_id, "task set replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: &str, text: &str, minute: u32) -> Task {
        Task {
            id: id.into(),
            text: text.into(),
            completed: false,
            timestamp: Utc.with_ymd_and_hms(2026, 8, 25, 9, minute, 0).unwrap(),
        }
    }

    #[test]
    fn replace_and_grouped_retrieval() {
        let mut db = Database::open_in_memory().unwrap();

        let mut tasks = BTreeMap::new();
        tasks.insert("jane1".to_string(), vec![task("t1", "review", 0), task("t2", "ship", 1)]);
        tasks.insert("lee1".to_string(), vec![task("t3", "call", 2)]);
        db.replace_tasks_for_user("kim1", &tasks).unwrap();

        let loaded = db.tasks_for_user("kim1").unwrap();
        assert_eq!(loaded.len(), 2);
        let texts: Vec<_> = loaded["jane1"].iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["review", "ship"]);
    }

    #[test]
    fn replace_is_a_full_overwrite() {
        let mut db = Database::open_in_memory().unwrap();

        let mut first = BTreeMap::new();
        first.insert("jane1".to_string(), vec![task("t1", "old", 0)]);
        db.replace_tasks_for_user("kim1", &first).unwrap();

        let mut second = BTreeMap::new();
        second.insert("jane1".to_string(), vec![task("t2", "new", 1)]);
        db.replace_tasks_for_user("kim1", &second).unwrap();

        let loaded = db.tasks_for_user("kim1").unwrap();
        assert_eq!(loaded["jane1"].len(), 1);
        assert_eq!(loaded["jane1"][0].id, "t2");
    }

    #[test]
    fn replace_with_empty_map_clears_everything() {
        let mut db = Database::open_in_memory().unwrap();

        let mut tasks = BTreeMap::new();
        tasks.insert("jane1".to_string(), vec![task("t1", "x", 0)]);
        db.replace_tasks_for_user("kim1", &tasks).unwrap();

        db.replace_tasks_for_user("kim1", &BTreeMap::new()).unwrap();
        assert!(db.tasks_for_user("kim1").unwrap().is_empty());
    }

    #[test]
    fn replace_only_touches_the_owning_user() {
        let mut db = Database::open_in_memory().unwrap();

        let mut kim = BTreeMap::new();
        kim.insert("jane1".to_string(), vec![task("t1", "kim's", 0)]);
        db.replace_tasks_for_user("kim1", &kim).unwrap();

        let mut jane = BTreeMap::new();
        jane.insert("kim1".to_string(), vec![task("t2", "jane's", 1)]);
        db.replace_tasks_for_user("jane1", &jane).unwrap();

        db.replace_tasks_for_user("jane1", &BTreeMap::new()).unwrap();
        assert_eq!(db.tasks_for_user("kim1").unwrap()["jane1"].len(), 1);
    }
}
