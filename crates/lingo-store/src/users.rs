//! User account persistence.

use std::collections::BTreeMap;

use rusqlite::params;

use lingo_shared::{User, UserRole};

use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    /// Insert a new account.
    ///
    /// Fails with [`StoreError::Duplicate`] when the username is already
    /// taken, leaving the existing row untouched.
    pub fn insert_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (username, id, password, name, avatar, status_message,
                                gender, age, nationality, role)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user.username,
                user.id,
                user.password,
                user.name,
                user.avatar,
                user.status_message,
                user.gender,
                user.age,
                user.nationality,
                role_to_str(user.role),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate(user.username.clone()))
            }
            Err(other) => Err(StoreError::Sqlite(other)),
        }
    }

    pub fn get_user(&self, username: &str) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT username, id, password, name, avatar, status_message,
                        gender, age, nationality, role
                 FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// All accounts keyed by username, secrets included.  Callers strip the
    /// secret before rendering other users.
    pub fn list_users(&self) -> Result<BTreeMap<String, User>> {
        let mut stmt = self.conn().prepare(
            "SELECT username, id, password, name, avatar, status_message,
                    gender, age, nationality, role
             FROM users ORDER BY username ASC",
        )?;

        let rows = stmt.query_map([], row_to_user)?;

        let mut users = BTreeMap::new();
        for row in rows {
            let user = row?;
            users.insert(user.username.clone(), user);
        }
        Ok(users)
    }

    pub fn delete_user(&self, username: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM users WHERE username = ?1", params![username])?;
        Ok(affected > 0)
    }

    pub fn update_password(&self, username: &str, new_password: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE users SET password = ?1 WHERE username = ?2",
            params![new_password, username],
        )?;
        Ok(affected > 0)
    }

    pub fn count_users(&self) -> Result<u32> {
        let count = self
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    /// How many accounts carry the admin role.  Used to refuse deleting the
    /// last remaining admin.
    pub fn count_admins(&self) -> Result<u32> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'admin'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Seed the bootstrap admin account when the users table is empty.
    ///
    /// Idempotent: a populated table is left alone.
    pub fn seed_admin(&self, password: &str) -> Result<bool> {
        if self.count_users()? > 0 {
            return Ok(false);
        }

        let admin = User {
            username: "admin".into(),
            id: "admin1".into(),
            password: password.into(),
            name: "관리자".into(),
            avatar: Some("https://picsum.photos/id/1074/200/200".into()),
            status_message: Some("시스템 관리 중 🛠️".into()),
            gender: Some("male".into()),
            age: Some(30),
            nationality: Some("Korea".into()),
            role: UserRole::Admin,
        };
        self.insert_user(&admin)?;

        tracing::info!(username = %admin.username, "seeded bootstrap admin account");
        Ok(true)
    }
}

fn role_to_str(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "admin",
        UserRole::Member => "member",
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(9)?;
    let role = match role_str.as_str() {
        "admin" => UserRole::Admin,
        _ => UserRole::Member,
    };

    Ok(User {
        username: row.get(0)?,
        id: row.get(1)?,
        password: row.get(2)?,
        name: row.get(3)?,
        avatar: row.get(4)?,
        status_message: row.get(5)?,
        gender: row.get(6)?,
        age: row.get(7)?,
        nationality: row.get(8)?,
        role,
    })
}
