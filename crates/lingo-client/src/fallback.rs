//! In-memory seed accounts for offline/local mode.
//!
//! When the server is unreachable the client degrades to this set: login
//! still works, cross-device persistence does not.

use std::collections::BTreeMap;

use lingo_shared::{User, UserRole};

/// The fallback user set (one member, one admin).
pub fn fallback_users() -> BTreeMap<String, User> {
    let mut users = BTreeMap::new();

    users.insert(
        "user".to_string(),
        User {
            username: "user".into(),
            id: "user1".into(),
            password: "1234".into(),
            name: "김철수".into(),
            avatar: Some("https://picsum.photos/id/1012/200/200".into()),
            status_message: Some("오늘도 화이팅! 💪".into()),
            gender: Some("male".into()),
            age: Some(25),
            nationality: Some("Korea".into()),
            role: UserRole::Member,
        },
    );

    users.insert(
        "admin".to_string(),
        User {
            username: "admin".into(),
            id: "admin1".into(),
            password: "1234".into(),
            name: "관리자".into(),
            avatar: Some("https://picsum.photos/id/1074/200/200".into()),
            status_message: Some("시스템 관리 중 🛠️".into()),
            gender: Some("male".into()),
            age: Some(30),
            nationality: Some("Korea".into()),
            role: UserRole::Admin,
        },
    );

    users
}
