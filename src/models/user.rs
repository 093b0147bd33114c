use chrono::NaiveDateTime;
use diesel::prelude::*;
use md5::{Digest, Md5};
use serde::Serialize;

use crate::schema::users;

/// Model for a registered user
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub pw_hash: String,
    pub about_me: Option<String>,
    pub last_seen: NaiveDateTime,
}

impl User {
    /// Gravatar URL derived from the md5 of the lowercased email.
    pub fn avatar_url(&self, size: u32) -> String {
        let digest = Md5::digest(self.email.to_lowercase().as_bytes());
        format!(
            "https://www.gravatar.com/avatar/{}?d=identicon&s={}",
            hex::encode(digest),
            size
        )
    }
}

/// DTO for creating a new user
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub pw_hash: String,
    pub about_me: Option<String>,
    pub last_seen: NaiveDateTime,
}
