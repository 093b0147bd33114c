use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::posts;

/// Model for a short text post. Body and timestamp are immutable after
/// creation.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = posts)]
pub struct Post {
    pub id: i32,
    pub body: String,
    pub timestamp: NaiveDateTime,
    pub user_id: i32,
}

/// DTO for creating a new post
#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub body: String,
    pub timestamp: NaiveDateTime,
    pub user_id: i32,
}
