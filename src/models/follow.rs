use diesel::prelude::*;
use serde::Serialize;

use crate::schema::follows;

/// A directed follow edge in the social graph.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = follows)]
pub struct Follow {
    pub follower_id: i32,
    pub followed_id: i32,
}
