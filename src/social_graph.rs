//! Follow graph: a directed many-to-many relation over users.
//!
//! The data layer is deliberately permissive: nothing here prevents a
//! self-edge, and pair uniqueness rests on the existence check in
//! [`follow`], not on a table constraint. Self-follow policy lives with the
//! callers (see the API handlers).

use diesel::prelude::*;

use crate::error::Error;
use crate::models::{Follow, User};
use crate::schema::{follows, users};

/// True iff an edge follower -> followed exists.
pub fn is_following(
    conn: &mut SqliteConnection,
    follower_id: i32,
    followed_id: i32,
) -> Result<bool, Error> {
    let count: i64 = follows::table
        .filter(follows::follower_id.eq(follower_id))
        .filter(follows::followed_id.eq(followed_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Insert the edge iff it is absent; a second call is a no-op.
pub fn follow(conn: &mut SqliteConnection, follower_id: i32, followed_id: i32) -> Result<(), Error> {
    if is_following(conn, follower_id, followed_id)? {
        return Ok(());
    }
    diesel::insert_into(follows::table)
        .values(&Follow {
            follower_id,
            followed_id,
        })
        .execute(conn)?;
    Ok(())
}

/// Remove the edge; a no-op if it is absent.
pub fn unfollow(
    conn: &mut SqliteConnection,
    follower_id: i32,
    followed_id: i32,
) -> Result<(), Error> {
    diesel::delete(
        follows::table
            .filter(follows::follower_id.eq(follower_id))
            .filter(follows::followed_id.eq(followed_id)),
    )
    .execute(conn)?;
    Ok(())
}

pub fn following_count(conn: &mut SqliteConnection, user_id: i32) -> Result<i64, Error> {
    Ok(follows::table
        .filter(follows::follower_id.eq(user_id))
        .count()
        .get_result(conn)?)
}

pub fn follower_count(conn: &mut SqliteConnection, user_id: i32) -> Result<i64, Error> {
    Ok(follows::table
        .filter(follows::followed_id.eq(user_id))
        .count()
        .get_result(conn)?)
}

/// Users this user follows, ordered by username.
pub fn following_of(conn: &mut SqliteConnection, user_id: i32) -> Result<Vec<User>, Error> {
    Ok(users::table
        .filter(
            users::id.eq_any(
                follows::table
                    .filter(follows::follower_id.eq(user_id))
                    .select(follows::followed_id),
            ),
        )
        .order(users::username.asc())
        .load::<User>(conn)?)
}

/// Users following this user, ordered by username.
pub fn followers_of(conn: &mut SqliteConnection, user_id: i32) -> Result<Vec<User>, Error> {
    Ok(users::table
        .filter(
            users::id.eq_any(
                follows::table
                    .filter(follows::followed_id.eq(user_id))
                    .select(follows::follower_id),
            ),
        )
        .order(users::username.asc())
        .load::<User>(conn)?)
}
