//! Feed aggregation: the time-ordered union of a user's own posts and the
//! posts of everyone they follow.

use diesel::prelude::*;

use crate::error::Error;
use crate::models::Post;
use crate::pagination::{offset_for_page, Page};
use crate::schema::{follows, posts};

/// Posts by `user_id` and everyone they follow, newest first. Ties on
/// timestamp break by id descending so the ordering is deterministic.
pub fn following_posts(
    conn: &mut SqliteConnection,
    user_id: i32,
    page: i64,
    per_page: i64,
) -> Result<Page<Post>, Error> {
    let total: i64 = posts::table
        .filter(posts::user_id.eq(user_id).or(posts::user_id.eq_any(
            follows::table
                .filter(follows::follower_id.eq(user_id))
                .select(follows::followed_id),
        )))
        .count()
        .get_result(conn)?;

    let offset = offset_for_page(page, per_page, total)?;

    let items = posts::table
        .filter(posts::user_id.eq(user_id).or(posts::user_id.eq_any(
            follows::table
                .filter(follows::follower_id.eq(user_id))
                .select(follows::followed_id),
        )))
        .order((posts::timestamp.desc(), posts::id.desc()))
        .limit(per_page)
        .offset(offset)
        .load::<Post>(conn)?;

    Ok(Page::new(items, page, per_page, total))
}

/// Every post on the site, newest first. Backs the explore page, with the
/// same ordering and pagination rules as the personal feed.
pub fn all_posts(
    conn: &mut SqliteConnection,
    page: i64,
    per_page: i64,
) -> Result<Page<Post>, Error> {
    let total: i64 = posts::table.count().get_result(conn)?;

    let offset = offset_for_page(page, per_page, total)?;

    let items = posts::table
        .order((posts::timestamp.desc(), posts::id.desc()))
        .limit(per_page)
        .offset(offset)
        .load::<Post>(conn)?;

    Ok(Page::new(items, page, per_page, total))
}

/// Posts by a single user, newest first, same tie-break as the feed.
pub fn user_posts(
    conn: &mut SqliteConnection,
    user_id: i32,
    page: i64,
    per_page: i64,
) -> Result<Page<Post>, Error> {
    let total: i64 = posts::table
        .filter(posts::user_id.eq(user_id))
        .count()
        .get_result(conn)?;

    let offset = offset_for_page(page, per_page, total)?;

    let items = posts::table
        .filter(posts::user_id.eq(user_id))
        .order((posts::timestamp.desc(), posts::id.desc()))
        .limit(per_page)
        .offset(offset)
        .load::<Post>(conn)?;

    Ok(Page::new(items, page, per_page, total))
}
