//! Identity store: registration, credential checks, and profile updates.
//!
//! All operations run on a caller-supplied connection and leave commit
//! handling to the caller.

use chrono::Utc;
use diesel::prelude::*;

use crate::auth;
use crate::error::Error;
use crate::models::{NewUser, User};
use crate::schema::users;

pub const USERNAME_MAX_LEN: usize = 64;
pub const EMAIL_MAX_LEN: usize = 120;
pub const ABOUT_ME_MAX_LEN: usize = 140;

fn validate_username(username: &str) -> Result<(), Error> {
    if username.is_empty() || username.chars().count() > USERNAME_MAX_LEN {
        return Err(Error::Validation(format!(
            "username must be between 1 and {USERNAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), Error> {
    if email.is_empty() || email.chars().count() > EMAIL_MAX_LEN || !email.contains('@') {
        return Err(Error::Validation("a valid email address is required".to_string()));
    }
    Ok(())
}

/// Register a new user. Duplicate username or email is rejected before any
/// row is written.
pub fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, Error> {
    let username = username.trim();
    let email = email.trim();
    validate_username(username)?;
    validate_email(email)?;
    if password.is_empty() {
        return Err(Error::Validation("password must not be empty".to_string()));
    }

    if find_by_username(conn, username)?.is_some() {
        return Err(Error::Validation("username already taken".to_string()));
    }
    if find_by_email(conn, email)?.is_some() {
        return Err(Error::Validation("email already registered".to_string()));
    }

    let user = diesel::insert_into(users::table)
        .values(&NewUser {
            username: username.to_string(),
            email: email.to_string(),
            pw_hash: auth::hash_password(password)?,
            about_me: None,
            last_seen: Utc::now().naive_utc(),
        })
        .get_result::<User>(conn)?;

    Ok(user)
}

pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> Result<Option<User>, Error> {
    Ok(users::table.find(id).first::<User>(conn).optional()?)
}

pub fn find_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<User>, Error> {
    Ok(users::table
        .filter(users::username.eq(username))
        .first::<User>(conn)
        .optional()?)
}

pub fn find_by_email(conn: &mut SqliteConnection, email: &str) -> Result<Option<User>, Error> {
    Ok(users::table
        .filter(users::email.eq(email))
        .first::<User>(conn)
        .optional()?)
}

/// Check credentials. An unknown username and a wrong password produce the
/// same rejection.
pub fn verify_login(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
) -> Result<User, Error> {
    let user = find_by_username(conn, username)?.ok_or(Error::InvalidCredentials)?;
    if !auth::verify_password(password, &user.pw_hash) {
        return Err(Error::InvalidCredentials);
    }
    Ok(user)
}

/// Record that a user was just seen; called by every handler acting on a
/// user's behalf.
pub fn touch_last_seen(conn: &mut SqliteConnection, user_id: i32) -> Result<(), Error> {
    diesel::update(users::table.find(user_id))
        .set(users::last_seen.eq(Utc::now().naive_utc()))
        .execute(conn)?;
    Ok(())
}

/// Update username and/or bio. Username uniqueness is re-checked, excluding
/// the user themselves.
pub fn update_profile(
    conn: &mut SqliteConnection,
    user_id: i32,
    new_username: Option<&str>,
    about_me: Option<&str>,
) -> Result<User, Error> {
    if let Some(about) = about_me {
        if about.chars().count() > ABOUT_ME_MAX_LEN {
            return Err(Error::Validation(format!(
                "bio must be at most {ABOUT_ME_MAX_LEN} characters"
            )));
        }
    }

    // Both columns change or neither does.
    conn.transaction::<User, Error, _>(|conn| {
        if let Some(username) = new_username {
            let username = username.trim();
            validate_username(username)?;
            if let Some(existing) = find_by_username(conn, username)? {
                if existing.id != user_id {
                    return Err(Error::Validation("username already taken".to_string()));
                }
            }
            diesel::update(users::table.find(user_id))
                .set(users::username.eq(username))
                .execute(conn)?;
        }

        if let Some(about) = about_me {
            diesel::update(users::table.find(user_id))
                .set(users::about_me.eq(about))
                .execute(conn)?;
        }

        find_by_id(conn, user_id)?.ok_or_else(|| Error::NotFound("user not found".to_string()))
    })
}

pub fn set_password(
    conn: &mut SqliteConnection,
    user_id: i32,
    password: &str,
) -> Result<(), Error> {
    if password.is_empty() {
        return Err(Error::Validation("password must not be empty".to_string()));
    }
    diesel::update(users::table.find(user_id))
        .set(users::pw_hash.eq(auth::hash_password(password)?))
        .execute(conn)?;
    Ok(())
}
