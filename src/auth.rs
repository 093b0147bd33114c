use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Hash a password with a fresh random salt. Plaintext never leaves this
/// function.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    reset_password: i32,
    exp: i64,
}

/// Sign a short-lived password reset token for the given user.
pub fn generate_reset_token(
    user_id: i32,
    expires_in_secs: i64,
    secret: &str,
) -> Result<String, Error> {
    let claims = ResetClaims {
        reset_password: user_id,
        exp: Utc::now().timestamp() + expires_in_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("failed to sign reset token: {e}")))
}

/// Verify a reset token and return the user id it was issued for.
///
/// Expired, malformed, and wrongly-signed tokens all yield `None`; the
/// caller cannot tell which case occurred.
pub fn verify_reset_token(token: &str, secret: &str) -> Option<i32> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()
    .map(|data| data.claims.reset_password)
}
