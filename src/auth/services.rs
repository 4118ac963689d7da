use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::warn;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Create a user with a hashed password. Duplicate email is a conflict,
/// whether caught by the pre-check or by the unique constraint.
pub async fn register(
    db: &PgPool,
    email: &str,
    password: &str,
    name: &str,
    title: &str,
    avatar: &str,
) -> Result<User, ApiError> {
    let existing = User::find_by_email(db, email)
        .await
        .map_err(|e| ApiError::persistence("Registration failed", e))?;
    if existing.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash =
        hash_password(password).map_err(|e| ApiError::internal("Registration failed", e))?;

    match User::create(db, email, &hash, name, title, avatar).await {
        Ok(user) => Ok(user),
        // Two registrations can race past the pre-check.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(ApiError::Conflict("Email already registered".into()))
        }
        Err(e) => Err(ApiError::persistence("Registration failed", e)),
    }
}

/// Authenticate by email and password. Returns `None` for unknown email and
/// wrong password alike, so the caller cannot tell them apart.
pub async fn login(db: &PgPool, email: &str, password: &str) -> Result<Option<User>, ApiError> {
    let user = match User::find_by_email(db, email)
        .await
        .map_err(|e| ApiError::persistence("Login failed", e))?
    {
        Some(u) => u,
        None => {
            warn!(%email, "login unknown email");
            return Ok(None);
        }
    };

    let ok = verify_password(password, &user.password_hash)
        .map_err(|e| ApiError::internal("Login failed", e))?;
    if !ok {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Ok(None);
    }
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@news.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("@x.com"));
    }
}
