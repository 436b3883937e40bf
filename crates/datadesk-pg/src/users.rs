//! Credential store and account administration.
//!
//! Backed by the `users` table. Password hashes are Argon2 PHC strings with
//! a fresh random salt per hash; unknown usernames and wrong passwords are
//! indistinguishable to the caller.

use crate::error::DbError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::fmt;
use std::str::FromStr;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// All roles, for rendering the role picker.
    pub fn all() -> [UserRole; 2] {
        [UserRole::Admin, UserRole::User]
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            other => Err(DbError::UserAdmin(format!("unknown role '{}'", other))),
        }
    }
}

/// A stored account, as listed on the admin page.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    password_hash: String,
    role: String,
}

/// DB-backed user store.
#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), DbError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::UserAdmin(e.to_string()))?;
        Ok(())
    }

    /// On startup, if the store is empty, create a default admin account.
    /// Returns whether an account was created. An empty store with no
    /// bootstrap password is an error: nobody could ever sign in.
    pub async fn bootstrap_admin(
        &self,
        username: &str,
        password: Option<&str>,
    ) -> Result<bool, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(1) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::UserAdmin(e.to_string()))?;

        if count > 0 {
            return Ok(false);
        }

        let password = password.filter(|p| !p.trim().is_empty()).ok_or_else(|| {
            DbError::UserAdmin(
                "bootstrap admin password is empty (set DATADESK_ADMIN_PASSWORD or bootstrap.admin_password)"
                    .to_string(),
            )
        })?;

        self.create(username, password, UserRole::Admin).await?;
        tracing::warn!(username, "bootstrapped admin account (password taken from env/config)");
        Ok(true)
    }

    /// Validate submitted credentials. Absent user and hash mismatch both
    /// fail with [`DbError::InvalidCredentials`].
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserRole, DbError> {
        let row: Option<CredentialRow> =
            sqlx::query_as("SELECT password_hash, role FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DbError::UserAdmin(e.to_string()))?;

        let row = row.ok_or(DbError::InvalidCredentials)?;

        if !verify_password(password, &row.password_hash) {
            return Err(DbError::InvalidCredentials);
        }

        UserRole::from_str(&row.role)
    }

    /// Create an account. Username uniqueness is enforced by the store's
    /// constraint; violations surface as a generic failure.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<(), DbError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(DbError::UserAdmin(
                "username and password are required".to_string(),
            ));
        }

        let hash = hash_password(password)?;

        sqlx::query("INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3)")
            .bind(username)
            .bind(hash)
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::UserAdmin(e.to_string()))?;

        Ok(())
    }

    /// List all accounts, ordered by id.
    pub async fn list(&self) -> Result<Vec<User>, DbError> {
        sqlx::query_as("SELECT id, username, role, created_at FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::UserAdmin(e.to_string()))
    }

    /// Delete an account by id. Refused when the target row's username
    /// equals the current session's username. Returns the deleted username.
    pub async fn delete(&self, id: i64, session_username: &str) -> Result<String, DbError> {
        let target: Option<(String,)> =
            sqlx::query_as("SELECT username FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DbError::UserAdmin(e.to_string()))?;

        let (username,) =
            target.ok_or_else(|| DbError::UserAdmin(format!("no account with id {}", id)))?;

        refuse_self_delete(&username, session_username)?;

        // A concurrent delete makes this affect zero rows, which is fine.
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::UserAdmin(e.to_string()))?;

        Ok(username)
    }
}

/// The guard compares usernames, not ids: a deleted-and-recreated username
/// stays protected while the original session lives.
fn refuse_self_delete(target_username: &str, session_username: &str) -> Result<(), DbError> {
    if target_username == session_username {
        return Err(DbError::SelfDelete);
    }
    Ok(())
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, DbError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DbError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_the_enumerated_set() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("user").unwrap(), UserRole::User);
        assert!(UserRole::from_str("root").is_err());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
    }

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn each_hash_gets_a_fresh_salt() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hashes_never_verify() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn self_delete_is_refused_by_username() {
        assert!(matches!(
            refuse_self_delete("admin", "admin"),
            Err(DbError::SelfDelete)
        ));
        assert!(refuse_self_delete("bob", "admin").is_ok());
    }
}
