//! Self-hosted backend on a local SQLite file.
//!
//! Mirrors the hosted service's behavior and error messages closely enough
//! that the screens cannot tell the two apart. All runs live in one table
//! keyed by `user_id`.
//!
//! Meant for development and single-user self-hosting. Passwords are stored
//! as one round of salted SHA-256 and compared with plain string equality;
//! this is not a hardened password store. Sessions expire
//! [`SESSION_TTL_DAYS`] after sign-in and expired rows are pruned on the
//! next sign-in.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::{debug, info};
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;
use uuid::Uuid;

use super::Backend;
use crate::constants::generate_token;
use crate::db;
use crate::error::BackendError;
use crate::models::{Location, NewRun, Run, Session, User};
use crate::queries::{runners, runs, sessions, users};

const MIN_PASSWORD_LEN: usize = 6;
const SESSION_TOKEN_LEN: usize = 40;
const SALT_LEN: usize = 16;

/// Days a session token stays valid after sign-in
pub const SESSION_TTL_DAYS: i64 = 30;

/// Oldest `created_at` still accepted, in SQLite's `CURRENT_TIMESTAMP` format
fn session_cutoff() -> String {
    (Utc::now() - Duration::days(SESSION_TTL_DAYS))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub struct LocalBackend {
    pool: SqlitePool,
}

impl LocalBackend {
    /// Open (creating if needed) the database file and prepare its schema
    pub async fn open(db_path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let pool = db::open_and_init(db_path).await?;
        Ok(Self { pool })
    }

    /// Wrap a pool whose schema is already initialized
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn user_for_session(&self, session: &Session) -> Result<User, BackendError> {
        let sql = sessions::select_user_by_token(&session.access_token, &session_cutoff());
        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(User {
                id: row.try_get(0)?,
                email: row.try_get(1)?,
                username: row.try_get(2)?,
            }),
            None => Err(BackendError::Unauthorized(
                "Invalid or expired session".to_string(),
            )),
        }
    }

    /// The session must belong to the user it acts for
    async fn authorize(&self, session: &Session, user: &User) -> Result<(), BackendError> {
        let owner = self.user_for_session(session).await?;
        if owner.id != user.id {
            return Err(BackendError::Unauthorized(
                "Session does not belong to this user".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> Result<User, BackendError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::Rejected(format!(
                "Password should be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }

        let taken: Option<i64> = sqlx::query_scalar(&users::exists_by_email(&email))
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(BackendError::Rejected("User already registered".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let salt = generate_token(SALT_LEN);
        let hash = hash_password(&salt, password);
        let username = username.map(str::trim).filter(|u| !u.is_empty());

        sqlx::query(&users::insert(&id, &email, username, &hash, &salt))
            .execute(&self.pool)
            .await?;

        info!("Registered local user {}", email);
        Ok(User {
            id,
            email: Some(email),
            username: username.map(str::to_string),
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let invalid = || BackendError::Unauthorized("Invalid login credentials".to_string());

        let email = email.trim().to_lowercase();
        let row = sqlx::query(&users::select_credentials_by_email(&email))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(invalid)?;

        let user_id: String = row.try_get(0)?;
        let stored_hash: String = row.try_get(3)?;
        let salt: String = row.try_get(4)?;
        if hash_password(&salt, password) != stored_hash {
            return Err(invalid());
        }

        let pruned = sqlx::query(&sessions::delete_created_before(&session_cutoff()))
            .execute(&self.pool)
            .await?
            .rows_affected();
        if pruned > 0 {
            debug!("Pruned {} expired session(s)", pruned);
        }

        let token = generate_token(SESSION_TOKEN_LEN);
        sqlx::query(&sessions::insert(&token, &user_id))
            .execute(&self.pool)
            .await?;

        Ok(Session::new(token))
    }

    async fn get_user(&self, session: &Session) -> Result<User, BackendError> {
        self.user_for_session(session).await
    }

    async fn provision(&self, session: &Session, user: &User) -> Result<(), BackendError> {
        self.authorize(session, user).await?;
        sqlx::query(&runners::insert_or_ignore(&user.id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn select_runs(&self, session: &Session, user: &User) -> Result<Vec<Run>, BackendError> {
        self.authorize(session, user).await?;
        let rows = sqlx::query(&runs::select_by_user(&user.id))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(run_from_row).collect()
    }

    async fn insert_run(
        &self,
        session: &Session,
        user: &User,
        run: &NewRun,
    ) -> Result<Vec<Run>, BackendError> {
        self.authorize(session, user).await?;

        let provisioned: Option<i64> = sqlx::query_scalar(&runners::exists(&user.id))
            .fetch_optional(&self.pool)
            .await?;
        if provisioned.is_none() {
            return Err(BackendError::Rejected(
                "Runs storage is not provisioned for this user".to_string(),
            ));
        }

        let id = sqlx::query(&runs::insert(&user.id, run))
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        let rows = sqlx::query(&runs::select_by_id(id, &user.id))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(run_from_row).collect()
    }

    async fn sign_out(&self, session: &Session) -> Result<(), BackendError> {
        sqlx::query(&sessions::delete(&session.access_token))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn run_from_row(row: &SqliteRow) -> Result<Run, BackendError> {
    let location: String = row.try_get(8)?;
    Ok(Run {
        id: Some(row.try_get(0)?),
        date: row.try_get(1)?,
        time_started: row.try_get(2)?,
        time_ended: row.try_get(3)?,
        total_time: row.try_get(4)?,
        distance: row.try_get(5)?,
        avg_pace: row.try_get(6)?,
        elevation_gain: row.try_get(7)?,
        location: location.parse::<Location>().map_err(BackendError::Decode)?,
        effort_level: row.try_get(9)?,
    })
}

fn normalize_email(email: &str) -> Result<String, BackendError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(BackendError::Rejected(
            "Unable to validate email address: invalid format".to_string(),
        ));
    }
    Ok(email)
}

fn hash_password(salt: &str, password: &str) -> String {
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Runner@Example.com ").unwrap(), "runner@example.com");
        assert!(normalize_email("runner").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("runner@localhost").is_err());
        assert!(normalize_email("run ner@example.com").is_err());
    }

    #[test]
    fn test_hash_password_is_salted() {
        let a = hash_password("salt-a", "hunter22");
        let b = hash_password("salt-b", "hunter22");
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(a, hash_password("salt-a", "hunter22"));
    }
}
