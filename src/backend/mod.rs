//! Storage/auth collaborators.
//!
//! Every call takes the caller's [`Session`] explicitly; backends hold no
//! per-user state between calls.

pub mod hosted;
pub mod local;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{NewRun, Run, Session, User};

pub use hosted::HostedBackend;
pub use local::LocalBackend;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Register a new account. Does not sign it in.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> Result<User, BackendError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError>;

    async fn get_user(&self, session: &Session) -> Result<User, BackendError>;

    /// Idempotently prepare run storage for the user
    async fn provision(&self, session: &Session, user: &User) -> Result<(), BackendError>;

    /// All of the user's runs, newest date first
    async fn select_runs(&self, session: &Session, user: &User) -> Result<Vec<Run>, BackendError>;

    /// Insert one run and return the stored row(s)
    async fn insert_run(
        &self,
        session: &Session,
        user: &User,
        run: &NewRun,
    ) -> Result<Vec<Run>, BackendError>;

    async fn sign_out(&self, session: &Session) -> Result<(), BackendError>;
}
