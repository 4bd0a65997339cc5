//! Runs screen: list the user's runs and append new ones.

use log::{info, warn};

use crate::backend::Backend;
use crate::error::AppError;
use crate::models::{Run, RunForm, Session, User};
use crate::stats::RunStats;

/// All runs of the signed-in user, newest date first
pub async fn fetch_runs(backend: &dyn Backend, session: &Session) -> Result<Vec<Run>, AppError> {
    let user = backend
        .get_user(session)
        .await
        .map_err(|e| AppError::UserNotFound(format!("Error fetching user: {}", e.message())))?;

    backend.select_runs(session, &user).await.map_err(|e| {
        warn!("Fetching runs failed for user {}: {}", user.id, e);
        AppError::Fetch(e.message())
    })
}

/// Validate the form, derive `time_ended` and `avg_pace`, insert the run.
/// Returns the stored row(s).
pub async fn add_run(
    backend: &dyn Backend,
    session: &Session,
    form: &RunForm,
) -> Result<Vec<Run>, AppError> {
    let user: User = backend.get_user(session).await.map_err(|e| {
        warn!("Add run without a usable session: {}", e);
        AppError::UserNotFound("User not found or error fetching user.".to_string())
    })?;

    let new_run = form.to_new_run().map_err(AppError::Validation)?;

    let inserted = backend
        .insert_run(session, &user, &new_run)
        .await
        .map_err(|e| {
            warn!("Inserting run failed for user {}: {}", user.id, e);
            AppError::Insert(e.message())
        })?;

    info!(
        "User {} logged a {} mile run on {}",
        user.id, new_run.distance, new_run.date
    );
    Ok(inserted)
}

/// State of the runs screen for one request
#[derive(Debug, Clone, Default)]
pub struct RunsPage {
    pub runs: Vec<Run>,
    pub form: RunForm,
    pub error: Option<String>,
}

impl RunsPage {
    /// Fetch the runs; a failure leaves the list empty and shows the error
    pub async fn load(backend: &dyn Backend, session: &Session) -> Self {
        let mut page = Self::default();
        match fetch_runs(backend, session).await {
            Ok(runs) => page.runs = runs,
            Err(e) => page.error = Some(e.to_string()),
        }
        page
    }

    /// Submit the add-run form. On success the stored rows are appended and
    /// the form is reset; on failure the form keeps what the user typed.
    /// Returns whether the run was stored.
    pub async fn submit(&mut self, backend: &dyn Backend, session: &Session, form: RunForm) -> bool {
        match add_run(backend, session, &form).await {
            Ok(inserted) => {
                self.runs.extend(inserted);
                self.form = RunForm::default();
                self.error = None;
                true
            }
            Err(e) => {
                self.form = form;
                self.error = Some(e.to_string());
                false
            }
        }
    }

    pub fn stats(&self) -> RunStats {
        RunStats::from_runs(&self.runs)
    }
}
