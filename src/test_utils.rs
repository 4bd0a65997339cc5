//! Test helpers: a backend whose every step can be scripted to fail,
//! plus run fixtures.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::backend::Backend;
use crate::error::BackendError;
use crate::models::{Location, NewRun, Run, RunForm, Session, User};

/// In-memory backend. Each `fail_*` field, when set, makes that call fail
/// with the given message.
pub struct ScriptedBackend {
    pub fail_sign_up: Option<String>,
    pub fail_sign_in: Option<String>,
    pub fail_get_user: Option<String>,
    pub fail_provision: Option<String>,
    pub fail_select: Option<String>,
    pub fail_insert: Option<String>,
    pub user_email: Option<String>,
    pub runs: Mutex<Vec<Run>>,
    /// Invocation counts per method, read with [`ScriptedBackend::calls`]
    pub call_counts: Mutex<HashMap<&'static str, usize>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self {
            fail_sign_up: None,
            fail_sign_in: None,
            fail_get_user: None,
            fail_provision: None,
            fail_select: None,
            fail_insert: None,
            user_email: Some("runner@example.com".to_string()),
            runs: Mutex::new(Vec::new()),
            call_counts: Mutex::new(HashMap::new()),
        }
    }
}

impl ScriptedBackend {
    pub fn with_runs(runs: Vec<Run>) -> Self {
        Self {
            runs: Mutex::new(runs),
            ..Self::default()
        }
    }

    /// How many times a backend method was invoked
    pub fn calls(&self, name: &str) -> usize {
        self.call_counts.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn record(&self, name: &'static str) {
        *self.call_counts.lock().unwrap().entry(name).or_insert(0) += 1;
    }

    fn user(&self) -> User {
        User {
            id: "user-1".to_string(),
            email: self.user_email.clone(),
            username: None,
        }
    }
}

fn scripted(failure: &Option<String>) -> Result<(), BackendError> {
    match failure {
        Some(message) => Err(BackendError::Rejected(message.clone())),
        None => Ok(()),
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        username: Option<&str>,
    ) -> Result<User, BackendError> {
        self.record("sign_up");
        scripted(&self.fail_sign_up)?;
        Ok(User {
            id: "user-1".to_string(),
            email: Some(email.to_string()),
            username: username.map(str::to_string),
        })
    }

    async fn sign_in_with_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Session, BackendError> {
        self.record("sign_in");
        scripted(&self.fail_sign_in)?;
        Ok(Session::new("token-1"))
    }

    async fn get_user(&self, _session: &Session) -> Result<User, BackendError> {
        self.record("get_user");
        scripted(&self.fail_get_user)?;
        Ok(self.user())
    }

    async fn provision(&self, _session: &Session, _user: &User) -> Result<(), BackendError> {
        self.record("provision");
        scripted(&self.fail_provision)
    }

    async fn select_runs(&self, _session: &Session, _user: &User) -> Result<Vec<Run>, BackendError> {
        self.record("select_runs");
        scripted(&self.fail_select)?;
        let mut runs = self.runs.lock().unwrap().clone();
        runs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(runs)
    }

    async fn insert_run(
        &self,
        _session: &Session,
        _user: &User,
        run: &NewRun,
    ) -> Result<Vec<Run>, BackendError> {
        self.record("insert_run");
        scripted(&self.fail_insert)?;
        let mut runs = self.runs.lock().unwrap();
        let stored = run.clone().into_run(runs.len() as i64 + 1);
        runs.push(stored.clone());
        Ok(vec![stored])
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), BackendError> {
        self.record("sign_out");
        Ok(())
    }
}

/// A stored run with the given date and distance
pub fn mock_run(id: i64, date: &str, distance: &str) -> Run {
    Run {
        id: Some(id),
        date: date.to_string(),
        time_started: "06:30".to_string(),
        time_ended: "07:00:00".to_string(),
        total_time: "00:30:00".to_string(),
        distance: distance.to_string(),
        avg_pace: "10:00".to_string(),
        elevation_gain: "50".to_string(),
        location: Location::Road,
        effort_level: 5,
    }
}

/// A complete, valid add-run form
pub fn mock_run_form() -> RunForm {
    RunForm {
        date: "2024-05-04".to_string(),
        time_started: "07:30".to_string(),
        total_time: "01:02:03".to_string(),
        distance: "6.2".to_string(),
        elevation_gain: "120".to_string(),
        location: "trail".to_string(),
        effort_level: "7".to_string(),
    }
}
