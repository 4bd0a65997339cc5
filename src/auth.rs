//! Auth screen flow: sign up, log in, provision run storage.
//!
//! ```text
//! LoggedOut -> Authenticating -> LoggedIn | Error
//! SignUpPending -> Error | "Sign-up successful" -> LoggedOut (login mode)
//! ```

use log::{info, warn};
use serde::Deserialize;

use crate::backend::Backend;
use crate::error::AppError;
use crate::models::{Session, User};

pub const SIGN_UP_SUCCESS_MESSAGE: &str = "Sign-up successful! Please log in.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Login,
    SignUp,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::Login,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthMode::Login => "login",
            AuthMode::SignUp => "signup",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AuthMode::Login => "Log In",
            AuthMode::SignUp => "Sign Up",
        }
    }
}

/// Auth form as posted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub username: String,
}

/// What the auth page shows. The password is never echoed back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthView {
    pub mode: AuthMode,
    pub email: String,
    pub username: String,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl AuthView {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub enum AuthOutcome {
    /// Account created; back to login mode with a confirmation
    SignedUp { view: AuthView },
    /// Credentials accepted and storage provisioned; go to the runs screen
    LoggedIn { session: Session, user: User },
    /// The page is shown again with the error
    Failed { view: AuthView, error: AppError },
}

/// Run the sign-up or login flow for a submitted form
pub async fn submit(backend: &dyn Backend, form: &AuthForm) -> AuthOutcome {
    let mut view = AuthView {
        mode: form.mode,
        email: form.email.clone(),
        username: form.username.clone(),
        error: None,
        message: None,
    };

    match form.mode {
        AuthMode::SignUp => {
            match sign_up(backend, &form.email, &form.password, &form.username).await {
                Ok(message) => {
                    view.mode = AuthMode::Login;
                    view.message = Some(message);
                    AuthOutcome::SignedUp { view }
                }
                Err(error) => {
                    view.error = Some(error.to_string());
                    AuthOutcome::Failed { view, error }
                }
            }
        }
        AuthMode::Login => match login(backend, &form.email, &form.password).await {
            Ok((session, user)) => AuthOutcome::LoggedIn { session, user },
            Err(error) => {
                view.error = Some(error.to_string());
                AuthOutcome::Failed { view, error }
            }
        },
    }
}

/// Register an account. Does not log in.
pub async fn sign_up(
    backend: &dyn Backend,
    email: &str,
    password: &str,
    username: &str,
) -> Result<String, AppError> {
    require(&[("Username", username), ("Email", email), ("Password", password)])?;

    match backend.sign_up(email.trim(), password, Some(username.trim())).await {
        Ok(user) => {
            info!("Sign-up succeeded for user {}", user.id);
            Ok(SIGN_UP_SUCCESS_MESSAGE.to_string())
        }
        Err(e) => {
            warn!("Sign-up failed for {}: {}", email.trim(), e);
            Err(AppError::Auth(e.message()))
        }
    }
}

/// Sign in, fetch the user, provision their run storage.
/// Each step's failure halts the flow with its own error.
pub async fn login(
    backend: &dyn Backend,
    email: &str,
    password: &str,
) -> Result<(Session, User), AppError> {
    require(&[("Email", email), ("Password", password)])?;

    let session = backend
        .sign_in_with_password(email.trim(), password)
        .await
        .map_err(|e| {
            warn!("Login failed for {}: {}", email.trim(), e);
            AppError::Auth(e.message())
        })?;

    let user = backend
        .get_user(&session)
        .await
        .map_err(|e| AppError::UserNotFound(e.message()))?;

    if user.email.is_none() {
        return Err(AppError::UserNotFound("Email not found.".to_string()));
    }

    if let Err(e) = backend.provision(&session, &user).await {
        warn!("Provisioning run storage failed for user {}: {}", user.id, e);
        // The session is never handed to the browser, so drop it remotely too
        if let Err(sign_out_err) = backend.sign_out(&session).await {
            warn!("Sign-out after failed provisioning also failed: {}", sign_out_err);
        }
        return Err(AppError::Provisioning(e.message()));
    }

    info!("User {} logged in", user.id);
    Ok((session, user))
}

fn require(fields: &[(&str, &str)]) -> Result<(), AppError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(AppError::Validation(format!("{} is required", name))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedBackend;

    fn login_form(email: &str, password: &str) -> AuthForm {
        AuthForm {
            mode: AuthMode::Login,
            email: email.into(),
            password: password.into(),
            username: String::new(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_switches_to_login_mode() {
        let backend = ScriptedBackend::default();
        let form = AuthForm {
            mode: AuthMode::SignUp,
            email: "runner@example.com".into(),
            password: "secret1".into(),
            username: "miles".into(),
        };

        match submit(&backend, &form).await {
            AuthOutcome::SignedUp { view } => {
                assert_eq!(view.mode, AuthMode::Login);
                assert_eq!(view.message.as_deref(), Some(SIGN_UP_SUCCESS_MESSAGE));
                assert_eq!(view.error, None);
            }
            other => panic!("expected SignedUp, got {:?}", other),
        }
        assert_eq!(backend.calls("sign_in"), 0);
    }

    #[tokio::test]
    async fn test_sign_up_failure_is_verbatim() {
        let backend = ScriptedBackend {
            fail_sign_up: Some("User already registered".into()),
            ..Default::default()
        };
        let err = sign_up(&backend, "runner@example.com", "secret1", "miles")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
        assert_eq!(err.to_string(), "User already registered");
    }

    #[tokio::test]
    async fn test_sign_up_requires_username() {
        let backend = ScriptedBackend::default();
        let err = sign_up(&backend, "runner@example.com", "secret1", " ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(backend.calls("sign_up"), 0);
    }

    #[tokio::test]
    async fn test_login_provisions_then_succeeds() {
        let backend = ScriptedBackend::default();
        match submit(&backend, &login_form("runner@example.com", "secret1")).await {
            AuthOutcome::LoggedIn { session, user } => {
                assert_eq!(session.access_token, "token-1");
                assert_eq!(user.email.as_deref(), Some("runner@example.com"));
            }
            other => panic!("expected LoggedIn, got {:?}", other),
        }
        assert_eq!(backend.calls("provision"), 1);
    }

    #[tokio::test]
    async fn test_bad_credentials_stop_before_user_fetch() {
        let backend = ScriptedBackend {
            fail_sign_in: Some("Invalid login credentials".into()),
            ..Default::default()
        };
        match submit(&backend, &login_form("runner@example.com", "wrong")).await {
            AuthOutcome::Failed { view, error } => {
                assert!(matches!(error, AppError::Auth(_)));
                assert_eq!(view.error.as_deref(), Some("Invalid login credentials"));
                assert_eq!(view.mode, AuthMode::Login);
                assert_eq!(view.email, "runner@example.com");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        assert_eq!(backend.calls("get_user"), 0);
        assert_eq!(backend.calls("provision"), 0);
    }

    #[tokio::test]
    async fn test_user_fetch_failure_is_distinct() {
        let backend = ScriptedBackend {
            fail_get_user: Some("JWT expired".into()),
            ..Default::default()
        };
        let err = login(&backend, "runner@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
        assert_eq!(err.to_string(), "JWT expired");
        assert_eq!(backend.calls("provision"), 0);
    }

    #[tokio::test]
    async fn test_user_without_email() {
        let backend = ScriptedBackend {
            user_email: None,
            ..Default::default()
        };
        let err = login(&backend, "runner@example.com", "secret1").await.unwrap_err();
        assert_eq!(err.to_string(), "Email not found.");
        assert_eq!(backend.calls("provision"), 0);
    }

    #[tokio::test]
    async fn test_provisioning_failure_reports_login_succeeded() {
        let backend = ScriptedBackend {
            fail_provision: Some("permission denied for schema public".into()),
            ..Default::default()
        };
        match submit(&backend, &login_form("runner@example.com", "secret1")).await {
            AuthOutcome::Failed { error, view } => {
                assert!(matches!(error, AppError::Provisioning(_)));
                assert_eq!(
                    view.error.as_deref(),
                    Some("Login successful, but there was an error creating the runs table: permission denied for schema public")
                );
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        assert_eq!(backend.calls("sign_out"), 1);
    }

    #[tokio::test]
    async fn test_missing_password_never_reaches_backend() {
        let backend = ScriptedBackend::default();
        let err = login(&backend, "runner@example.com", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Password is required");
        assert_eq!(backend.calls("sign_in"), 0);
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(AuthMode::Login.toggled(), AuthMode::SignUp);
        assert_eq!(AuthMode::SignUp.toggled().as_str(), "login");
        assert_eq!(AuthMode::SignUp.title(), "Sign Up");
    }
}
