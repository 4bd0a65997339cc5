//! Client for a hosted Supabase-style backend (GoTrue auth + PostgREST tables).

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::Backend;
use crate::error::BackendError;
use crate::models::{NewRun, Run, Session, User};

pub const DEFAULT_PROVISION_RPC: &str = "create_runs_table";
pub const DEFAULT_RUNS_TABLE: &str = "runs";

#[derive(Debug, Clone)]
pub struct HostedConfig {
    /// Project URL, e.g. https://project.supabase.co
    pub url: String,
    /// Public anon key sent as the `apikey` header
    pub anon_key: String,
    pub provision_rpc: String,
    pub runs_table: String,
    pub request_timeout: Option<Duration>,
}

impl HostedConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            provision_rpc: DEFAULT_PROVISION_RPC.to_string(),
            runs_table: DEFAULT_RUNS_TABLE.to_string(),
            request_timeout: None,
        }
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Row shape for inserts: the run plus its owner
#[derive(Serialize)]
struct OwnedRun<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    run: &'a NewRun,
}

pub struct HostedBackend {
    client: Client,
    base: Url,
    config: HostedConfig,
}

impl HostedBackend {
    pub fn new(config: HostedConfig) -> Result<Self, BackendError> {
        let mut base = Url::parse(&config.url)
            .map_err(|e| BackendError::Rejected(format!("Invalid backend url '{}': {}", config.url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|e| BackendError::Rejected(format!("Invalid endpoint '{}': {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.config.anon_key))
    }

    fn authed(
        &self,
        method: Method,
        path: &str,
        session: &Session,
    ) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .request(method, path)?
            .bearer_auth(&session.access_token))
    }

    fn runs_path(&self) -> String {
        format!("rest/v1/{}", self.config.runs_table)
    }
}

#[async_trait]
impl Backend for HostedBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> Result<User, BackendError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "username": username },
        });
        let response = self
            .request(Method::POST, "auth/v1/signup")?
            .json(&body)
            .send()
            .await?;
        let value: Value = check(response).await?.json().await?;

        // With email confirmation disabled the user comes wrapped in a session
        let user = user_from_json(value.get("user").unwrap_or(&value))?;
        info!("Signed up {}", email);
        Ok(user)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let response = self
            .request(Method::POST, "auth/v1/token?grant_type=password")?
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;

        Ok(Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        })
    }

    async fn get_user(&self, session: &Session) -> Result<User, BackendError> {
        let response = self
            .authed(Method::GET, "auth/v1/user", session)?
            .send()
            .await?;
        let value: Value = check(response).await?.json().await?;
        user_from_json(&value)
    }

    async fn provision(&self, session: &Session, user: &User) -> Result<(), BackendError> {
        let email = user
            .email
            .as_deref()
            .ok_or_else(|| BackendError::Rejected("Email not found.".to_string()))?;
        let path = format!("rest/v1/rpc/{}", self.config.provision_rpc);
        let response = self
            .authed(Method::POST, &path, session)?
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn select_runs(&self, session: &Session, user: &User) -> Result<Vec<Run>, BackendError> {
        let user_filter = format!("eq.{}", user.id);
        let response = self
            .authed(Method::GET, &self.runs_path(), session)?
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "date.desc"),
            ])
            .send()
            .await?;
        let text = check(response).await?.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| BackendError::Decode(format!("Failed to parse runs: {}", e)))
    }

    async fn insert_run(
        &self,
        session: &Session,
        user: &User,
        run: &NewRun,
    ) -> Result<Vec<Run>, BackendError> {
        let rows = [OwnedRun {
            user_id: &user.id,
            run,
        }];
        let response = self
            .authed(Method::POST, &self.runs_path(), session)?
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;
        let text = check(response).await?.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| BackendError::Decode(format!("Failed to parse inserted run: {}", e)))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), BackendError> {
        let response = self
            .authed(Method::POST, "auth/v1/logout", session)?
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into an error carrying the remote message
async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BackendError::Unauthorized(message));
    }
    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}

/// GoTrue and PostgREST disagree on the error field name
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => ["msg", "message", "error_description", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

fn user_from_json(value: &Value) -> Result<User, BackendError> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::Decode("User response is missing an id".to_string()))?;
    let email = value
        .get("email")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
        .map(str::to_string);
    let username = value
        .pointer("/user_metadata/username")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(User {
        id: id.to_string(),
        email,
        username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_field_precedence() {
        assert_eq!(
            error_message(r#"{"code":400,"msg":"User already registered"}"#).as_deref(),
            Some("User already registered")
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
                .as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(
            error_message(r#"{"message":"relation \"runs\" does not exist"}"#).as_deref(),
            Some("relation \"runs\" does not exist")
        );
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message("  "), None);
    }

    #[test]
    fn test_user_from_json_reads_metadata() {
        let value = serde_json::json!({
            "id": "8d0f",
            "email": "runner@example.com",
            "user_metadata": { "username": "miles" }
        });
        let user = user_from_json(&value).unwrap();
        assert_eq!(user.id, "8d0f");
        assert_eq!(user.email.as_deref(), Some("runner@example.com"));
        assert_eq!(user.username.as_deref(), Some("miles"));
    }

    #[test]
    fn test_user_from_json_treats_blank_email_as_missing() {
        let user = user_from_json(&serde_json::json!({ "id": "1", "email": "" })).unwrap();
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let backend = HostedBackend::new(HostedConfig::new("http://localhost:54321/proxy", "key")).unwrap();
        assert_eq!(
            backend.endpoint("auth/v1/user").unwrap().as_str(),
            "http://localhost:54321/proxy/auth/v1/user"
        );
    }
}
