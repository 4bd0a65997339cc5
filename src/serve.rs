use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use log::{info, warn};
use serde::Deserialize;
use std::sync::Arc as StdArc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::{self, AuthForm, AuthMode, AuthOutcome, AuthView};
use crate::backend::{Backend, HostedBackend, LocalBackend};
use crate::config::{AppConfig, BackendConfig};
use crate::constants::{RUNS_ROUTE, SESSION_COOKIE};
use crate::error::AppError;
use crate::models::{RunForm, Session};
use crate::pages::{render_auth_page, render_runs_page};
use crate::runs::{add_run, fetch_runs, RunsPage};
use crate::stats::RunStats;

type DynError = Box<dyn std::error::Error + Send + Sync>;

const STYLE_CSS: &str = include_str!("../assets/style.css");

// Shared by every handler
pub struct AppState {
    pub backend: StdArc<dyn Backend>,
}

impl AppState {
    pub fn new(backend: StdArc<dyn Backend>) -> Self {
        Self { backend }
    }
}

/// Build the configured backend
pub async fn connect_backend(config: &BackendConfig) -> Result<StdArc<dyn Backend>, DynError> {
    match config {
        BackendConfig::Hosted(settings) => {
            let backend = HostedBackend::new(settings.to_hosted_config()?)?;
            Ok(StdArc::new(backend))
        }
        BackendConfig::Local(settings) => {
            let backend = LocalBackend::open(&settings.sqlite_file).await?;
            Ok(StdArc::new(backend))
        }
    }
}

/// Serve the web app until the process is stopped (for serve command)
pub fn serve(config: AppConfig) -> Result<(), DynError> {
    let addr = format!("{}:{}", config.bind, config.port);

    match &config.backend {
        BackendConfig::Hosted(settings) => println!("Backend: hosted ({})", settings.url),
        BackendConfig::Local(settings) => {
            println!("Backend: local ({})", settings.sqlite_file.display())
        }
    }
    println!("Listening on: http://{}", addr);
    println!("Endpoints:");
    println!("  GET  /?mode=login|signup  - Auth page");
    println!("  POST /auth  - Submit sign-up or login");
    println!("  GET  /runs  - Runs page");
    println!("  POST /runs  - Add a run");
    println!("  POST /logout  - Sign out");
    println!("  GET  /api/runs  - Runs as JSON");
    println!("  POST /api/runs  - Add a run (JSON)");
    println!("  GET  /api/stats  - Run statistics as JSON");
    println!("  GET  /health  - Health check");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let backend = connect_backend(&config.backend).await?;
        let app_state = StdArc::new(AppState::new(backend));

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;
        run_server(listener, app_state)
            .await
            .map_err(|e| format!("Server error: {}", e))?;

        Ok::<(), DynError>(())
    })
}

/// Serve on an already bound listener
pub async fn run_server(listener: TcpListener, state: StdArc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, build_router(state)).await
}

pub fn build_router(state: StdArc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/api/runs", get(api_runs_handler).post(api_add_run_handler))
        .route("/api/stats", get(api_stats_handler))
        .layer(cors);

    Router::new()
        .route("/", get(auth_page_handler))
        .route("/auth", post(auth_submit_handler))
        .route(RUNS_ROUTE, get(runs_page_handler).post(runs_submit_handler))
        .route("/logout", post(logout_handler))
        .route("/health", get(health_handler))
        .route("/assets/style.css", get(style_handler))
        .merge(api_routes)
        .with_state(state)
}

/// Token from the session cookie, if any
fn session_from_cookie(headers: &HeaderMap) -> Option<Session> {
    let prefix = format!("{}=", SESSION_COOKIE);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(prefix.as_str()))
        .find(|token| !token.is_empty())
        .map(Session::new)
}

/// Bearer token first, then the session cookie
fn session_from_request(headers: &HeaderMap) -> Option<Session> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    match bearer {
        Some(token) => Some(Session::new(token)),
        None => session_from_cookie(headers),
    }
}

fn session_cookie(token: &str) -> String {
    format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, token)
}

fn cleared_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

#[derive(Debug, Deserialize)]
struct AuthPageQuery {
    mode: Option<AuthMode>,
}

async fn auth_page_handler(Query(query): Query<AuthPageQuery>) -> Html<String> {
    let view = AuthView::new(query.mode.unwrap_or_default());
    Html(render_auth_page(&view))
}

async fn auth_submit_handler(
    State(state): State<StdArc<AppState>>,
    Form(form): Form<AuthForm>,
) -> Response {
    match auth::submit(state.backend.as_ref(), &form).await {
        AuthOutcome::LoggedIn { session, .. } => (
            StatusCode::SEE_OTHER,
            [
                (header::LOCATION, RUNS_ROUTE.to_string()),
                (header::SET_COOKIE, session_cookie(&session.access_token)),
            ],
        )
            .into_response(),
        AuthOutcome::SignedUp { view } => Html(render_auth_page(&view)).into_response(),
        AuthOutcome::Failed { view, .. } => Html(render_auth_page(&view)).into_response(),
    }
}

async fn runs_page_handler(State(state): State<StdArc<AppState>>, headers: HeaderMap) -> Response {
    let Some(session) = session_from_cookie(&headers) else {
        return Redirect::to("/").into_response();
    };
    let page = RunsPage::load(state.backend.as_ref(), &session).await;
    Html(render_runs_page(&page)).into_response()
}

async fn runs_submit_handler(
    State(state): State<StdArc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<RunForm>,
) -> Response {
    let Some(session) = session_from_cookie(&headers) else {
        return Redirect::to("/").into_response();
    };
    let mut page = RunsPage::load(state.backend.as_ref(), &session).await;
    if page.submit(state.backend.as_ref(), &session, form).await {
        // Post/redirect/get so a refresh does not add the run twice
        return Redirect::to(RUNS_ROUTE).into_response();
    }
    Html(render_runs_page(&page)).into_response()
}

async fn logout_handler(State(state): State<StdArc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(session) = session_from_cookie(&headers) {
        match state.backend.sign_out(&session).await {
            Ok(()) => info!("Session signed out"),
            Err(e) => warn!("Sign-out failed: {}", e),
        }
    }
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, cleared_session_cookie()),
        ],
    )
        .into_response()
}

fn require_session(headers: &HeaderMap) -> Result<Session, AppError> {
    session_from_request(headers)
        .ok_or_else(|| AppError::UserNotFound("Not signed in".to_string()))
}

async fn api_runs_handler(
    State(state): State<StdArc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let session = require_session(&headers)?;
    let runs = fetch_runs(state.backend.as_ref(), &session).await?;
    Ok(Json(runs))
}

async fn api_add_run_handler(
    State(state): State<StdArc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<RunForm>,
) -> Result<impl IntoResponse, AppError> {
    let session = require_session(&headers)?;
    let inserted = add_run(state.backend.as_ref(), &session, &form).await?;
    Ok((StatusCode::CREATED, Json(inserted)))
}

async fn api_stats_handler(
    State(state): State<StdArc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let session = require_session(&headers)?;
    let runs = fetch_runs(state.backend.as_ref(), &session).await?;
    Ok(Json(RunStats::from_runs(&runs).summary()))
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn style_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLE_CSS,
    )
}
