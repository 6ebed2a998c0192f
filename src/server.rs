//!
//! mergington HTTP server
//! ----------------------
//! This module defines the Axum-based HTTP API for the Mergington High School
//! activities catalog.
//!
//! Responsibilities:
//! - Teacher login issuing stateless bearer tokens.
//! - Public catalog listing and the root redirect to the static index.
//! - Signup/unregister endpoints gated on a verified teacher token.
//! - Startup wiring: credential load, token authority, seeded registry.
//!
//! Static assets themselves are served by an external collaborator; only the
//! redirect target is known here.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use anyhow::Context;

use crate::error::{AppError, AppResult};
use crate::identity::{Principal, SessionAuthority, SECRET_ENV};
use crate::registry::SharedRegistry;
use crate::security::CredentialStore;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
    pub credentials: Arc<CredentialStore>,
    pub authority: Arc<SessionAuthority>,
}

fn log_startup_config(http_port: u16, teachers_path: &str) {
    let cwd = std::env::current_dir().ok();
    let secret_set = std::env::var(SECRET_ENV).is_ok();
    info!(
        target: "startup",
        "mergington starting. http_port={}, teachers_file={}, cwd={:?}, {}={}",
        http_port,
        teachers_path,
        cwd,
        SECRET_ENV,
        if secret_set { "set" } else { "unset (development fallback)" }
    );
}

/// Start the HTTP server bound to the given port.
///
/// Loads teacher credentials (a corrupt file aborts startup), initializes the
/// session authority from the environment, seeds the activity catalog, and
/// mounts all routes.
pub async fn run_with_port(http_port: u16, teachers_path: &str) -> anyhow::Result<()> {
    log_startup_config(http_port, teachers_path);

    let credentials = CredentialStore::load(teachers_path)
        .with_context(|| format!("While loading teacher credentials from {}", teachers_path))?;
    if credentials.is_empty() {
        warn!("no teacher credentials loaded; every login will be rejected");
    } else {
        info!("loaded {} teacher credential(s)", credentials.len());
    }

    let authority = SessionAuthority::from_env();
    let registry = SharedRegistry::seeded();
    info!("seeded {} activities", registry.0.lock().len());

    let state = AppState {
        registry,
        credentials: Arc::new(credentials),
        authority: Arc::new(authority),
    };
    let app = router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Convenience entry point using the default port and credential file.
pub async fn run() -> anyhow::Result<()> {
    run_with_port(8000, "teachers.json").await
}

/// Mount all routes onto the given state. Split out from [`run_with_port`]
/// so tests can drive a fresh instance on an ephemeral port.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/activities", get(get_activities))
        .route("/login", post(login))
        .route("/activities/{name}/signup", post(signup))
        .route("/activities/{name}/unregister", delete(unregister))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct EmailParam {
    email: String,
}

fn error_response(err: &AppError) -> (StatusCode, Json<serde_json::Value>) {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"status": "error", "code": err.code_str(), "message": err.message()})))
}

/// Extract the token from `Authorization: Bearer <token>`; the scheme is
/// matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim())
}

fn require_teacher(state: &AppState, headers: &HeaderMap) -> AppResult<Principal> {
    let Some(token) = bearer_token(headers) else {
        return Err(AppError::unauthenticated(
            "missing_authorization",
            "Missing or invalid authorization",
        ));
    };
    state.authority.verify(token)
}

async fn root() -> Redirect {
    Redirect::temporary("/static/index.html")
}

async fn get_activities(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.registry.0.lock().list();
    Json(snapshot)
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> impl IntoResponse {
    if !state.credentials.authenticate(&payload.username, &payload.password) {
        info!(target: "identity", "login rejected user={}", payload.username);
        return error_response(&AppError::credentials("invalid_credentials", "Invalid credentials"));
    }
    match state.authority.issue(&payload.username) {
        Ok(token) => {
            info!(target: "identity", "login ok user={}", payload.username);
            (
                StatusCode::OK,
                Json(json!({"token": token, "role": "teacher", "username": payload.username})),
            )
        }
        Err(e) => {
            error!("token issue failed: {e}");
            error_response(&e)
        }
    }
}

async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Query(params): Query<EmailParam>,
) -> impl IntoResponse {
    let principal = match require_teacher(&state, &headers) {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };
    let result = state.registry.0.lock().signup(&name, &params.email, &principal);
    match result {
        Ok(message) => (StatusCode::OK, Json(json!({"message": message}))),
        Err(e) => error_response(&e),
    }
}

async fn unregister(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Query(params): Query<EmailParam>,
) -> impl IntoResponse {
    let principal = match require_teacher(&state, &headers) {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };
    let result = state.registry.0.lock().unregister(&name, &params.email, &principal);
    match result {
        Ok(message) => (StatusCode::OK, Json(json!({"message": message}))),
        Err(e) => error_response(&e),
    }
}
