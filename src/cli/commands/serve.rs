//! HTTP API server.
//!
//! Each client creates a session, supplies its API key, and posts questions.
//! Sessions live in memory for the lifetime of the server process.

use crate::assistant::{Assistant, Submission};
use crate::cli::Output;
use crate::config::Settings;
use crate::session::{Credential, Message, SessionStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use uuid::Uuid;

/// Shared application state.
pub(crate) struct AppState {
    assistant: Assistant,
    sessions: SessionStore,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let assistant = Assistant::hosted(settings, None)?;
    let state = Arc::new(AppState {
        assistant,
        sessions: SessionStore::new(),
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("MathGPT API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("New session", "POST   /sessions");
    Output::kv("Set API key", "PUT    /sessions/{id}/credential");
    Output::kv("Transcript", "GET    /sessions/{id}/messages");
    Output::kv("Ask", "POST   /sessions/{id}/messages");
    Output::kv("End session", "DELETE /sessions/{id}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

pub(crate) fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", axum::routing::delete(delete_session))
        .route("/sessions/{id}/credential", put(set_credential))
        .route("/sessions/{id}/messages", get(list_messages).post(post_message))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct CreateSessionRequest {
    #[serde(default)]
    api_key: Option<String>,
}

#[derive(Serialize)]
struct CreateSessionResponse {
    session_id: Uuid,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct CredentialRequest {
    api_key: String,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct MessagesResponse {
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn session_not_found(id: Uuid) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Session not found: {}", id),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let credential = req.api_key.and_then(Credential::new);
    let session = state.assistant.new_session(credential);
    let messages = session.conversation().all().to_vec();
    let session_id = state.sessions.insert(session).await;

    info!("Created session {}", session_id);

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            messages,
        }),
    )
}

async fn set_credential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CredentialRequest>,
) -> impl IntoResponse {
    let Some(session) = state.sessions.get(&id).await else {
        return session_not_found(id);
    };

    session.lock().await.set_credential(Credential::new(req.api_key));
    StatusCode::NO_CONTENT.into_response()
}

async fn list_messages(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let Some(session) = state.sessions.get(&id).await else {
        return session_not_found(id);
    };

    let messages = session.lock().await.conversation().all().to_vec();
    Json(MessagesResponse { messages }).into_response()
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let Some(session) = state.sessions.get(&id).await else {
        return session_not_found(id);
    };

    // Held for the whole run: one submission at a time per session.
    let mut session = session.lock().await;
    let outcome = state.assistant.submit(&mut session, &req.question).await;

    let status = match &outcome {
        Submission::Answered { .. } => StatusCode::OK,
        Submission::Locked { .. } => StatusCode::UNAUTHORIZED,
        Submission::EmptyQuestion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Submission::Failed { .. } => StatusCode::BAD_GATEWAY,
    };

    (status, Json(outcome)).into_response()
}

async fn delete_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> impl IntoResponse {
    if state.sessions.remove(&id).await {
        info!("Closed session {}", id);
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_not_found(id)
    }
}
