//! The conversational endpoint.
//!
//! - `GET  /`         — hello banner
//! - `POST /ai-chats` — one authenticated conversation turn

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use medibot_agent::Dispatcher;
use medibot_core::domain::patient::PatientId;
use medibot_db::repositories::PatientRepository;

use crate::auth;

#[derive(Clone)]
pub struct ChatState {
    pub dispatcher: Arc<Dispatcher>,
    pub patients: Arc<dyn PatientRepository>,
    pub jwt_secret: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
}

impl ChatResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self { success: true, message: message.into() })
    }

    fn failed(message: impl Into<String>) -> Json<Self> {
        Json(Self { success: false, message: message.into() })
    }
}

pub fn router(state: ChatState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ai-chats", post(ai_chats))
        .with_state(state)
}

pub async fn index() -> Json<ChatResponse> {
    ChatResponse::ok("MediBot is up and running.")
}

pub async fn ai_chats(
    State(state): State<ChatState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let claims = match auth::authenticate(&headers, &state.jwt_secret) {
        Ok(claims) => claims,
        Err(error) => {
            tracing::info!(event_name = "server.chat.unauthorized", error = %error, "rejected chat request");
            return (
                StatusCode::UNAUTHORIZED,
                ChatResponse::failed("Please log in to chat with MediBot."),
            );
        }
    };

    let patient = match resolve_patient(&state, &claims.sub).await {
        Ok(patient) => patient,
        Err(response) => return response,
    };

    let input = request.input.trim();
    if input.is_empty() {
        return (StatusCode::BAD_REQUEST, ChatResponse::failed("Please type a message."));
    }

    // The model only ever sees the id through this note; tools need it to
    // act on the right record.
    let message =
        format!("{input}\n\nMy name is {} and my patient id is {}.", patient.name, patient.id);

    match state.dispatcher.run(&message).await {
        Ok(reply) => (StatusCode::OK, ChatResponse::ok(reply)),
        Err(error) => {
            tracing::error!(event_name = "server.chat.agent_error", error = %error, "agent turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ChatResponse::failed("Something went wrong. Please try again later."),
            )
        }
    }
}

async fn resolve_patient(
    state: &ChatState,
    raw_id: &str,
) -> Result<medibot_core::domain::patient::Patient, (StatusCode, Json<ChatResponse>)> {
    let not_found =
        || (StatusCode::UNAUTHORIZED, ChatResponse::failed("Unknown patient session."));

    let id = PatientId::parse(raw_id).ok_or_else(not_found)?;
    match state.patients.find_by_id(&id).await {
        Ok(Some(patient)) => Ok(patient),
        Ok(None) => Err(not_found()),
        Err(error) => {
            tracing::error!(event_name = "server.chat.store_error", error = %error, "patient lookup failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                ChatResponse::failed("Something went wrong. Please try again later."),
            ))
        }
    }
}
