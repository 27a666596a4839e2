//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::bot::{Command, Reply, deliver};
use crate::domain::{ExternalId, MessageId};
use crate::stations::DEFAULT_SEARCH_LIMIT;
use crate::trips::Profile;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations/search", get(search_stations))
        .route("/users/:id/start", post(start))
        .route("/users/:id/newtrip", post(new_trip))
        .route("/users/:id/help", post(help))
        .route("/users/:id/cancel", post(cancel))
        .route("/users/:id/text", post(text))
        .route("/users/:id/select", post(select))
        .route("/users/:id/trips", get(trips))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stations by name.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Json<StationSearchResponse> {
    let limit = req.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(50);
    Json(StationSearchResponse {
        stations: state.stations.search(&req.q, limit),
    })
}

fn external_id(raw: i64) -> Result<ExternalId, AppError> {
    if raw == 0 {
        return Err(AppError::BadRequest {
            message: "user id must be non-zero".into(),
        });
    }
    Ok(ExternalId(raw))
}

/// Push `reply` to the user and wrap it for the response body.
///
/// Delivery failures are logged; the caller still gets the reply.
async fn respond(
    state: &AppState,
    chat: ExternalId,
    pressed: Option<MessageId>,
    reply: Reply,
) -> Json<ReplyResponse> {
    let message_id = match deliver(&state.channel, chat, pressed, &reply).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(%chat, error = %e, "reply delivery failed");
            None
        }
    };
    Json(ReplyResponse { reply, message_id })
}

async fn start(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<StartRequest>,
) -> Result<Json<ReplyResponse>, AppError> {
    let chat = external_id(id)?;
    let mut profile = Profile::new(chat, req.name);
    if let Some(username) = req.username {
        profile = profile.with_username(username);
    }

    let reply = state.controller.welcome(&profile).await;
    Ok(respond(&state, chat, None, reply).await)
}

/// Start a booking. Users who skipped `start` are registered without a
/// name.
async fn new_trip(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReplyResponse>, AppError> {
    let chat = external_id(id)?;
    let reply = state.controller.new_trip(&Profile::new(chat, "")).await;
    Ok(respond(&state, chat, None, reply).await)
}

async fn help(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReplyResponse>, AppError> {
    let chat = external_id(id)?;
    let reply = state.controller.help();
    Ok(respond(&state, chat, None, reply).await)
}

async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReplyResponse>, AppError> {
    let chat = external_id(id)?;
    let reply = state.controller.cancel(chat).await;
    Ok(respond(&state, chat, None, reply).await)
}

async fn text(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TextRequest>,
) -> Result<Json<ReplyResponse>, AppError> {
    let chat = external_id(id)?;
    let reply = state.controller.handle_text(chat, &req.text).await;
    Ok(respond(&state, chat, None, reply).await)
}

/// A button press. The token is decoded here, once; a bad token never
/// reaches the conversation.
async fn select(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<ReplyResponse>, AppError> {
    let chat = external_id(id)?;
    let command = Command::decode(&req.token).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let reply = state.controller.handle_command(chat, command).await;
    Ok(respond(&state, chat, req.message_id, reply).await)
}

async fn trips(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReplyResponse>, AppError> {
    let chat = external_id(id)?;
    let reply = state.controller.my_trips(chat).await;
    Ok(respond(&state, chat, None, reply).await)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
        };

        tracing::debug!(%status, error = %message, "request rejected");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
