use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    routing::{get, patch, post},
    Json, Router,
};
use futures::Stream;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::ListParams;
use crate::{
    auth::AuthUser,
    domain::WorkoutSession,
    error::AppError,
    queries::QueryKey,
    sse,
    state::AppState,
    validation::{SessionInput, SessionPatchInput},
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/stream", get(stream_sessions))
        .route("/sessions/:id", get(get_session))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", patch(update_session).delete(delete_session))
}

#[instrument(skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<WorkoutSession>>, AppError> {
    let query = params.into_query()?;
    let key = QueryKey::new(user_id, format!("sessions:{:?}", query));
    let gateway = &state.gateway;
    let items = state
        .queries
        .sessions
        .fetch(key, || gateway.list_sessions(user_id, &query))
        .await?;
    Ok(Json(items.as_ref().clone()))
}

/// Live list: one `snapshot` event now and another after every change.
#[instrument(skip(state))]
pub async fn stream_sessions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let query = params.into_query()?;
    info!(%user_id, live = state.gateway.live_subscriptions(), "session stream opened");
    Ok(sse::snapshots(state.gateway.watch_sessions(user_id, query)))
}

#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkoutSession>, AppError> {
    Ok(Json(state.gateway.get_session(user_id, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SessionInput>,
) -> Result<(StatusCode, Json<WorkoutSession>), AppError> {
    let draft = payload.into_draft()?;
    let created = state.gateway.create_session(user_id, draft).await?;
    state.queries.invalidate_owner(user_id).await;
    info!(%user_id, session_id = %created.id, exercises = created.exercises.len(), "session logged");
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, payload))]
pub async fn update_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SessionPatchInput>,
) -> Result<Json<WorkoutSession>, AppError> {
    let patch = payload.into_patch()?;
    let updated = state.gateway.update_session(user_id, id, patch).await?;
    state.queries.invalidate_owner(user_id).await;
    info!(%user_id, session_id = %id, "session updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.gateway.delete_session(user_id, id).await?;
    state.queries.invalidate_owner(user_id).await;
    info!(%user_id, session_id = %id, "session deleted");
    Ok(StatusCode::NO_CONTENT)
}
