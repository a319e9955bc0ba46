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

use super::dto::{DefaultsLoaded, ListParams};
use crate::{
    auth::AuthUser,
    domain::WorkoutType,
    error::AppError,
    queries::QueryKey,
    sse,
    state::AppState,
    validation::{WorkoutTypeInput, WorkoutTypePatchInput},
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/workout-types", get(list_workout_types))
        .route("/workout-types/stream", get(stream_workout_types))
        .route("/workout-types/:id", get(get_workout_type))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/workout-types", post(create_workout_type))
        .route("/workout-types/defaults", post(load_defaults))
        .route(
            "/workout-types/:id",
            patch(update_workout_type).delete(delete_workout_type),
        )
}

#[instrument(skip(state))]
pub async fn list_workout_types(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<WorkoutType>>, AppError> {
    let query = params.into_query();
    let key = QueryKey::new(user_id, format!("workout_types:{:?}", query));
    let gateway = &state.gateway;
    let items = state
        .queries
        .workout_types
        .fetch(key, || gateway.list_workout_types(user_id, &query))
        .await?;
    Ok(Json(items.as_ref().clone()))
}

/// Live catalogue: one `snapshot` event now and another after every change.
#[instrument(skip(state))]
pub async fn stream_workout_types(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(%user_id, live = state.gateway.live_subscriptions(), "workout type stream opened");
    sse::snapshots(state.gateway.watch_workout_types(user_id, params.into_query()))
}

#[instrument(skip(state))]
pub async fn get_workout_type(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkoutType>, AppError> {
    Ok(Json(state.gateway.get_workout_type(user_id, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_workout_type(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<WorkoutTypeInput>,
) -> Result<(StatusCode, Json<WorkoutType>), AppError> {
    let draft = payload.into_draft()?;
    let created = state.gateway.create_workout_type(user_id, draft).await?;
    state.queries.invalidate_owner(user_id).await;
    info!(%user_id, workout_type_id = %created.id, "workout type created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state))]
pub async fn load_defaults(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DefaultsLoaded>, AppError> {
    let items = state.gateway.load_default_workout_types(user_id).await?;
    state.queries.invalidate_owner(user_id).await;
    Ok(Json(DefaultsLoaded {
        created: items.len(),
        items,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_workout_type(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<WorkoutTypePatchInput>,
) -> Result<Json<WorkoutType>, AppError> {
    let patch = payload.into_patch()?;
    let updated = state.gateway.update_workout_type(user_id, id, patch).await?;
    state.queries.invalidate_owner(user_id).await;
    info!(%user_id, workout_type_id = %id, "workout type updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_workout_type(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.gateway.delete_workout_type(user_id, id).await?;
    state.queries.invalidate_owner(user_id).await;
    info!(%user_id, workout_type_id = %id, "workout type deleted");
    Ok(StatusCode::NO_CONTENT)
}
