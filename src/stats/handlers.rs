use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{FrequencyReport, RangeParams, VolumeParams};
use crate::{
    analytics::{
        exercise_frequency, exercise_progress, muscle_group_frequency, personal_records,
        summarize, volume_over_time, PersonalRecords, ProgressPoint, TrainingSummary,
        VolumePoint,
    },
    auth::AuthUser,
    domain::{WorkoutSession, WorkoutType},
    error::AppError,
    queries::QueryKey,
    state::AppState,
    store::{SessionQuery, WorkoutTypeQuery},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats/summary", get(summary))
        .route("/stats/volume", get(volume))
        .route("/stats/records/:exercise_id", get(records))
        .route("/stats/progress/:exercise_id", get(progress))
        .route("/stats/frequency", get(frequency))
}

/// Owner's sessions through the shared query cache, so repeated chart reads
/// between writes hit the store once.
async fn load_sessions(
    state: &AppState,
    user_id: Uuid,
    query: SessionQuery,
) -> Result<Arc<Vec<WorkoutSession>>, AppError> {
    let key = QueryKey::new(user_id, format!("sessions:{:?}", query));
    let gateway = &state.gateway;
    state
        .queries
        .sessions
        .fetch(key, || gateway.list_sessions(user_id, &query))
        .await
}

async fn load_types(state: &AppState, user_id: Uuid) -> Result<Arc<Vec<WorkoutType>>, AppError> {
    let query = WorkoutTypeQuery::default();
    let key = QueryKey::new(user_id, format!("workout_types:{:?}", query));
    let gateway = &state.gateway;
    state
        .queries
        .workout_types
        .fetch(key, || gateway.list_workout_types(user_id, &query))
        .await
}

fn bounded(from: Option<time::Date>, to: Option<time::Date>) -> SessionQuery {
    SessionQuery {
        from,
        to,
        ..SessionQuery::default()
    }
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<RangeParams>,
) -> Result<Json<TrainingSummary>, AppError> {
    let (from, to) = params.bounds()?;
    let sessions = load_sessions(&state, user_id, bounded(from, to)).await?;
    Ok(Json(summarize(&sessions)))
}

#[instrument(skip(state))]
pub async fn volume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<VolumeParams>,
) -> Result<Json<Vec<VolumePoint>>, AppError> {
    let range = params.range()?;
    if range.start > range.end {
        return Ok(Json(Vec::new()));
    }
    let sessions = load_sessions(&state, user_id, SessionQuery::between(range.start, range.end)).await?;
    Ok(Json(volume_over_time(&sessions, range, params.granularity)))
}

#[instrument(skip(state))]
pub async fn records(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exercise_id): Path<Uuid>,
) -> Result<Json<PersonalRecords>, AppError> {
    let sessions = load_sessions(&state, user_id, SessionQuery::default()).await?;
    Ok(Json(personal_records(&sessions, exercise_id)))
}

#[instrument(skip(state))]
pub async fn progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exercise_id): Path<Uuid>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<ProgressPoint>>, AppError> {
    let (from, to) = params.bounds()?;
    let sessions = load_sessions(&state, user_id, bounded(from, to)).await?;
    Ok(Json(exercise_progress(&sessions, exercise_id)))
}

#[instrument(skip(state))]
pub async fn frequency(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<RangeParams>,
) -> Result<Json<FrequencyReport>, AppError> {
    let (from, to) = params.bounds()?;
    let sessions = load_sessions(&state, user_id, bounded(from, to)).await?;
    let types = load_types(&state, user_id).await?;
    Ok(Json(FrequencyReport {
        exercises: exercise_frequency(&sessions),
        muscle_groups: muscle_group_frequency(&sessions, &types),
    }))
}
