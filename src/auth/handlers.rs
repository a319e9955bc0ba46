use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    account::Account,
    dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
    extractors::AuthUser,
    password::{hash_password, is_valid_email, verify_password, MIN_PASSWORD_LEN},
    tokens::{JwtKeys, TokenKind},
};
use crate::{
    domain::UserProfile,
    error::AppError,
    state::AppState,
    validation::{clean_text, ProfileInput},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).patch(update_me))
}

fn respond(state: &AppState, account: Account) -> Result<Json<AuthResponse>, AppError> {
    let tokens = JwtKeys::from_ref(state).issue_pair(account.id)?;
    Ok(Json(AuthResponse {
        tokens,
        user: PublicUser {
            id: account.id,
            email: account.email,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = payload.email.trim().to_lowercase();

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("email", "Invalid email"));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::validation(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    let display_name = clean_text(payload.display_name);
    if display_name.as_ref().is_some_and(|n| n.chars().count() > 60) {
        return Err(AppError::validation(
            "display_name",
            "Display name is limited to 60 characters",
        ));
    }

    let hash = hash_password(&payload.password)?;
    let account = state.accounts.create(&email, &hash).await?;

    // an account without a profile could never register again, so undo it
    if let Err(e) = state
        .gateway
        .create_profile(account.id, &account.email, display_name)
        .await
    {
        warn!(error = %e, user_id = %account.id, "profile creation failed, removing account");
        if let Err(cleanup) = state.accounts.delete(account.id).await {
            error!(error = %cleanup, user_id = %account.id, "account rollback failed");
        }
        return Err(e);
    }

    info!(user_id = %account.id, email = %account.email, "user registered");
    let body = respond(&state, account)?;
    Ok((StatusCode::CREATED, body))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(account) = state.accounts.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(&payload.password, &account.password_hash)? {
        warn!(email = %email, user_id = %account.id, "login invalid password");
        return Err(invalid());
    }

    info!(user_id = %account.id, "user logged in");
    respond(&state, account)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let claims = JwtKeys::from_ref(&state).verify(&payload.refresh_token, TokenKind::Refresh)?;
    let account = state
        .accounts
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    respond(&state, account)
}

/// The caller's profile, recreated from the account when it has gone missing.
async fn ensure_profile(state: &AppState, user_id: Uuid) -> Result<UserProfile, AppError> {
    match state.gateway.get_profile(user_id).await {
        Err(AppError::NotFound(_)) => {
            let account = state
                .accounts
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
            info!(%user_id, "missing profile recreated");
            state
                .gateway
                .create_profile(user_id, &account.email, None)
                .await
        }
        other => other,
    }
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(ensure_profile(&state, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ProfileInput>,
) -> Result<Json<UserProfile>, AppError> {
    let patch = payload.into_patch()?;
    ensure_profile(&state, user_id).await?;
    let profile = state.gateway.update_profile(user_id, patch).await?;
    info!(%user_id, "profile updated");
    Ok(Json(profile))
}
