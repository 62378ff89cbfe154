use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, GoalRequest, GoalResponse, LoginRequest, PublicUser, RefreshRequest,
            RegisterRequest,
        },
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    meals::seed::seed_demo_meals,
    state::AppState,
};

const DEMO_USERNAME: &str = "__demo__";
const DEMO_DISPLAY_NAME: &str = "Demo";
const DEMO_PASSWORD: &str = "demo";
const DEMO_GOAL: i64 = 2200;

fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{1,64}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

fn issue_tokens(keys: &JwtKeys, user_id: i64) -> Result<(String, String), ApiError> {
    let access_token = keys.sign_access(user_id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        ApiError::Internal(e)
    })?;
    let refresh_token = keys.sign_refresh(user_id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        ApiError::Internal(e)
    })?;
    Ok((access_token, refresh_token))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.username = payload.username.trim().to_string();

    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err(ApiError::InvalidArgument("Invalid username".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too weak");
        return Err(ApiError::InvalidArgument("Password too weak".into()));
    }

    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::Conflict("User already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.username, &hash, payload.goal).await?;

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = issue_tokens(&keys, user.id)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = match User::find_by_username(&state.db, &payload.username).await? {
        Some(u) => u,
        None => {
            warn!(username = %payload.username, "login unknown username");
            return Err(ApiError::NotFound("User not found".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized);
    }

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = issue_tokens(&keys, user.id)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        ApiError::Unauthorized
    })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let (access_token, refresh_token) = issue_tokens(&keys, user.id)?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
        },
    }))
}

/// Logs into the shared demo account, reseeding its meal history so the
/// dashboard has data right away.
#[instrument(skip(state))]
pub async fn demo_login(State(state): State<AppState>) -> Result<Json<AuthResponse>, ApiError> {
    let user = match User::find_by_username(&state.db, DEMO_USERNAME).await? {
        Some(u) => u,
        None => {
            let hash = hash_password(DEMO_PASSWORD)?;
            User::create(&state.db, DEMO_USERNAME, &hash, DEMO_GOAL).await?
        }
    };

    seed_demo_meals(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = issue_tokens(&keys, user.id)?;

    info!(user_id = %user.id, "demo login");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: DEMO_DISPLAY_NAME.into(),
        },
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(PublicUser {
        id: user.id,
        username: user.username,
    }))
}

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<GoalResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(GoalResponse { goal: user.goal }))
}

#[instrument(skip(state, payload))]
pub async fn set_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<GoalRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    User::set_goal(&state.db, user_id, payload.goal).await?;
    info!(user_id = %user_id, goal = payload.goal, "goal updated");
    Ok((StatusCode::CREATED, Json(json!({ "ok": true }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_validation() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("user_1.2-3"));
        assert!(is_valid_username("__demo__"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("has spaces"));
        assert!(!is_valid_username("tab\there"));
    }
}
