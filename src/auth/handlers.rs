use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest};
use super::jwt::{AuthUser, JwtKeys};
use super::password::{hash_password, verify_password};
use super::repo;
use crate::error::{ok, ApiError, ApiResponse, ApiResult};
use crate::state::AppState;

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::validation("Password too short"));
    }
    if repo::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::validation("Email already registered"));
    }

    let hash = hash_password(&payload.password)?;
    let user = repo::create(&state.db, &payload.email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        ok(AuthResponse {
            access_token,
            refresh_token,
            user: PublicUser {
                id: user.id,
                email: user.email,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    payload.email = payload.email.trim().to_lowercase();

    let user = repo::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized("Invalid credentials".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<AuthResponse> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let user = repo::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    Ok(ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<PublicUser> {
    let user = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(ok(PublicUser {
        id: user.id,
        email: user.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(is_valid_email("nutri@example.com"));
        assert!(is_valid_email("maria.jose@clinica.ec"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@at@signs.com"));
        assert!(!is_valid_email("spaces in@mail.com"));
    }

    #[test]
    fn public_user_serializes_without_the_hash() {
        let user = repo::User {
            id: uuid::Uuid::new_v4(),
            email: "nutri@example.com".into(),
            password_hash: "secret".into(),
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&user).expect("serialize");
        assert!(json.contains("nutri@example.com"));
        assert!(!json.contains("secret"));
    }
}
