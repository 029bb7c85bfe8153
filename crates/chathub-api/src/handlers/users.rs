//! Account handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use chathub_entity::user::{User, UserSummary};
use chathub_service::user::AuthResult;

use crate::dto::request::{LoginRequest, RegisterRequest, UpdateProfileRequest, validate_body};
use crate::dto::response::ProfileUpdatedResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResult>)> {
    validate_body(&req)?;
    let result = state
        .user_service
        .register(&req.first_name, &req.last_name, &req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResult>> {
    validate_body(&req)?;
    let result = state.user_service.login(&req.email, &req.password).await?;
    Ok(Json(result))
}

/// GET /api/users/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<User>> {
    Ok(Json(state.user_service.get_profile(&auth).await?))
}

/// PUT /api/users/update
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileUpdatedResponse>> {
    validate_body(&req)?;
    let user = state
        .user_service
        .update_profile(&auth, req.into())
        .await?;
    Ok(Json(ProfileUpdatedResponse {
        message: "Profile updated successfully".to_string(),
        user,
    }))
}

/// GET /api/conversations/users/list
pub async fn list_others(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.user_service.list_others(&auth).await?))
}
