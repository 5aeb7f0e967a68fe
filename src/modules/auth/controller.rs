use axum::{Json, extract::State};
use hostelbyte_core::{AppError, ErrorResponse};
use tracing::instrument;

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{AdminLoginRequest, LoginResponse, StudentLoginRequest};
use super::service::AuthService;

/// Login as a hostel administrator
#[utoipa::path(
    post,
    path = "/api/auth/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_admin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<AdminLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response =
        AuthService::login_admin(&state.store, &state.hasher, dto, &state.jwt_config).await?;
    Ok(Json(response))
}

/// Login as a student with roll number and password
#[utoipa::path(
    post,
    path = "/api/auth/student/login",
    request_body = StudentLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<StudentLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response =
        AuthService::login_student(&state.store, &state.hasher, dto, &state.jwt_config).await?;
    Ok(Json(response))
}
