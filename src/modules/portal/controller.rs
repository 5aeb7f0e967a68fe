use axum::{Json, extract::State};
use hostelbyte_core::{AppError, ErrorResponse};
use hostelbyte_models::{ChangePasswordDto, MessageResponse, Student};
use tracing::instrument;

use crate::middleware::auth::StudentUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::PortalService;

#[utoipa::path(
    get,
    path = "/api/portal/profile",
    responses(
        (status = 200, description = "Logged-in student's profile", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Students only", body = ErrorResponse),
        (status = 404, description = "Student profile not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Student Portal"
)]
#[instrument(skip(state, student))]
pub async fn get_profile(
    State(state): State<AppState>,
    student: StudentUser,
) -> Result<Json<Student>, AppError> {
    let profile = PortalService::profile(&state.store, student.student_id()?).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/portal/password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password is incorrect", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Students only", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Student Portal"
)]
#[instrument(skip(state, student, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    student: StudentUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    PortalService::change_password(&state.store, &state.hasher, student.student_id()?, dto).await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
