use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use hostelbyte_core::{AppError, ErrorResponse, PaginationParams};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::modules::students::import::import_students;
use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, Student, StudentImportSummary, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::utils::upload::read_csv_field;
use crate::validator::ValidatedJson;

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadParams {
    /// Send welcome emails to imported students (default: true)
    pub notify: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student enrolled and welcome email sent", body = Student),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 409, description = "Room full or duplicate roll number/email", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 502, description = "Welcome email could not be delivered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student =
        StudentService::enroll(&state.store, &state.hasher, state.notifier.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    get,
    path = "/api/students",
    params(PaginationParams),
    responses(
        (status = 200, description = "Students ordered by name", body = PaginatedStudentsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    let response = StudentService::list(&state.store, &params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(
        ("id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student profile", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::get(&state.store, id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(
        ("id" = Uuid, Path, description = "Student ID")
    ),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Student or new room not found", body = ErrorResponse),
        (status = 409, description = "New room full or duplicate roll number/email", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::update(&state.store, &state.hasher, id, dto).await?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(
        ("id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    StudentService::delete(&state.store, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/students/upload",
    params(UploadParams),
    request_body(content_type = "multipart/form-data", description = "CSV file in the `file` field with columns name, roll_no, email, room_no and optional profile columns"),
    responses(
        (status = 201, description = "Every row imported", body = StudentImportSummary),
        (status = 400, description = "Missing file, empty CSV or invalid row", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "A row references an unknown room", body = ErrorResponse),
        (status = 409, description = "A row would overfill a room or duplicates a student", body = ErrorResponse),
        (status = 502, description = "A welcome email could not be delivered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, multipart))]
pub async fn upload_students(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<StudentImportSummary>), AppError> {
    let bytes = read_csv_field(multipart).await?;
    let notifier = params
        .notify
        .unwrap_or(true)
        .then(|| state.notifier.as_ref());

    let summary = import_students(&state.store, &state.hasher, notifier, &bytes).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}
