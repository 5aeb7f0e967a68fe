use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use hostelbyte_core::{AppError, ErrorResponse};
use hostelbyte_models::MessageResponse;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::rooms::model::{CreateRoomDto, Room, RoomImportSummary, UpdateRoomDto};
use crate::modules::rooms::service::RoomService;
use crate::state::AppState;
use crate::utils::upload::read_csv_field;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/rooms",
    request_body = CreateRoomDto,
    responses(
        (status = 201, description = "Room created", body = Room),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 409, description = "Room number already exists", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Rooms"
)]
#[instrument(skip(state, dto))]
pub async fn create_room(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateRoomDto>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    let room = RoomService::create(&state.store, dto).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

#[utoipa::path(
    get,
    path = "/api/rooms",
    responses(
        (status = 200, description = "Rooms ordered by room number", body = Vec<Room>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Rooms"
)]
#[instrument(skip(state))]
pub async fn get_rooms(State(state): State<AppState>) -> Result<Json<Vec<Room>>, AppError> {
    let rooms = RoomService::list(&state.store).await?;
    Ok(Json(rooms))
}

#[utoipa::path(
    put,
    path = "/api/rooms/{id}",
    params(
        ("id" = Uuid, Path, description = "Room ID")
    ),
    request_body = UpdateRoomDto,
    responses(
        (status = 200, description = "Capacity updated", body = Room),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 409, description = "Capacity below current occupancy", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Rooms"
)]
#[instrument(skip(state, dto))]
pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateRoomDto>,
) -> Result<Json<Room>, AppError> {
    let room = RoomService::update_capacity(&state.store, id, dto.capacity).await?;
    Ok(Json(room))
}

#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    params(
        ("id" = Uuid, Path, description = "Room ID")
    ),
    responses(
        (status = 200, description = "Room deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 409, description = "Room is occupied or still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Rooms"
)]
#[instrument(skip(state))]
pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    RoomService::delete(&state.store, id).await?;
    Ok(Json(MessageResponse::new("Room deleted successfully.")))
}

#[utoipa::path(
    post,
    path = "/api/rooms/upload",
    request_body(content_type = "multipart/form-data", description = "CSV file in the `file` field with room_number and capacity columns"),
    responses(
        (status = 201, description = "New rooms added, existing numbers skipped", body = RoomImportSummary),
        (status = 400, description = "Missing file, empty CSV or invalid row", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Rooms"
)]
#[instrument(skip(state, multipart))]
pub async fn upload_rooms(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<RoomImportSummary>), AppError> {
    let bytes = read_csv_field(multipart).await?;
    let summary = RoomService::import(&state.store, &bytes).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}
