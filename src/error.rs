//! Domain errors for the hostel workflows.
//!
//! Workflows return [`HostelError`]; controllers convert it into an
//! [`AppError`] whose status follows the error's [`ErrorKind`].

use hostelbyte_core::AppError;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;
use crate::utils::notifier::NotifyError;

/// Coarse classification used for HTTP mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    DeliveryFailed,
    Internal,
}

#[derive(Debug, Error)]
pub enum HostelError {
    #[error("Room \"{room_number}\" not found.")]
    RoomNotFound { room_number: String },

    #[error("Room not found.")]
    UnknownRoom,

    #[error("Student not found")]
    StudentNotFound,

    #[error("Room \"{room_number}\" is full.")]
    RoomFull { room_number: String },

    #[error("Room number {room_number} already exists")]
    DuplicateRoom { room_number: String },

    #[error("A student with this roll number or email already exists")]
    DuplicateStudent,

    #[error("Cannot delete room. It is currently occupied by {occupancy} student(s).")]
    RoomOccupied { occupancy: i32 },

    #[error("Cannot delete room. It is still referenced by other records.")]
    RoomReferenced,

    #[error("Cannot set capacity to {requested}. This room already has {occupancy} students.")]
    CapacityBelowOccupancy { requested: i32, occupancy: i32 },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    DeliveryFailed(#[from] NotifyError),

    #[error("Failed to process credentials: {0}")]
    Credential(String),

    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<HostelError>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HostelError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Tags an error with the CSV line it came from.
    pub fn at_row(self, row: usize) -> Self {
        Self::Row {
            row,
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoomNotFound { .. } | Self::UnknownRoom | Self::StudentNotFound => {
                ErrorKind::NotFound
            }
            Self::RoomFull { .. }
            | Self::DuplicateRoom { .. }
            | Self::DuplicateStudent
            | Self::RoomOccupied { .. }
            | Self::RoomReferenced
            | Self::CapacityBelowOccupancy { .. } => ErrorKind::Conflict,
            Self::Validation(_) => ErrorKind::Validation,
            Self::DeliveryFailed(_) => ErrorKind::DeliveryFailed,
            Self::Credential(_) | Self::Store(_) => ErrorKind::Internal,
            Self::Row { source, .. } => source.kind(),
        }
    }
}

impl From<HostelError> for AppError {
    fn from(err: HostelError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => AppError::not_found(err),
            ErrorKind::Conflict => AppError::conflict(err),
            ErrorKind::Validation => AppError::bad_request(err),
            ErrorKind::DeliveryFailed => AppError::bad_gateway(err),
            ErrorKind::Internal => {
                error!(error = %err, "Unhandled hostel error");
                let message = match &err {
                    HostelError::Row { row, .. } => format!("Row {}: Internal server error", row),
                    _ => "Internal server error".to_string(),
                };
                AppError::internal_error(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_room_full_message() {
        let err = HostelError::RoomFull {
            room_number: "B-2".to_string(),
        };
        assert_eq!(err.to_string(), "Room \"B-2\" is full.");
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_row_prefix_and_kind() {
        let err = HostelError::RoomFull {
            room_number: "B-2".to_string(),
        }
        .at_row(3);
        assert_eq!(err.to_string(), "Row 3: Room \"B-2\" is full.");
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = HostelError::validation("Missing required fields").at_row(2);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_status_mapping() {
        let not_found: AppError = HostelError::StudentNotFound.into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let conflict: AppError = HostelError::RoomOccupied { occupancy: 2 }.into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let delivery: AppError =
            HostelError::from(NotifyError::DeliveryFailed("smtp down".to_string())).into();
        assert_eq!(delivery.status, StatusCode::BAD_GATEWAY);

        let validation: AppError = HostelError::validation("bad").into();
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = HostelError::Store(StoreError::Other {
            message: "connection reset by peer".to_string(),
        });
        let app: AppError = err.into();
        assert_eq!(app.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.error.to_string(), "Internal server error");

        let err = HostelError::Store(StoreError::Other {
            message: "boom".to_string(),
        })
        .at_row(4);
        let app: AppError = err.into();
        assert_eq!(app.error.to_string(), "Row 4: Internal server error");
    }
}
