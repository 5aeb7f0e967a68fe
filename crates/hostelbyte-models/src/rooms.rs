//! Room domain models and DTOs.
//!
//! A room's `current_occupancy` is a derived counter: it must always equal
//! the number of students whose `room_no` points at the room. It is only
//! ever moved by the enrollment and import workflows, never by room DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A room in the hostel.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Room {
    pub id: Uuid,
    pub room_number: String,
    pub capacity: i32,
    pub current_occupancy: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Room {
    /// Seats still free according to the persisted counter.
    pub fn free_beds(&self) -> i32 {
        (self.capacity - self.current_occupancy).max(0)
    }
}

/// DTO for creating a new room.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct CreateRoomDto {
    #[validate(length(min = 1, max = 20, message = "Room number is required"))]
    pub room_number: String,
    #[validate(range(min = 1, message = "Capacity must be a positive number."))]
    pub capacity: i32,
}

/// DTO for changing a room's capacity.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct UpdateRoomDto {
    #[validate(range(min = 1, message = "Capacity must be a positive number."))]
    pub capacity: i32,
}

/// A room row ready to be written by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub room_number: String,
    pub capacity: i32,
}

impl From<CreateRoomDto> for NewRoom {
    fn from(dto: CreateRoomDto) -> Self {
        Self {
            room_number: dto.room_number.trim().to_string(),
            capacity: dto.capacity,
        }
    }
}

/// Outcome of a bulk room upload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct RoomImportSummary {
    pub added: u64,
    pub skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_room_validation() {
        let dto = CreateRoomDto {
            room_number: "A-1".to_string(),
            capacity: 0,
        };
        assert!(dto.validate().is_err());

        let dto = CreateRoomDto {
            room_number: String::new(),
            capacity: 2,
        };
        assert!(dto.validate().is_err());

        let dto = CreateRoomDto {
            room_number: "A-1".to_string(),
            capacity: 2,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_new_room_trims_number() {
        let room = NewRoom::from(CreateRoomDto {
            room_number: "  B-2 ".to_string(),
            capacity: 3,
        });
        assert_eq!(room.room_number, "B-2");
    }

    #[test]
    fn test_free_beds() {
        let room = Room {
            id: Uuid::new_v4(),
            room_number: "A-1".to_string(),
            capacity: 3,
            current_occupancy: 1,
            created_at: chrono::Utc::now(),
        };
        assert_eq!(room.free_beds(), 2);
    }
}
