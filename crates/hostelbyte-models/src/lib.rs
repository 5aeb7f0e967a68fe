//! # Hostelbyte Models
//!
//! Domain models and DTOs for the Hostelbyte API.
//!
//! # Modules
//!
//! - [`auth`]: Login requests and token responses
//! - [`rooms`]: Rooms, room DTOs, and bulk room import summaries
//! - [`students`]: Students, enrollment DTOs, and batch import summaries

pub mod auth;
pub mod rooms;
pub mod students;

// Re-export commonly used types at crate root for convenience
pub use auth::{AdminLoginRequest, LoginResponse, MessageResponse, StudentLoginRequest};

pub use rooms::{CreateRoomDto, NewRoom, Room, RoomImportSummary, UpdateRoomDto};

pub use students::{
    ChangePasswordDto, CreateStudentDto, NewStudent, PaginatedStudentsResponse, RoomAllocation,
    Student, StudentChanges, StudentImportSummary, StudentSummary, UpdateStudentDto,
};
