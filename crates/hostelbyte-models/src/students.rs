//! Student domain models and DTOs.
//!
//! This module contains all data structures related to student management,
//! including the student entity, enrollment/update DTOs, the rows handed to
//! the store, and batch import summaries.

use chrono::NaiveDate;
use hostelbyte_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A student as returned by the API. The password hash never leaves the store.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub roll_no: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub room_no: Option<String>,
    pub department: Option<String>,
    pub year: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Listing projection of a student.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub roll_no: String,
    pub department: Option<String>,
    pub year: Option<i32>,
    pub room_no: Option<String>,
}

impl From<&Student> for StudentSummary {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            roll_no: student.roll_no.clone(),
            department: student.department.clone(),
            year: student.year,
            room_no: student.room_no.clone(),
        }
    }
}

/// Paginated response containing students.
#[derive(Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<StudentSummary>,
    pub meta: PaginationMeta,
}

/// DTO for enrolling a new student.
///
/// A temporary password is generated server-side and emailed to the student,
/// so no password is accepted here.
#[derive(Deserialize, Debug, Clone, ToSchema, Validate)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 30, message = "Roll number is required"))]
    pub roll_no: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 20, message = "Room number is required"))]
    pub room_no: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub guardian_name: Option<String>,
    #[validate(length(max = 20))]
    pub guardian_phone: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub year: Option<i32>,
}

/// DTO for updating an existing student.
///
/// All fields are optional; only provided fields are changed. Supplying a
/// `room_no` different from the current one moves the student.
#[derive(Deserialize, Debug, Clone, Default, ToSchema, Validate)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub roll_no: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub room_no: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub guardian_name: Option<String>,
    #[validate(length(max = 20))]
    pub guardian_phone: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub year: Option<i32>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
}

/// DTO for a student changing their own password.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ChangePasswordDto {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    pub new_password: String,
}

/// A student row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub roll_no: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub room_no: String,
    pub department: Option<String>,
    pub year: Option<i32>,
    pub password_hash: String,
}

impl NewStudent {
    pub fn from_dto(dto: CreateStudentDto, password_hash: String) -> Self {
        Self {
            name: dto.name,
            roll_no: dto.roll_no,
            email: dto.email,
            phone: dto.phone,
            gender: dto.gender,
            dob: dto.dob,
            address: dto.address,
            guardian_name: dto.guardian_name,
            guardian_phone: dto.guardian_phone,
            room_no: dto.room_no,
            department: dto.department,
            year: dto.year,
            password_hash,
        }
    }
}

/// Column changes applied by an update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub roll_no: Option<String>,
    pub email: Option<String>,
    pub room_no: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub department: Option<String>,
    pub year: Option<i32>,
    pub password_hash: Option<String>,
}

impl StudentChanges {
    /// Builds the change set from an update DTO. The plaintext password, if
    /// any, must already be hashed by the caller.
    pub fn from_dto(dto: UpdateStudentDto, password_hash: Option<String>) -> Self {
        Self {
            name: dto.name,
            roll_no: dto.roll_no,
            email: dto.email,
            room_no: dto.room_no,
            phone: dto.phone,
            gender: dto.gender,
            dob: dto.dob,
            address: dto.address,
            guardian_name: dto.guardian_name,
            guardian_phone: dto.guardian_phone,
            department: dto.department,
            year: dto.year,
            password_hash,
        }
    }

    /// Applies the change set to an in-memory student.
    pub fn apply_to(&self, student: &mut Student) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut student.name, &self.name);
        set(&mut student.roll_no, &self.roll_no);
        set(&mut student.email, &self.email);
        set_opt(&mut student.room_no, &self.room_no);
        set_opt(&mut student.phone, &self.phone);
        set_opt(&mut student.gender, &self.gender);
        set_opt(&mut student.dob, &self.dob);
        set_opt(&mut student.address, &self.address);
        set_opt(&mut student.guardian_name, &self.guardian_name);
        set_opt(&mut student.guardian_phone, &self.guardian_phone);
        set_opt(&mut student.department, &self.department);
        set_opt(&mut student.year, &self.year);
    }
}

/// Students added to one room by a batch import.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct RoomAllocation {
    pub room_number: String,
    pub added: i32,
}

/// Outcome of a successful batch import.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct StudentImportSummary {
    pub imported: usize,
    pub rooms: Vec<RoomAllocation>,
}
