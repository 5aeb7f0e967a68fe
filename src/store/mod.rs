//! Transactional store port.
//!
//! Workflows never touch a connection pool directly. They receive a
//! [`HostelStore`] handle, open a [`StoreTx`] per unit of work, and finish it
//! with [`finish`], which commits on success and rolls back on failure.
//!
//! Adapters:
//!
//! - [`postgres::PgHostelStore`]: sqlx/PostgreSQL, used by the server and CLI
//! - [`memory::InMemoryStore`]: snapshot-based store for tests (`test-utils`)

use async_trait::async_trait;
use hostelbyte_models::{NewRoom, NewStudent, Room, Student, StudentChanges, StudentSummary};
use serde::Deserialize;
use sqlx::FromRow;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::error::HostelError;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

pub use postgres::PgHostelStore;

/// Errors raised by store adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate value violates unique constraint {constraint}")]
    DuplicateKey { constraint: String },

    /// A foreign key constraint rejected the write.
    #[error("write violates foreign key constraint {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// Any other failure (connection, query, constraint).
    #[error("store query failed: {message}")]
    Other { message: String },
}

impl StoreError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Login material for an admin or a student.
#[derive(Debug, Clone, FromRow, Deserialize)]
pub struct Credentials {
    pub id: Uuid,
    pub password_hash: String,
}

/// Entry point to the hostel database.
///
/// Reads that need no locking live here; everything that mutates rooms or
/// students goes through a transaction from [`HostelStore::begin`].
#[async_trait]
pub trait HostelStore: Send + Sync {
    type Tx: StoreTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;

    async fn insert_room(&self, room: &NewRoom) -> Result<Room, StoreError>;

    /// Inserts every room whose number is not taken yet; returns how many were added.
    async fn insert_rooms_ignoring_duplicates(&self, rooms: &[NewRoom]) -> Result<u64, StoreError>;

    /// Returns one page of students ordered by name, plus the total count.
    async fn list_students(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<StudentSummary>, i64), StoreError>;

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>, StoreError>;

    async fn student_credentials_by_roll(
        &self,
        roll_no: &str,
    ) -> Result<Option<Credentials>, StoreError>;

    async fn student_credentials_by_id(&self, id: Uuid) -> Result<Option<Credentials>, StoreError>;

    /// Replaces a student's password hash; returns false if the student is gone.
    async fn set_student_password(&self, id: Uuid, password_hash: &str)
    -> Result<bool, StoreError>;

    async fn admin_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError>;

    async fn insert_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Uuid, StoreError>;
}

/// One open transaction. Dropping it without [`StoreTx::commit`] discards
/// every change made through it.
#[async_trait]
pub trait StoreTx: Send {
    /// Reads a room by number and locks it until the transaction ends.
    async fn lock_room_by_number(&mut self, room_number: &str) -> Result<Option<Room>, StoreError>;

    /// Reads a room by id and locks it until the transaction ends.
    async fn lock_room_by_id(&mut self, id: Uuid) -> Result<Option<Room>, StoreError>;

    /// Adds `delta` to a room's occupancy. Negative results are floored at zero.
    async fn adjust_occupancy(&mut self, room_number: &str, delta: i32) -> Result<(), StoreError>;

    async fn set_room_capacity(&mut self, id: Uuid, capacity: i32) -> Result<Room, StoreError>;

    async fn delete_room(&mut self, id: Uuid) -> Result<(), StoreError>;

    /// Reads a student and locks the row until the transaction ends.
    async fn lock_student(&mut self, id: Uuid) -> Result<Option<Student>, StoreError>;

    async fn insert_student(&mut self, student: &NewStudent) -> Result<Student, StoreError>;

    async fn update_student(
        &mut self,
        id: Uuid,
        changes: &StudentChanges,
    ) -> Result<Student, StoreError>;

    async fn delete_student(&mut self, id: Uuid) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

/// Ends a unit of work: commits when `result` is `Ok`, rolls back otherwise.
///
/// A failed rollback is logged and the original error is returned; the
/// adapter's transaction handle releases the connection either way.
pub async fn finish<T, R>(tx: T, result: Result<R, HostelError>) -> Result<R, HostelError>
where
    T: StoreTx,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
