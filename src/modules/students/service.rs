use hostelbyte_core::{CredentialHasher, PaginationMeta, PaginationParams, generate_temporary_password};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::HostelError;
use crate::metrics::track_student_enrolled;
use crate::modules::students::model::{
    CreateStudentDto, NewStudent, PaginatedStudentsResponse, Student, StudentChanges,
    UpdateStudentDto,
};
use crate::occupancy::{OccupancyLedger, RoomCapacityGuard};
use crate::store::{HostelStore, StoreError, StoreTx, finish};
use crate::utils::notifier::Notifier;

/// Maps write failures on the students table to domain errors.
pub(crate) fn student_write_error(err: StoreError) -> HostelError {
    match err {
        StoreError::DuplicateKey { .. } => HostelError::DuplicateStudent,
        StoreError::ForeignKeyViolation { .. } => HostelError::UnknownRoom,
        other => HostelError::Store(other),
    }
}

pub(crate) fn hash_credential(
    hasher: &CredentialHasher,
    plaintext: &str,
) -> Result<String, HostelError> {
    hasher
        .hash(plaintext)
        .map_err(|e| HostelError::Credential(e.error.to_string()))
}

pub struct StudentService;

impl StudentService {
    /// Enrolls a student into a room and mails them a temporary password.
    ///
    /// The insert, the welcome email and the occupancy increment share one
    /// transaction; if any of them fails nothing is persisted.
    #[instrument(skip(store, hasher, notifier, dto), fields(roll_no = %dto.roll_no, room_no = %dto.room_no))]
    pub async fn enroll<S: HostelStore>(
        store: &S,
        hasher: &CredentialHasher,
        notifier: &dyn Notifier,
        dto: CreateStudentDto,
    ) -> Result<Student, HostelError> {
        let mut tx = store.begin().await?;
        let result = Self::enroll_in(&mut tx, hasher, notifier, dto).await;
        let student = finish(tx, result).await?;

        track_student_enrolled();
        info!(student_id = %student.id, "Student enrolled");
        Ok(student)
    }

    async fn enroll_in<T: StoreTx>(
        tx: &mut T,
        hasher: &CredentialHasher,
        notifier: &dyn Notifier,
        mut dto: CreateStudentDto,
    ) -> Result<Student, HostelError> {
        dto.room_no = dto.room_no.trim().to_string();
        RoomCapacityGuard::check(tx, &dto.room_no, &OccupancyLedger::new()).await?;

        let temp_password = generate_temporary_password();
        let password_hash = hash_credential(hasher, &temp_password)?;
        let new_student = NewStudent::from_dto(dto, password_hash);

        let student = tx
            .insert_student(&new_student)
            .await
            .map_err(student_write_error)?;

        notifier
            .send_welcome(&student.email, &student.name, &student.roll_no, &temp_password)
            .await?;

        tx.adjust_occupancy(&new_student.room_no, 1).await?;
        Ok(student)
    }

    /// Updates a student's profile. A different `room_no` moves the student,
    /// transferring one seat from the old room to the new one.
    #[instrument(skip(store, hasher, dto))]
    pub async fn update<S: HostelStore>(
        store: &S,
        hasher: &CredentialHasher,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<Student, HostelError> {
        let mut tx = store.begin().await?;
        let result = Self::update_in(&mut tx, hasher, id, dto).await;
        finish(tx, result).await
    }

    async fn update_in<T: StoreTx>(
        tx: &mut T,
        hasher: &CredentialHasher,
        id: Uuid,
        mut dto: UpdateStudentDto,
    ) -> Result<Student, HostelError> {
        let current = tx
            .lock_student(id)
            .await?
            .ok_or(HostelError::StudentNotFound)?;

        let password_hash = match dto.password.take() {
            Some(password) => Some(hash_credential(hasher, &password)?),
            None => None,
        };

        let target_room = dto
            .room_no
            .as_deref()
            .map(str::trim)
            .filter(|room| current.room_no.as_deref() != Some(*room))
            .map(str::to_string);

        if let Some(new_room) = &target_room {
            Self::lock_move_rooms(tx, current.room_no.as_deref(), new_room).await?;
            if let Some(old_room) = &current.room_no {
                tx.adjust_occupancy(old_room, -1).await?;
            }
            tx.adjust_occupancy(new_room, 1).await?;
            info!(from = ?current.room_no, to = %new_room, "Moving student");
        }

        let mut changes = StudentChanges::from_dto(dto, password_hash);
        changes.room_no = target_room.or(current.room_no);

        tx.update_student(id, &changes)
            .await
            .map_err(student_write_error)
    }

    /// Locks both rooms of a move in `room_number` order, checking capacity
    /// of the destination on the way. Opposite concurrent moves then queue on
    /// the same first row instead of deadlocking.
    async fn lock_move_rooms<T: StoreTx>(
        tx: &mut T,
        old_room: Option<&str>,
        new_room: &str,
    ) -> Result<(), HostelError> {
        let mut rooms: Vec<&str> = old_room.into_iter().chain([new_room]).collect();
        rooms.sort_unstable();

        for room in rooms {
            if room == new_room {
                RoomCapacityGuard::check(tx, room, &OccupancyLedger::new()).await?;
            } else {
                tx.lock_room_by_number(room).await?;
            }
        }
        Ok(())
    }

    /// Deletes a student and frees their seat.
    #[instrument(skip(store))]
    pub async fn delete<S: HostelStore>(store: &S, id: Uuid) -> Result<(), HostelError> {
        let mut tx = store.begin().await?;
        let result = Self::delete_in(&mut tx, id).await;
        finish(tx, result).await?;

        info!(student_id = %id, "Student deleted");
        Ok(())
    }

    async fn delete_in<T: StoreTx>(tx: &mut T, id: Uuid) -> Result<(), HostelError> {
        let student = tx
            .lock_student(id)
            .await?
            .ok_or(HostelError::StudentNotFound)?;

        tx.delete_student(id).await?;
        if let Some(room_no) = &student.room_no {
            tx.adjust_occupancy(room_no, -1).await?;
        }
        Ok(())
    }

    #[instrument(skip(store))]
    pub async fn list<S: HostelStore>(
        store: &S,
        params: &PaginationParams,
    ) -> Result<PaginatedStudentsResponse, HostelError> {
        let (data, total) = store.list_students(params.limit(), params.offset()).await?;
        Ok(PaginatedStudentsResponse {
            data,
            meta: PaginationMeta::new(params, total),
        })
    }

    #[instrument(skip(store))]
    pub async fn get<S: HostelStore>(store: &S, id: Uuid) -> Result<Student, HostelError> {
        store
            .find_student(id)
            .await?
            .ok_or(HostelError::StudentNotFound)
    }
}
