use async_trait::async_trait;
use hostelbyte_models::{NewRoom, NewStudent, Room, Student, StudentChanges, StudentSummary};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use super::{Credentials, HostelStore, StoreError, StoreTx};

const STUDENT_COLUMNS: &str = "id, name, roll_no, email, phone, gender, dob, address, \
     guardian_name, guardian_phone, room_no, department, year, created_at";

const ROOM_COLUMNS: &str = "id, room_number, capacity, current_occupancy, created_at";

/// Classifies a sqlx error into the store's typed errors.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default().to_string();
        if db_err.is_unique_violation() {
            return StoreError::DuplicateKey { constraint };
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::ForeignKeyViolation { constraint };
        }
    }
    StoreError::other(err.to_string())
}

/// PostgreSQL-backed hostel store.
#[derive(Clone, Debug)]
pub struct PgHostelStore {
    pool: PgPool,
}

impl PgHostelStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl HostelStore for PgHostelStore {
    type Tx = PgStoreTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(PgStoreTx { tx })
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms ORDER BY room_number"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    #[instrument(skip(self))]
    async fn insert_room(&self, room: &NewRoom) -> Result<Room, StoreError> {
        sqlx::query_as::<_, Room>(&format!(
            "INSERT INTO rooms (room_number, capacity) VALUES ($1, $2) RETURNING {ROOM_COLUMNS}"
        ))
        .bind(&room.room_number)
        .bind(room.capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    #[instrument(skip(self, rooms), fields(rooms = rooms.len()))]
    async fn insert_rooms_ignoring_duplicates(&self, rooms: &[NewRoom]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut added = 0;

        for room in rooms {
            let result = sqlx::query(
                "INSERT INTO rooms (room_number, capacity) VALUES ($1, $2) \
                 ON CONFLICT (room_number) DO NOTHING",
            )
            .bind(&room.room_number)
            .bind(room.capacity)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            added += result.rows_affected();
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(added)
    }

    #[instrument(skip(self))]
    async fn list_students(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<StudentSummary>, i64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let students = sqlx::query_as::<_, StudentSummary>(
            "SELECT id, name, roll_no, department, year, room_no FROM students \
             ORDER BY name, roll_no LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok((students, total))
    }

    #[instrument(skip(self))]
    async fn find_student(&self, id: Uuid) -> Result<Option<Student>, StoreError> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    #[instrument(skip(self))]
    async fn student_credentials_by_roll(
        &self,
        roll_no: &str,
    ) -> Result<Option<Credentials>, StoreError> {
        sqlx::query_as::<_, Credentials>(
            "SELECT id, password_hash FROM students WHERE roll_no = $1",
        )
        .bind(roll_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    #[instrument(skip(self))]
    async fn student_credentials_by_id(&self, id: Uuid) -> Result<Option<Credentials>, StoreError> {
        sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    #[instrument(skip(self, password_hash))]
    async fn set_student_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE students SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn admin_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM admins WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    #[instrument(skip(self, password_hash))]
    async fn insert_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Uuid, StoreError> {
        sqlx::query_scalar(
            "INSERT INTO admins (name, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }
}

/// An open PostgreSQL transaction. sqlx rolls it back on drop.
pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn lock_room_by_number(&mut self, room_number: &str) -> Result<Option<Room>, StoreError> {
        sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE room_number = $1 FOR UPDATE"
        ))
        .bind(room_number)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn lock_room_by_id(&mut self, id: Uuid) -> Result<Option<Room>, StoreError> {
        sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn adjust_occupancy(&mut self, room_number: &str, delta: i32) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE rooms SET current_occupancy = GREATEST(current_occupancy + $1, 0) \
             WHERE room_number = $2",
        )
        .bind(delta)
        .bind(room_number)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn set_room_capacity(&mut self, id: Uuid, capacity: i32) -> Result<Room, StoreError> {
        sqlx::query_as::<_, Room>(&format!(
            "UPDATE rooms SET capacity = $1 WHERE id = $2 RETURNING {ROOM_COLUMNS}"
        ))
        .bind(capacity)
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_room(&mut self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn lock_student(&mut self, id: Uuid) -> Result<Option<Student>, StoreError> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert_student(&mut self, student: &NewStudent) -> Result<Student, StoreError> {
        sqlx::query_as::<_, Student>(&format!(
            r#"
            INSERT INTO students (
                name, roll_no, email, phone, gender, dob, address,
                guardian_name, guardian_phone, room_no, department, year, password_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(&student.name)
        .bind(&student.roll_no)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.gender)
        .bind(student.dob)
        .bind(&student.address)
        .bind(&student.guardian_name)
        .bind(&student.guardian_phone)
        .bind(&student.room_no)
        .bind(&student.department)
        .bind(student.year)
        .bind(&student.password_hash)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_student(
        &mut self,
        id: Uuid,
        changes: &StudentChanges,
    ) -> Result<Student, StoreError> {
        sqlx::query_as::<_, Student>(&format!(
            r#"
            UPDATE students SET
                name = COALESCE($1, name),
                roll_no = COALESCE($2, roll_no),
                email = COALESCE($3, email),
                room_no = COALESCE($4, room_no),
                phone = COALESCE($5, phone),
                gender = COALESCE($6, gender),
                dob = COALESCE($7, dob),
                address = COALESCE($8, address),
                guardian_name = COALESCE($9, guardian_name),
                guardian_phone = COALESCE($10, guardian_phone),
                department = COALESCE($11, department),
                year = COALESCE($12, year),
                password_hash = COALESCE($13, password_hash)
            WHERE id = $14
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(&changes.name)
        .bind(&changes.roll_no)
        .bind(&changes.email)
        .bind(&changes.room_no)
        .bind(&changes.phone)
        .bind(&changes.gender)
        .bind(changes.dob)
        .bind(&changes.address)
        .bind(&changes.guardian_name)
        .bind(&changes.guardian_phone)
        .bind(&changes.department)
        .bind(changes.year)
        .bind(&changes.password_hash)
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_student(&mut self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}
