//! In-memory [`HostelStore`] for tests.
//!
//! A transaction works on a private copy of the tables and publishes it on
//! commit, so rolled-back or dropped transactions leave no trace. Unique
//! keys, the room foreign key and the occupancy CHECK constraint are
//! enforced the same way the PostgreSQL schema enforces them.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use hostelbyte_models::{NewRoom, NewStudent, Room, Student, StudentChanges, StudentSummary};
use uuid::Uuid;

use super::{Credentials, HostelStore, StoreError, StoreTx};

#[derive(Debug, Clone)]
struct StoredStudent {
    student: Student,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct StoredAdmin {
    id: Uuid,
    email: String,
    password_hash: String,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    rooms: Vec<Room>,
    students: Vec<StoredStudent>,
    admins: Vec<StoredAdmin>,
}

impl Tables {
    fn room_by_number(&self, room_number: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.room_number == room_number)
    }

    fn insert_room(&mut self, room: &NewRoom) -> Result<Room, StoreError> {
        if self.room_by_number(&room.room_number).is_some() {
            return Err(StoreError::DuplicateKey {
                constraint: "rooms_room_number_key".to_string(),
            });
        }
        if room.capacity <= 0 {
            return Err(StoreError::other("violates check constraint rooms_capacity_check"));
        }
        let row = Room {
            id: Uuid::new_v4(),
            room_number: room.room_number.clone(),
            capacity: room.capacity,
            current_occupancy: 0,
            created_at: Utc::now(),
        };
        self.rooms.push(row.clone());
        Ok(row)
    }

    fn check_student_keys(
        &self,
        id: Option<Uuid>,
        roll_no: &str,
        email: &str,
        room_no: Option<&str>,
    ) -> Result<(), StoreError> {
        let others = self.students.iter().filter(|s| Some(s.student.id) != id);
        for other in others {
            if other.student.roll_no == roll_no {
                return Err(StoreError::DuplicateKey {
                    constraint: "students_roll_no_key".to_string(),
                });
            }
            if other.student.email == email {
                return Err(StoreError::DuplicateKey {
                    constraint: "students_email_key".to_string(),
                });
            }
        }
        if let Some(room_no) = room_no {
            if self.room_by_number(room_no).is_none() {
                return Err(StoreError::ForeignKeyViolation {
                    constraint: "students_room_no_fkey".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Shared in-memory database. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::other("in-memory store lock poisoned"))
    }

    /// Creates a room with the given occupancy counter, bypassing workflows.
    pub fn seed_room(&self, room_number: &str, capacity: i32) -> Result<Room, StoreError> {
        self.lock()?.insert_room(&NewRoom {
            room_number: room_number.to_string(),
            capacity,
        })
    }

    /// Registers an admin account.
    pub fn seed_admin(&self, email: &str, password_hash: &str) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.lock()?.admins.push(StoredAdmin {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        });
        Ok(id)
    }

    pub fn room(&self, room_number: &str) -> Option<Room> {
        self.lock().ok()?.room_by_number(room_number).cloned()
    }

    pub fn rooms(&self) -> Vec<Room> {
        self.lock().map(|t| t.rooms.clone()).unwrap_or_default()
    }

    pub fn students(&self) -> Vec<Student> {
        self.lock()
            .map(|t| t.students.iter().map(|s| s.student.clone()).collect())
            .unwrap_or_default()
    }

    pub fn student_by_roll(&self, roll_no: &str) -> Option<Student> {
        self.students().into_iter().find(|s| s.roll_no == roll_no)
    }

    /// Number of students whose `room_no` points at `room_number`.
    pub fn count_in_room(&self, room_number: &str) -> i32 {
        self.students()
            .iter()
            .filter(|s| s.room_no.as_deref() == Some(room_number))
            .count() as i32
    }
}

#[async_trait]
impl HostelStore for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let snapshot = self.lock()?.clone();
        Ok(InMemoryTx {
            store: self.clone(),
            working: snapshot,
        })
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let mut rooms = self.lock()?.rooms.clone();
        rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        Ok(rooms)
    }

    async fn insert_room(&self, room: &NewRoom) -> Result<Room, StoreError> {
        self.lock()?.insert_room(room)
    }

    async fn insert_rooms_ignoring_duplicates(&self, rooms: &[NewRoom]) -> Result<u64, StoreError> {
        let mut tables = self.lock()?;
        let mut added = 0;
        for room in rooms {
            match tables.insert_room(room) {
                Ok(_) => added += 1,
                Err(StoreError::DuplicateKey { .. }) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(added)
    }

    async fn list_students(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<StudentSummary>, i64), StoreError> {
        let mut students = self.students();
        students.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.roll_no.cmp(&b.roll_no)));
        let total = students.len() as i64;
        let page = students
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(StudentSummary::from)
            .collect();
        Ok((page, total))
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>, StoreError> {
        Ok(self.students().into_iter().find(|s| s.id == id))
    }

    async fn student_credentials_by_roll(
        &self,
        roll_no: &str,
    ) -> Result<Option<Credentials>, StoreError> {
        Ok(self
            .lock()?
            .students
            .iter()
            .find(|s| s.student.roll_no == roll_no)
            .map(|s| Credentials {
                id: s.student.id,
                password_hash: s.password_hash.clone(),
            }))
    }

    async fn student_credentials_by_id(&self, id: Uuid) -> Result<Option<Credentials>, StoreError> {
        Ok(self
            .lock()?
            .students
            .iter()
            .find(|s| s.student.id == id)
            .map(|s| Credentials {
                id,
                password_hash: s.password_hash.clone(),
            }))
    }

    async fn set_student_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        match tables.students.iter_mut().find(|s| s.student.id == id) {
            Some(stored) => {
                stored.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn admin_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        Ok(self
            .lock()?
            .admins
            .iter()
            .find(|a| a.email == email)
            .map(|a| Credentials {
                id: a.id,
                password_hash: a.password_hash.clone(),
            }))
    }

    async fn insert_admin(
        &self,
        _name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Uuid, StoreError> {
        if self.lock()?.admins.iter().any(|a| a.email == email) {
            return Err(StoreError::DuplicateKey {
                constraint: "admins_email_key".to_string(),
            });
        }
        self.seed_admin(email, password_hash)
    }
}

/// A private working copy of the tables.
pub struct InMemoryTx {
    store: InMemoryStore,
    working: Tables,
}

impl InMemoryTx {
    fn room_mut_by_number(&mut self, room_number: &str) -> Option<&mut Room> {
        self.working
            .rooms
            .iter_mut()
            .find(|r| r.room_number == room_number)
    }
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn lock_room_by_number(&mut self, room_number: &str) -> Result<Option<Room>, StoreError> {
        Ok(self.working.room_by_number(room_number).cloned())
    }

    async fn lock_room_by_id(&mut self, id: Uuid) -> Result<Option<Room>, StoreError> {
        Ok(self.working.rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn adjust_occupancy(&mut self, room_number: &str, delta: i32) -> Result<(), StoreError> {
        if let Some(room) = self.room_mut_by_number(room_number) {
            let next = (room.current_occupancy + delta).max(0);
            if next > room.capacity {
                return Err(StoreError::other(
                    "violates check constraint rooms_occupancy_check",
                ));
            }
            room.current_occupancy = next;
        }
        Ok(())
    }

    async fn set_room_capacity(&mut self, id: Uuid, capacity: i32) -> Result<Room, StoreError> {
        let room = self
            .working
            .rooms
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::other("no rows returned"))?;
        if capacity <= 0 || capacity < room.current_occupancy {
            return Err(StoreError::other(
                "violates check constraint rooms_occupancy_check",
            ));
        }
        room.capacity = capacity;
        Ok(room.clone())
    }

    async fn delete_room(&mut self, id: Uuid) -> Result<(), StoreError> {
        let Some(index) = self.working.rooms.iter().position(|r| r.id == id) else {
            return Ok(());
        };
        let room_number = &self.working.rooms[index].room_number;
        let referenced = self
            .working
            .students
            .iter()
            .any(|s| s.student.room_no.as_ref() == Some(room_number));
        if referenced {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "students_room_no_fkey".to_string(),
            });
        }
        self.working.rooms.remove(index);
        Ok(())
    }

    async fn lock_student(&mut self, id: Uuid) -> Result<Option<Student>, StoreError> {
        Ok(self
            .working
            .students
            .iter()
            .find(|s| s.student.id == id)
            .map(|s| s.student.clone()))
    }

    async fn insert_student(&mut self, student: &NewStudent) -> Result<Student, StoreError> {
        self.working.check_student_keys(
            None,
            &student.roll_no,
            &student.email,
            Some(&student.room_no),
        )?;
        let row = Student {
            id: Uuid::new_v4(),
            name: student.name.clone(),
            roll_no: student.roll_no.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            gender: student.gender.clone(),
            dob: student.dob,
            address: student.address.clone(),
            guardian_name: student.guardian_name.clone(),
            guardian_phone: student.guardian_phone.clone(),
            room_no: Some(student.room_no.clone()),
            department: student.department.clone(),
            year: student.year,
            created_at: Utc::now(),
        };
        self.working.students.push(StoredStudent {
            student: row.clone(),
            password_hash: student.password_hash.clone(),
        });
        Ok(row)
    }

    async fn update_student(
        &mut self,
        id: Uuid,
        changes: &StudentChanges,
    ) -> Result<Student, StoreError> {
        let index = self
            .working
            .students
            .iter()
            .position(|s| s.student.id == id)
            .ok_or_else(|| StoreError::other("no rows returned"))?;

        let mut updated = self.working.students[index].student.clone();
        changes.apply_to(&mut updated);
        self.working.check_student_keys(
            Some(id),
            &updated.roll_no,
            &updated.email,
            updated.room_no.as_deref(),
        )?;

        let stored = &mut self.working.students[index];
        stored.student = updated.clone();
        if let Some(hash) = &changes.password_hash {
            stored.password_hash = hash.clone();
        }
        Ok(updated)
    }

    async fn delete_student(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.working.students.retain(|s| s.student.id != id);
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        *self.store.lock()? = self.working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_student(roll_no: &str, email: &str, room_no: &str) -> NewStudent {
        NewStudent {
            name: "Test Student".to_string(),
            roll_no: roll_no.to_string(),
            email: email.to_string(),
            phone: None,
            gender: None,
            dob: None,
            address: None,
            guardian_name: None,
            guardian_phone: None,
            room_no: room_no.to_string(),
            department: None,
            year: None,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dropped_transaction_leaves_no_trace() {
        let store = InMemoryStore::new();
        store.seed_room("A-1", 2).unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_student(&new_student("R1", "r1@test.dev", "A-1"))
                .await
                .unwrap();
            tx.adjust_occupancy("A-1", 1).await.unwrap();
        }

        assert!(store.students().is_empty());
        assert_eq!(store.room("A-1").unwrap().current_occupancy, 0);
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = InMemoryStore::new();
        store.seed_room("A-1", 2).unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_student(&new_student("R1", "r1@test.dev", "A-1"))
            .await
            .unwrap();
        tx.adjust_occupancy("A-1", 1).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.students().len(), 1);
        assert_eq!(store.room("A-1").unwrap().current_occupancy, 1);
    }

    #[tokio::test]
    async fn test_duplicate_roll_no_is_typed() {
        let store = InMemoryStore::new();
        store.seed_room("A-1", 3).unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_student(&new_student("R1", "r1@test.dev", "A-1"))
            .await
            .unwrap();
        let err = tx
            .insert_student(&new_student("R1", "other@test.dev", "A-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_occupancy_check_constraint_and_floor() {
        let store = InMemoryStore::new();
        store.seed_room("A-1", 1).unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.adjust_occupancy("A-1", -1).await.unwrap();
        assert_eq!(
            tx.lock_room_by_number("A-1")
                .await
                .unwrap()
                .unwrap()
                .current_occupancy,
            0
        );
        tx.adjust_occupancy("A-1", 1).await.unwrap();
        assert!(tx.adjust_occupancy("A-1", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_referenced_room_is_foreign_key_violation() {
        let store = InMemoryStore::new();
        let room = store.seed_room("A-1", 1).unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_student(&new_student("R1", "r1@test.dev", "A-1"))
            .await
            .unwrap();
        let err = tx.delete_room(room.id).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));
    }
}
