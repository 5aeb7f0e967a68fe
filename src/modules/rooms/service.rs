use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::HostelError;
use crate::modules::rooms::model::{CreateRoomDto, NewRoom, Room, RoomImportSummary};
use crate::store::{HostelStore, StoreError, StoreTx, finish};
use crate::utils::csv::{decode_csv, field};

pub struct RoomService;

impl RoomService {
    #[instrument(skip(store, dto), fields(room_number = %dto.room_number))]
    pub async fn create<S: HostelStore>(store: &S, dto: CreateRoomDto) -> Result<Room, HostelError> {
        let new_room = NewRoom::from(dto);
        if new_room.room_number.is_empty() {
            return Err(HostelError::validation("Room number and capacity are required"));
        }

        store.insert_room(&new_room).await.map_err(|e| match e {
            StoreError::DuplicateKey { .. } => HostelError::DuplicateRoom {
                room_number: new_room.room_number.clone(),
            },
            other => other.into(),
        })
    }

    #[instrument(skip(store))]
    pub async fn list<S: HostelStore>(store: &S) -> Result<Vec<Room>, HostelError> {
        Ok(store.list_rooms().await?)
    }

    /// Changes a room's capacity. It may never drop below the students
    /// already living there.
    #[instrument(skip(store))]
    pub async fn update_capacity<S: HostelStore>(
        store: &S,
        id: Uuid,
        capacity: i32,
    ) -> Result<Room, HostelError> {
        if capacity <= 0 {
            return Err(HostelError::validation("Capacity must be a positive number."));
        }

        let mut tx = store.begin().await?;
        let result = Self::update_capacity_in(&mut tx, id, capacity).await;
        finish(tx, result).await
    }

    async fn update_capacity_in<T: StoreTx>(
        tx: &mut T,
        id: Uuid,
        capacity: i32,
    ) -> Result<Room, HostelError> {
        let room = tx.lock_room_by_id(id).await?.ok_or(HostelError::UnknownRoom)?;
        if capacity < room.current_occupancy {
            return Err(HostelError::CapacityBelowOccupancy {
                requested: capacity,
                occupancy: room.current_occupancy,
            });
        }
        Ok(tx.set_room_capacity(id, capacity).await?)
    }

    /// Deletes an empty room.
    #[instrument(skip(store))]
    pub async fn delete<S: HostelStore>(store: &S, id: Uuid) -> Result<(), HostelError> {
        let mut tx = store.begin().await?;
        let result = Self::delete_in(&mut tx, id).await;
        finish(tx, result).await?;

        info!(room_id = %id, "Room deleted");
        Ok(())
    }

    async fn delete_in<T: StoreTx>(tx: &mut T, id: Uuid) -> Result<(), HostelError> {
        let room = tx.lock_room_by_id(id).await?.ok_or(HostelError::UnknownRoom)?;
        if room.current_occupancy > 0 {
            return Err(HostelError::RoomOccupied {
                occupancy: room.current_occupancy,
            });
        }

        tx.delete_room(id).await.map_err(|e| match e {
            StoreError::ForeignKeyViolation { .. } => HostelError::RoomReferenced,
            other => other.into(),
        })
    }

    /// Bulk-creates rooms from CSV. Existing room numbers are skipped, not
    /// rejected; a malformed row rejects the whole file before any insert.
    #[instrument(skip(store, bytes), fields(bytes = bytes.len()))]
    pub async fn import<S: HostelStore>(
        store: &S,
        bytes: &[u8],
    ) -> Result<RoomImportSummary, HostelError> {
        let rows = decode_csv(bytes)
            .map_err(|_| HostelError::validation("CSV file is empty or invalid."))?;
        if rows.is_empty() {
            return Err(HostelError::validation("CSV file is empty or invalid."));
        }

        let mut rooms = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let line = index + 2;
            let (Some(room_number), Some(capacity)) =
                (field(row, "room_number"), field(row, "capacity"))
            else {
                return Err(
                    HostelError::validation("Room number and capacity are required").at_row(line)
                );
            };
            let capacity = capacity
                .parse::<i32>()
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(|| {
                    HostelError::validation("Capacity must be a positive number.").at_row(line)
                })?;
            rooms.push(NewRoom {
                room_number: room_number.to_string(),
                capacity,
            });
        }

        let added = store.insert_rooms_ignoring_duplicates(&rooms).await?;
        let summary = RoomImportSummary {
            added,
            skipped: rooms.len() as u64 - added,
        };
        info!(added = summary.added, skipped = summary.skipped, "Room import finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn dto(room_number: &str, capacity: i32) -> CreateRoomDto {
        CreateRoomDto {
            room_number: room_number.to_string(),
            capacity,
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_room() {
        let store = InMemoryStore::new();
        RoomService::create(&store, dto("A-1", 2)).await.unwrap();
        let err = RoomService::create(&store, dto(" A-1 ", 3)).await.unwrap_err();
        assert_eq!(err.to_string(), "Room number A-1 already exists");
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_number() {
        let store = InMemoryStore::new();
        store.seed_room("B-1", 1).unwrap();
        store.seed_room("A-1", 1).unwrap();
        let rooms = RoomService::list(&store).await.unwrap();
        let numbers: Vec<_> = rooms.iter().map(|r| r.room_number.as_str()).collect();
        assert_eq!(numbers, vec!["A-1", "B-1"]);
    }

    #[tokio::test]
    async fn test_update_capacity() {
        let store = InMemoryStore::new();
        let room = store.seed_room("A-1", 1).unwrap();
        let updated = RoomService::update_capacity(&store, room.id, 4).await.unwrap();
        assert_eq!(updated.capacity, 4);

        let err = RoomService::update_capacity(&store, Uuid::new_v4(), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, HostelError::UnknownRoom));
    }

    #[tokio::test]
    async fn test_delete_missing_room() {
        let store = InMemoryStore::new();
        let err = RoomService::delete(&store, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), "Room not found.");
    }

    #[tokio::test]
    async fn test_import_skips_existing_rooms() {
        let store = InMemoryStore::new();
        store.seed_room("A-1", 2).unwrap();

        let csv = b"room_number,capacity\nA-1,3\nA-2,2\nA-3,1\n";
        let summary = RoomService::import(&store, csv).await.unwrap();

        assert_eq!(summary, RoomImportSummary { added: 2, skipped: 1 });
        assert_eq!(store.room("A-1").unwrap().capacity, 2);
        assert_eq!(store.rooms().len(), 3);
    }

    #[tokio::test]
    async fn test_import_rejects_bad_capacity_before_writing() {
        let store = InMemoryStore::new();
        let csv = b"room_number,capacity\nA-1,3\nA-2,zero\n";
        let err = RoomService::import(&store, csv).await.unwrap_err();

        assert_eq!(err.to_string(), "Row 3: Capacity must be a positive number.");
        assert!(store.rooms().is_empty());
    }
}
