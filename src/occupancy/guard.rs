use hostelbyte_models::Room;
use tracing::debug;
use uuid::Uuid;

use super::OccupancyLedger;
use crate::error::HostelError;
use crate::metrics::track_room_capacity_rejection;
use crate::store::StoreTx;

/// Capacity check for a proposed room assignment.
///
/// The guard never touches the ledger. Callers reserve a seat only after the
/// student row has actually been written.
pub struct RoomCapacityGuard;

impl RoomCapacityGuard {
    /// Locks `room_number` inside `tx` and checks that one more student fits,
    /// counting both persisted occupancy and the ledger's pending seats.
    pub async fn check<T: StoreTx>(
        tx: &mut T,
        room_number: &str,
        ledger: &OccupancyLedger,
    ) -> Result<Uuid, HostelError> {
        let room = tx.lock_room_by_number(room_number).await?;
        match Self::evaluate(room_number, room.as_ref(), ledger) {
            Ok(id) => Ok(id),
            Err(err) => {
                if matches!(err, HostelError::RoomFull { .. }) {
                    track_room_capacity_rejection();
                }
                debug!(room_number, error = %err, "Room assignment rejected");
                Err(err)
            }
        }
    }

    pub fn evaluate(
        room_number: &str,
        room: Option<&Room>,
        ledger: &OccupancyLedger,
    ) -> Result<Uuid, HostelError> {
        let room = room.ok_or_else(|| HostelError::RoomNotFound {
            room_number: room_number.to_string(),
        })?;

        let effective = room.current_occupancy + ledger.pending(&room.room_number);
        if effective >= room.capacity {
            return Err(HostelError::RoomFull {
                room_number: room.room_number.clone(),
            });
        }

        Ok(room.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::HostelStore;
    use crate::store::memory::InMemoryStore;

    fn room(number: &str, capacity: i32, occupancy: i32) -> Room {
        Room {
            id: Uuid::new_v4(),
            room_number: number.to_string(),
            capacity,
            current_occupancy: occupancy,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_missing_room() {
        let err = RoomCapacityGuard::evaluate("Z-9", None, &OccupancyLedger::new()).unwrap_err();
        assert_eq!(err.to_string(), "Room \"Z-9\" not found.");
    }

    #[test]
    fn test_free_room_passes() {
        let r = room("A-1", 2, 1);
        let id = RoomCapacityGuard::evaluate("A-1", Some(&r), &OccupancyLedger::new()).unwrap();
        assert_eq!(id, r.id);
    }

    #[test]
    fn test_full_room_rejected() {
        let r = room("A-1", 1, 1);
        let err = RoomCapacityGuard::evaluate("A-1", Some(&r), &OccupancyLedger::new()).unwrap_err();
        assert!(matches!(err, HostelError::RoomFull { .. }));
    }

    #[test]
    fn test_ledger_counts_towards_occupancy() {
        let r = room("B-2", 2, 0);
        let mut ledger = OccupancyLedger::new();
        ledger.reserve("B-2");
        assert!(RoomCapacityGuard::evaluate("B-2", Some(&r), &ledger).is_ok());

        ledger.reserve("B-2");
        let err = RoomCapacityGuard::evaluate("B-2", Some(&r), &ledger).unwrap_err();
        assert_eq!(err.to_string(), "Room \"B-2\" is full.");
    }

    #[test]
    fn test_other_rooms_in_ledger_ignored() {
        let r = room("A-1", 1, 0);
        let mut ledger = OccupancyLedger::new();
        ledger.reserve("B-2");
        assert!(RoomCapacityGuard::evaluate("A-1", Some(&r), &ledger).is_ok());
    }

    #[tokio::test]
    async fn test_check_reads_room_through_transaction() {
        let store = InMemoryStore::new();
        let seeded = store.seed_room("A-1", 1).unwrap();

        let mut tx = store.begin().await.unwrap();
        let id = RoomCapacityGuard::check(&mut tx, "A-1", &OccupancyLedger::new())
            .await
            .unwrap();
        assert_eq!(id, seeded.id);

        tx.adjust_occupancy("A-1", 1).await.unwrap();
        let err = RoomCapacityGuard::check(&mut tx, "A-1", &OccupancyLedger::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HostelError::RoomFull { .. }));
    }
}
