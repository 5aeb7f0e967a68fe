use std::collections::BTreeMap;

use hostelbyte_models::RoomAllocation;

/// Pending occupancy increments of one batch, keyed by room number.
///
/// Built fresh for every import and dropped with it. Nothing here is
/// persisted until the batch flushes it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OccupancyLedger {
    pending: BTreeMap<String, i32>,
}

impl OccupancyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats already claimed in `room_number` by earlier rows.
    pub fn pending(&self, room_number: &str) -> i32 {
        self.pending.get(room_number).copied().unwrap_or(0)
    }

    /// Records one more student placed in `room_number`.
    pub fn reserve(&mut self, room_number: &str) {
        *self.pending.entry(room_number.to_string()).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn total(&self) -> i32 {
        self.pending.values().sum()
    }

    /// Rooms with pending increments, in room number order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, i32)> {
        self.pending.iter().map(|(room, delta)| (room.as_str(), *delta))
    }

    pub fn into_allocations(self) -> Vec<RoomAllocation> {
        self.pending
            .into_iter()
            .map(|(room_number, added)| RoomAllocation { room_number, added })
            .collect()
    }
}
