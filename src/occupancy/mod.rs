//! Occupancy bookkeeping shared by enrollment and batch import.

mod guard;
mod ledger;

pub use guard::RoomCapacityGuard;
pub use ledger::OccupancyLedger;
