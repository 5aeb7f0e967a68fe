//! Self-service endpoints for logged-in students.

pub mod controller;
pub mod router;
pub mod service;
