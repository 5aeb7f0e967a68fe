//! Feature modules.
//!
//! Each module follows the same layout:
//!
//! - `controller.rs`: HTTP handlers with OpenAPI annotations
//! - `service.rs`: business logic against the [`crate::store::HostelStore`] port
//! - `model.rs`: re-exports from `hostelbyte-models`
//! - `router.rs`: Axum router configuration

pub mod auth;
pub mod portal;
pub mod rooms;
pub mod students;
