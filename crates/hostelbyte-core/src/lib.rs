//! # Hostelbyte Core
//!
//! Core types, errors, and utilities for the Hostelbyte API.
//!
//! This crate provides foundational types used throughout the Hostelbyte application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Page-based pagination helpers for list endpoints
//! - [`password`]: Credential hashing, verification, and temporary password generation
//!
//! # Example
//!
//! ```ignore
//! use hostelbyte_core::errors::AppError;
//! use hostelbyte_core::password::{CredentialHasher, generate_temporary_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Room not found"));
//!
//! let hasher = CredentialHasher::default();
//! let plaintext = generate_temporary_password();
//! let hash = hasher.hash(&plaintext)?;
//! ```

pub mod errors;
pub mod pagination;
pub mod password;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorResponse};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{CredentialHasher, generate_temporary_password};
