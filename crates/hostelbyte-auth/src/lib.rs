//! # Hostelbyte Auth
//!
//! Authentication types and JWT utilities for the Hostelbyte API.
//!
//! This crate provides:
//!
//! - [`claims`]: JWT claim structure and the [`Role`] carried in it
//! - [`jwt`]: Token creation and verification utilities
//!
//! Two kinds of principals log in: hostel administrators (by email) and
//! students (by roll number). Both receive the same access token shape; the
//! `role` claim decides which part of the API they may use.
//!
//! # Example
//!
//! ```ignore
//! use hostelbyte_auth::{Role, create_access_token, verify_token};
//! use hostelbyte_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(student_id, Role::Student, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, Role::Student);
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::{Claims, Role};
pub use jwt::{create_access_token, verify_token};
