//! Shared utilities.
//!
//! - [`csv`]: CSV decoding for bulk uploads
//! - [`email`]: SMTP welcome emails
//! - [`notifier`]: the notification port used by enrollment workflows
//! - [`upload`]: multipart file extraction

pub mod csv;
pub mod email;
pub mod notifier;
pub mod upload;
