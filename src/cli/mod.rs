//! Administrative commands backing the `hostelbyte-cli` binary.

use anyhow::{Context, bail};
use hostelbyte_core::CredentialHasher;
use uuid::Uuid;

use crate::store::{HostelStore, StoreError};

/// Creates an admin account. Fails if the email is already registered.
pub async fn create_admin<S: HostelStore>(
    store: &S,
    hasher: &CredentialHasher,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let email = email.trim();
    if name.trim().is_empty() || email.is_empty() {
        bail!("Name and email are required");
    }
    if password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }

    let password_hash = hasher
        .hash(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e.error))?;

    match store.insert_admin(name.trim(), email, &password_hash).await {
        Ok(id) => Ok(id),
        Err(StoreError::DuplicateKey { .. }) => bail!("Admin with this email already exists"),
        Err(e) => Err(e).context("Failed to create admin"),
    }
}

/// Produces a bcrypt hash suitable for seeding a password column by hand.
pub fn hash_password(hasher: &CredentialHasher, password: &str) -> anyhow::Result<String> {
    hasher
        .hash(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e.error))
}
