use std::sync::Arc;

use anyhow::Context;
use hostelbyte_config::{CorsConfig, EmailConfig, JwtConfig};
use hostelbyte_core::CredentialHasher;
use hostelbyte_db::{DatabaseConfig, PgPool, init_db_pool};

use crate::store::PgHostelStore;
use crate::utils::email::EmailService;
use crate::utils::notifier::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub store: PgHostelStore,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub hasher: CredentialHasher,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Builds state around an existing pool with the SMTP notifier.
    pub fn new(pool: PgPool) -> Self {
        let email_config = EmailConfig::from_env();
        Self {
            store: PgHostelStore::new(pool),
            jwt_config: JwtConfig::from_env(),
            notifier: Arc::new(EmailService::new(email_config.clone())),
            email_config,
            cors_config: CorsConfig::from_env(),
            hasher: CredentialHasher::from_env(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&db_config)
        .await
        .context("Failed to connect to database")?;
    Ok(AppState::new(pool))
}
