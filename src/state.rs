use std::sync::Arc;

use actix_web::web;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::db::{self, StorageBackend, TaskRepository, UserRepository};
use crate::error::AppError;
use crate::tasks::TaskStore;
use crate::users::UserDirectory;

/// The shared services every worker needs, wrapped once so each worker gets a cheap clone.
#[derive(Clone)]
pub struct AppState {
    pub tokens: web::Data<TokenService>,
    pub users: web::Data<UserDirectory>,
    pub tasks: web::Data<TaskStore>,
    pub storage: web::Data<StorageBackend>,
}

impl AppState {
    pub fn new(
        tokens: TokenService,
        hasher: PasswordHasher,
        user_repo: Arc<dyn UserRepository>,
        task_repo: Arc<dyn TaskRepository>,
        storage: StorageBackend,
    ) -> Self {
        Self {
            users: web::Data::new(UserDirectory::new(user_repo, hasher, tokens.clone())),
            tasks: web::Data::new(TaskStore::new(task_repo)),
            tokens: web::Data::new(tokens),
            storage: web::Data::new(storage),
        }
    }

    /// Services backed by the in-process store.
    pub fn in_memory(jwt_secret: &str, bcrypt_cost: u32) -> Self {
        Self::new(
            TokenService::new(jwt_secret),
            PasswordHasher::new(bcrypt_cost),
            Arc::new(db::MemoryUserRepository::new()),
            Arc::new(db::MemoryTaskRepository::new()),
            StorageBackend::Memory,
        )
    }

    /// Uses Postgres when `DATABASE_URL` is configured, the in-process store otherwise.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let Some(url) = config.database_url.as_deref() else {
            log::warn!("DATABASE_URL not set; tasks and users are kept in memory only");
            return Ok(Self::in_memory(&config.jwt_secret, config.bcrypt_cost));
        };

        let pool = db::connect(url, config.database_max_connections).await?;
        log::info!("connected to database");
        Ok(Self::new(
            TokenService::new(&config.jwt_secret),
            PasswordHasher::new(config.bcrypt_cost),
            Arc::new(db::PgUserRepository::new(pool.clone())),
            Arc::new(db::PgTaskRepository::new(pool)),
            StorageBackend::Postgres,
        ))
    }

    /// Registers the services as app data.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.tokens.clone())
            .app_data(self.users.clone())
            .app_data(self.tasks.clone())
            .app_data(self.storage.clone());
    }
}
