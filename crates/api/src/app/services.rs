//! Service wiring: which adapters back the ports for this process.

use std::sync::Arc;

use sqlx::PgPool;

use farmstand_infra::{
    InMemoryLedgerStore, InMemoryMessageStore, InMemoryPostStore, InMemoryUserStore, LedgerStore,
    LogMailer, Mailer, MessageStore, PgLedgerStore, PgMessageStore, PgPostStore, PgUserStore,
    PostStore, UserStore, run_migrations,
};

/// Shared handles to the storage ports and the mail port.
pub struct AppServices {
    pub ledger: Arc<dyn LedgerStore>,
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
    pub messages: Arc<dyn MessageStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppServices {
    /// In-memory adapters. Used for dev (no `DATABASE_URL`) and tests.
    pub fn in_memory() -> Self {
        Self {
            ledger: Arc::new(InMemoryLedgerStore::new()),
            users: Arc::new(InMemoryUserStore::new()),
            posts: Arc::new(InMemoryPostStore::new()),
            messages: Arc::new(InMemoryMessageStore::new()),
            mailer: Arc::new(LogMailer::new()),
        }
    }

    /// Postgres adapters over one shared pool. Runs pending migrations.
    pub async fn postgres(pool: PgPool) -> Result<Self, farmstand_core::DomainError> {
        run_migrations(&pool).await?;
        Ok(Self {
            ledger: Arc::new(PgLedgerStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
            posts: Arc::new(PgPostStore::new(pool.clone())),
            messages: Arc::new(PgMessageStore::new(pool)),
            mailer: Arc::new(LogMailer::new()),
        })
    }
}
