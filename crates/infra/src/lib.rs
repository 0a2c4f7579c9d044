//! Infrastructure layer: storage adapters and external service ports.
//!
//! Ports are `async` traits in [`stores`]; two adapter families implement
//! them — Postgres (production) and in-memory (dev/test). Mail delivery is
//! behind the [`mailer::Mailer`] port.

pub mod mailer;
pub mod stores;


pub use mailer::{LogMailer, Mailer};
pub use stores::{
    ClaimView, ItemUpdate, LedgerStore, MessageStore, NewItem, NewUser, PostStore, UserStore,
    UserUpdate,
    memory::{InMemoryLedgerStore, InMemoryMessageStore, InMemoryPostStore, InMemoryUserStore},
    postgres::{PgLedgerStore, PgMessageStore, PgPostStore, PgUserStore, run_migrations},
};
