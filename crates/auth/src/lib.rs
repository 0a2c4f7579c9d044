//! `farmstand-auth` — accounts, roles, login codes, and session tokens.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how
//! to mint and verify tokens and login codes, not where they travel or where
//! accounts are persisted.

pub mod claims;
pub mod code;
pub mod role;
pub mod token;
pub mod user;

pub use claims::SessionClaims;
pub use code::{LOGIN_CODE_TTL_MINUTES, LoginCode};
pub use role::Role;
pub use token::{AuthError, Hs256TokenCodec, SESSION_TTL_DAYS, TokenCodec};
pub use user::User;
