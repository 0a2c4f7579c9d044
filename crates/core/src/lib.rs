//! `farmstand-core` — shared domain foundation.
//!
//! Strongly-typed identifiers and the domain error model. This crate is
//! **pure** (no IO, no HTTP, no storage).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{ClaimId, ItemId, MessageId, PostId, UserId};
