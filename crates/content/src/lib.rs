//! `farmstand-content` — blog posts and broadcast messages.
//!
//! Pure content models with validation; persistence lives in
//! `farmstand-infra`.

pub mod message;
pub mod post;

pub use message::Message;
pub use post::{Block, BlockKind, Post};
