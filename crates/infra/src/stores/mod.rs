//! Storage ports.
//!
//! Each trait is an async port over one slice of persisted state. Adapters
//! must keep ledger mutations all-or-nothing: if any step of a claim,
//! reversal, or deactivation fails, no partial state change is visible.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use farmstand_auth::{LoginCode, User};
use farmstand_content::{Message, Post};
use farmstand_core::{ClaimId, DomainResult, ItemId, MessageId, PostId, UserId};
use farmstand_ledger::{Claim, Item};

pub mod memory;
pub mod postgres;

/// Fields for creating an item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub photo_path: Option<String>,
    pub total_quantity: i64,
}

/// Fields for updating an item. `photo_path: None` keeps the stored photo.
#[derive(Debug, Clone)]
pub struct ItemUpdate {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub photo_path: Option<String>,
    pub total_quantity: i64,
}

/// A claim joined with its item's name, as listed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimView {
    pub claim: Claim,
    pub item_name: String,
}

/// Port over items and claims — the inventory claim ledger.
///
/// Implementations must serialize concurrent claims against the same item:
/// the remaining-quantity check and the decrement happen atomically against
/// persisted state (row lock in Postgres, a mutex held across check+mutate
/// in memory). Two concurrent claims that together exceed stock yield
/// exactly one success.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create_item(&self, new: NewItem) -> DomainResult<Item>;

    /// Update item fields and re-total it. The remaining quantity is
    /// recomputed from the active claims inside the same transaction;
    /// shrinking the total below the claimed quantity is rejected. Updating
    /// re-activates the item.
    async fn update_item(&self, update: ItemUpdate) -> DomainResult<Item>;

    async fn get_item(&self, id: ItemId) -> DomainResult<Item>;

    async fn list_active_items(&self) -> DomainResult<Vec<Item>>;

    async fn list_active_claims(&self) -> DomainResult<Vec<ClaimView>>;

    /// Claim `amount` of an item for a user. The check runs against the
    /// persisted row at commit time, never a value cached earlier.
    async fn create_claim(
        &self,
        item_id: ItemId,
        user_id: UserId,
        amount: i64,
    ) -> DomainResult<Claim>;

    /// Reverse a claim: credit its amount back and mark it inactive. The
    /// row is kept for history. Reversing an already-inactive claim is a
    /// conflict.
    async fn reverse_claim(&self, claim_id: ClaimId) -> DomainResult<Claim>;

    /// Soft-delete an item and deactivate every claim referencing it. The
    /// remaining quantity is left as-is.
    async fn deactivate_item(&self, item_id: ItemId) -> DomainResult<()>;
}

/// Fields for an admin-created account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Fields for an admin account update.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub admin: bool,
}

/// Port over user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Store a fresh login code for `email`, creating the account on first
    /// contact.
    async fn issue_login_code(&self, email: &str, code: LoginCode) -> DomainResult<User>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>>;

    async fn create_user(&self, new: NewUser) -> DomainResult<User>;

    async fn update_user(&self, update: UserUpdate) -> DomainResult<User>;

    async fn remove_user(&self, id: UserId) -> DomainResult<()>;

    async fn list_users(&self) -> DomainResult<Vec<User>>;
}

/// Port over blog posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, post: Post) -> DomainResult<Post>;

    async fn update_post(&self, post: Post) -> DomainResult<Post>;

    async fn get_post(&self, id: PostId) -> DomainResult<Post>;

    /// Newest first.
    async fn list_posts(&self) -> DomainResult<Vec<Post>>;
}

/// Port over broadcast messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create_message(&self, message: Message) -> DomainResult<Message>;

    /// Newest first.
    async fn list_messages(&self) -> DomainResult<Vec<Message>>;

    async fn delete_message(&self, id: MessageId) -> DomainResult<()>;
}
