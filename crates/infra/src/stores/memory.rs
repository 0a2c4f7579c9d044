//! In-memory adapters for dev and test.
//!
//! Each store is a mutex-guarded map. For the ledger, the lock is held
//! across the whole check+mutate sequence, which serializes concurrent
//! claims the same way the Postgres row lock does.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use farmstand_auth::{LoginCode, User};
use farmstand_content::{Message, Post};
use farmstand_core::{
    ClaimId, DomainError, DomainResult, ItemId, MessageId, PostId, UserId,
};
use farmstand_ledger::{Claim, Item};

use super::{
    ClaimView, ItemUpdate, LedgerStore, MessageStore, NewItem, NewUser, PostStore, UserStore,
    UserUpdate,
};

#[derive(Debug, Default)]
struct LedgerState {
    items: HashMap<ItemId, Item>,
    claims: HashMap<ClaimId, Claim>,
}

/// In-memory inventory claim ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_item(&self, new: NewItem) -> DomainResult<Item> {
        let item = Item::new(
            ItemId::new(),
            new.name,
            new.description,
            new.photo_path,
            new.total_quantity,
            Utc::now(),
        )?;
        let mut state = self.inner.lock().expect("ledger lock poisoned");
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_item(&self, update: ItemUpdate) -> DomainResult<Item> {
        if update.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let mut state = self.inner.lock().expect("ledger lock poisoned");
        // Sum the active claim records; total - remaining also counts claims
        // frozen by deactivation.
        let active_claimed: i64 = state
            .claims
            .values()
            .filter(|c| c.active && c.item_id == update.id)
            .map(|c| c.amount)
            .sum();
        let item = state
            .items
            .get_mut(&update.id)
            .ok_or(DomainError::NotFound)?;
        item.retotal(update.total_quantity, active_claimed)?;
        item.name = update.name;
        item.description = update.description;
        if update.photo_path.is_some() {
            item.photo_path = update.photo_path;
        }
        item.active = true;
        Ok(item.clone())
    }

    async fn get_item(&self, id: ItemId) -> DomainResult<Item> {
        let state = self.inner.lock().expect("ledger lock poisoned");
        state.items.get(&id).cloned().ok_or(DomainError::NotFound)
    }

    async fn list_active_items(&self) -> DomainResult<Vec<Item>> {
        let state = self.inner.lock().expect("ledger lock poisoned");
        let mut items: Vec<Item> = state.items.values().filter(|i| i.active).cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn list_active_claims(&self) -> DomainResult<Vec<ClaimView>> {
        let state = self.inner.lock().expect("ledger lock poisoned");
        let mut views: Vec<ClaimView> = state
            .claims
            .values()
            .filter(|c| c.active)
            .map(|c| ClaimView {
                claim: c.clone(),
                item_name: state
                    .items
                    .get(&c.item_id)
                    .map(|i| i.name.clone())
                    .unwrap_or_default(),
            })
            .collect();
        views.sort_by(|a, b| b.claim.created_at.cmp(&a.claim.created_at));
        Ok(views)
    }

    async fn create_claim(
        &self,
        item_id: ItemId,
        user_id: UserId,
        amount: i64,
    ) -> DomainResult<Claim> {
        // Lock held across check and mutate: the second of two racing
        // claims observes the first one's decrement.
        let mut state = self.inner.lock().expect("ledger lock poisoned");
        let item = state.items.get_mut(&item_id).ok_or(DomainError::NotFound)?;
        item.apply_claim(amount)?;
        let claim = Claim::new(ClaimId::new(), item_id, user_id, amount, Utc::now())?;
        state.claims.insert(claim.id, claim.clone());
        Ok(claim)
    }

    async fn reverse_claim(&self, claim_id: ClaimId) -> DomainResult<Claim> {
        let mut state = self.inner.lock().expect("ledger lock poisoned");
        let mut claim = state
            .claims
            .get(&claim_id)
            .cloned()
            .ok_or(DomainError::NotFound)?;
        claim.reverse()?;
        let item = state
            .items
            .get_mut(&claim.item_id)
            .ok_or_else(|| DomainError::persistence("claim references a missing item"))?;
        item.release(claim.amount)?;
        state.claims.insert(claim.id, claim.clone());
        Ok(claim)
    }

    async fn deactivate_item(&self, item_id: ItemId) -> DomainResult<()> {
        let mut state = self.inner.lock().expect("ledger lock poisoned");
        let item = state.items.get_mut(&item_id).ok_or(DomainError::NotFound)?;
        item.deactivate();
        for claim in state.claims.values_mut() {
            if claim.item_id == item_id {
                claim.active = false;
            }
        }
        Ok(())
    }
}

/// In-memory user accounts.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/dev helper: insert a fully formed account.
    pub fn seed(&self, user: User) {
        self.users
            .lock()
            .expect("user lock poisoned")
            .insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn issue_login_code(&self, email: &str, code: LoginCode) -> DomainResult<User> {
        let mut users = self.users.lock().expect("user lock poisoned");
        if let Some(user) = users.values_mut().find(|u| u.email == email) {
            user.login_code = Some(code);
            return Ok(user.clone());
        }
        let mut user = User::new(UserId::new(), email, Utc::now());
        user.login_code = Some(code);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let users = self.users.lock().expect("user lock poisoned");
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let users = self.users.lock().expect("user lock poisoned");
        Ok(users.get(&id).cloned())
    }

    async fn create_user(&self, new: NewUser) -> DomainResult<User> {
        let mut users = self.users.lock().expect("user lock poisoned");
        if users.values().any(|u| u.email == new.email) {
            return Err(DomainError::conflict("email already registered"));
        }
        let mut user = User::new(UserId::new(), new.email, Utc::now());
        user.name = new.name;
        user.phone = new.phone;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, update: UserUpdate) -> DomainResult<User> {
        let mut users = self.users.lock().expect("user lock poisoned");
        if users
            .values()
            .any(|u| u.email == update.email && u.id != update.id)
        {
            return Err(DomainError::conflict("email already registered"));
        }
        let user = users.get_mut(&update.id).ok_or(DomainError::NotFound)?;
        user.name = update.name;
        user.email = update.email;
        user.phone = update.phone;
        user.admin = update.admin;
        Ok(user.clone())
    }

    async fn remove_user(&self, id: UserId) -> DomainResult<()> {
        let mut users = self.users.lock().expect("user lock poisoned");
        users.remove(&id).map(|_| ()).ok_or(DomainError::NotFound)
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        let users = self.users.lock().expect("user lock poisoned");
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }
}

/// In-memory blog posts.
#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    posts: Mutex<HashMap<PostId, Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn create_post(&self, post: Post) -> DomainResult<Post> {
        let mut posts = self.posts.lock().expect("post lock poisoned");
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, post: Post) -> DomainResult<Post> {
        let mut posts = self.posts.lock().expect("post lock poisoned");
        if !posts.contains_key(&post.id) {
            return Err(DomainError::NotFound);
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: PostId) -> DomainResult<Post> {
        let posts = self.posts.lock().expect("post lock poisoned");
        posts.get(&id).cloned().ok_or(DomainError::NotFound)
    }

    async fn list_posts(&self) -> DomainResult<Vec<Post>> {
        let posts = self.posts.lock().expect("post lock poisoned");
        let mut all: Vec<Post> = posts.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

/// In-memory broadcast messages.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: Mutex<HashMap<MessageId, Message>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create_message(&self, message: Message) -> DomainResult<Message> {
        let mut messages = self.messages.lock().expect("message lock poisoned");
        messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn list_messages(&self) -> DomainResult<Vec<Message>> {
        let messages = self.messages.lock().expect("message lock poisoned");
        let mut all: Vec<Message> = messages.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn delete_message(&self, id: MessageId) -> DomainResult<()> {
        let mut messages = self.messages.lock().expect("message lock poisoned");
        messages
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::NotFound)
    }
}
