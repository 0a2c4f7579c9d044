//! Postgres adapters.
//!
//! ## Concurrency
//!
//! Ledger mutations run inside one transaction that takes a row-level lock
//! (`SELECT … FOR UPDATE`) on the item row before checking and writing the
//! remaining quantity. The second of two racing claims blocks on the lock
//! and then observes the first one's committed decrement, so over-claiming
//! is impossible. The schema also carries CHECK constraints
//! (`remaining_quantity` between 0 and `total_quantity`, `amount > 0`) as a
//! final backstop.
//!
//! ## Error mapping
//!
//! Unique violations map to `DomainError::Conflict`; foreign-key violations
//! on delete map to `Conflict` as well (the row is still referenced); every
//! other sqlx error maps to `DomainError::Persistence` tagged with the
//! failing operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;

use farmstand_auth::{LoginCode, User};
use farmstand_content::{Block, Message, Post};
use farmstand_core::{
    ClaimId, DomainError, DomainResult, ItemId, MessageId, PostId, UserId,
};
use farmstand_ledger::{Claim, Item};

use super::{
    ClaimView, ItemUpdate, LedgerStore, MessageStore, NewItem, NewUser, PostStore, UserStore,
    UserUpdate,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Apply pending schema migrations.
pub async fn run_migrations(pool: &PgPool) -> DomainResult<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DomainError::persistence(format!("migrate: {e}")))
}

fn map_sqlx_error(op: &str, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        // 23505 unique_violation, 23503 foreign_key_violation
        match db.code().as_deref() {
            Some("23505") => return DomainError::conflict(format!("{op}: already exists")),
            Some("23503") => return DomainError::conflict(format!("{op}: still referenced")),
            _ => {}
        }
    }
    DomainError::persistence(format!("{op}: {e}"))
}

const ITEM_COLUMNS: &str =
    "id, name, description, photo_path, total_quantity, remaining_quantity, active, created_at";

fn item_from_row(row: &PgRow) -> DomainResult<Item> {
    Ok(Item {
        id: ItemId::from_uuid(
            row.try_get("id")
                .map_err(|e| map_sqlx_error("decode_item", e))?,
        ),
        name: row
            .try_get("name")
            .map_err(|e| map_sqlx_error("decode_item", e))?,
        description: row
            .try_get("description")
            .map_err(|e| map_sqlx_error("decode_item", e))?,
        photo_path: row
            .try_get("photo_path")
            .map_err(|e| map_sqlx_error("decode_item", e))?,
        total_quantity: row
            .try_get("total_quantity")
            .map_err(|e| map_sqlx_error("decode_item", e))?,
        remaining_quantity: row
            .try_get("remaining_quantity")
            .map_err(|e| map_sqlx_error("decode_item", e))?,
        active: row
            .try_get("active")
            .map_err(|e| map_sqlx_error("decode_item", e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| map_sqlx_error("decode_item", e))?,
    })
}

const CLAIM_COLUMNS: &str = "id, item_id, user_id, amount, active, created_at";

fn claim_from_row(row: &PgRow) -> DomainResult<Claim> {
    Ok(Claim {
        id: ClaimId::from_uuid(
            row.try_get("id")
                .map_err(|e| map_sqlx_error("decode_claim", e))?,
        ),
        item_id: ItemId::from_uuid(
            row.try_get("item_id")
                .map_err(|e| map_sqlx_error("decode_claim", e))?,
        ),
        user_id: UserId::from_uuid(
            row.try_get("user_id")
                .map_err(|e| map_sqlx_error("decode_claim", e))?,
        ),
        amount: row
            .try_get("amount")
            .map_err(|e| map_sqlx_error("decode_claim", e))?,
        active: row
            .try_get("active")
            .map_err(|e| map_sqlx_error("decode_claim", e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| map_sqlx_error("decode_claim", e))?,
    })
}

/// Postgres-backed inventory claim ledger.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    #[instrument(skip(self, new), err)]
    async fn create_item(&self, new: NewItem) -> DomainResult<Item> {
        let item = Item::new(
            ItemId::new(),
            new.name,
            new.description,
            new.photo_path,
            new.total_quantity,
            Utc::now(),
        )?;

        sqlx::query(
            r#"
            INSERT INTO items (
                id, name, description, photo_path,
                total_quantity, remaining_quantity, active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.photo_path)
        .bind(item.total_quantity)
        .bind(item.remaining_quantity)
        .bind(item.active)
        .bind(item.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_item", e))?;

        Ok(item)
    }

    #[instrument(skip(self, update), fields(item_id = %update.id), err)]
    async fn update_item(&self, update: ItemUpdate) -> DomainResult<Item> {
        if update.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_item.begin", e))?;

        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 FOR UPDATE"
        ))
        .bind(update.id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_item.lock", e))?;

        let Some(row) = row else {
            return Err(DomainError::not_found());
        };
        let mut item = item_from_row(&row)?;

        // Sum the active claim records under the item's row lock; the
        // total - remaining difference also counts claims frozen by
        // deactivation.
        let active_claimed: i64 = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT AS active_claimed
             FROM claims WHERE item_id = $1 AND active",
        )
        .bind(update.id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_item.sum_claims", e))?
        .try_get("active_claimed")
        .map_err(|e| map_sqlx_error("update_item.sum_claims", e))?;

        item.retotal(update.total_quantity, active_claimed)?;
        item.name = update.name;
        item.description = update.description;
        if update.photo_path.is_some() {
            item.photo_path = update.photo_path;
        }
        item.active = true;

        sqlx::query(
            r#"
            UPDATE items
            SET name = $2,
                description = $3,
                photo_path = $4,
                total_quantity = $5,
                remaining_quantity = $6,
                active = TRUE
            WHERE id = $1
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.photo_path)
        .bind(item.total_quantity)
        .bind(item.remaining_quantity)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_item.write", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_item.commit", e))?;

        Ok(item)
    }

    #[instrument(skip(self), err)]
    async fn get_item(&self, id: ItemId) -> DomainResult<Item> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_item", e))?;

        match row {
            Some(row) => item_from_row(&row),
            None => Err(DomainError::not_found()),
        }
    }

    #[instrument(skip(self), err)]
    async fn list_active_items(&self) -> DomainResult<Vec<Item>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE active = TRUE ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_active_items", e))?;

        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_active_claims(&self) -> DomainResult<Vec<ClaimView>> {
        let rows = sqlx::query(
            r#"
            SELECT
                claims.id, claims.item_id, claims.user_id,
                claims.amount, claims.active, claims.created_at,
                items.name AS item_name
            FROM claims
            JOIN items ON claims.item_id = items.id
            WHERE claims.active = TRUE
            ORDER BY claims.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_active_claims", e))?;

        rows.iter()
            .map(|row| {
                Ok(ClaimView {
                    claim: claim_from_row(row)?,
                    item_name: row
                        .try_get("item_name")
                        .map_err(|e| map_sqlx_error("list_active_claims", e))?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(item_id = %item_id, amount), err)]
    async fn create_claim(
        &self,
        item_id: ItemId,
        user_id: UserId,
        amount: i64,
    ) -> DomainResult<Claim> {
        let claim = Claim::new(ClaimId::new(), item_id, user_id, amount, Utc::now())?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_claim.begin", e))?;

        // Row lock: the availability check below runs against committed
        // state, not a value read earlier in the request.
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 FOR UPDATE"
        ))
        .bind(item_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_claim.lock", e))?;

        let Some(row) = row else {
            return Err(DomainError::not_found());
        };
        let mut item = item_from_row(&row)?;
        item.apply_claim(amount)?;

        sqlx::query("UPDATE items SET remaining_quantity = $2 WHERE id = $1")
            .bind(item_id.as_uuid())
            .bind(item.remaining_quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_claim.decrement", e))?;

        sqlx::query(
            r#"
            INSERT INTO claims (id, item_id, user_id, amount, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(claim.id.as_uuid())
        .bind(claim.item_id.as_uuid())
        .bind(claim.user_id.as_uuid())
        .bind(claim.amount)
        .bind(claim.active)
        .bind(claim.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_claim.insert", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_claim.commit", e))?;

        Ok(claim)
    }

    #[instrument(skip(self), fields(claim_id = %claim_id), err)]
    async fn reverse_claim(&self, claim_id: ClaimId) -> DomainResult<Claim> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("reverse_claim.begin", e))?;

        let row = sqlx::query(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE id = $1 FOR UPDATE"
        ))
        .bind(claim_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("reverse_claim.lock", e))?;

        let Some(row) = row else {
            return Err(DomainError::not_found());
        };
        let mut claim = claim_from_row(&row)?;
        claim.reverse()?;

        let item_row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 FOR UPDATE"
        ))
        .bind(claim.item_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("reverse_claim.lock_item", e))?;

        // Foreign keys make a missing parent an integrity failure, not a
        // caller mistake.
        let Some(item_row) = item_row else {
            return Err(DomainError::persistence(
                "reverse_claim: claim references a missing item",
            ));
        };
        let mut item = item_from_row(&item_row)?;
        item.release(claim.amount)?;

        sqlx::query("UPDATE items SET remaining_quantity = $2 WHERE id = $1")
            .bind(item.id.as_uuid())
            .bind(item.remaining_quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("reverse_claim.credit", e))?;

        sqlx::query("UPDATE claims SET active = FALSE WHERE id = $1")
            .bind(claim.id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("reverse_claim.deactivate", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("reverse_claim.commit", e))?;

        Ok(claim)
    }

    #[instrument(skip(self), fields(item_id = %item_id), err)]
    async fn deactivate_item(&self, item_id: ItemId) -> DomainResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("deactivate_item.begin", e))?;

        let result = sqlx::query("UPDATE items SET active = FALSE WHERE id = $1")
            .bind(item_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("deactivate_item.item", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found());
        }

        sqlx::query("UPDATE claims SET active = FALSE WHERE item_id = $1 AND active")
            .bind(item_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("deactivate_item.claims", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("deactivate_item.commit", e))?;

        Ok(())
    }
}

const USER_COLUMNS: &str =
    "id, email, name, phone, admin, login_code, code_expires_at, created_at";

fn user_from_row(row: &PgRow) -> DomainResult<User> {
    let code: Option<String> = row
        .try_get("login_code")
        .map_err(|e| map_sqlx_error("decode_user", e))?;
    let expires_at: Option<DateTime<Utc>> = row
        .try_get("code_expires_at")
        .map_err(|e| map_sqlx_error("decode_user", e))?;

    Ok(User {
        id: UserId::from_uuid(
            row.try_get("id")
                .map_err(|e| map_sqlx_error("decode_user", e))?,
        ),
        email: row
            .try_get("email")
            .map_err(|e| map_sqlx_error("decode_user", e))?,
        name: row
            .try_get("name")
            .map_err(|e| map_sqlx_error("decode_user", e))?,
        phone: row
            .try_get("phone")
            .map_err(|e| map_sqlx_error("decode_user", e))?,
        admin: row
            .try_get("admin")
            .map_err(|e| map_sqlx_error("decode_user", e))?,
        login_code: match (code, expires_at) {
            (Some(code), Some(expires_at)) => Some(LoginCode { code, expires_at }),
            _ => None,
        },
        created_at: row
            .try_get("created_at")
            .map_err(|e| map_sqlx_error("decode_user", e))?,
    })
}

/// Postgres-backed user accounts.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, code), err)]
    async fn issue_login_code(&self, email: &str, code: LoginCode) -> DomainResult<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, login_code, code_expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
                SET login_code = EXCLUDED.login_code,
                    code_expires_at = EXCLUDED.code_expires_at
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(UserId::new().as_uuid())
        .bind(email)
        .bind(&code.code)
        .bind(code.expires_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("issue_login_code", e))?;

        user_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_email", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, new), err)]
    async fn create_user(&self, new: NewUser) -> DomainResult<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, name, phone, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(UserId::new().as_uuid())
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.phone)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?;

        user_from_row(&row)
    }

    #[instrument(skip(self, update), fields(user_id = %update.id), err)]
    async fn update_user(&self, update: UserUpdate) -> DomainResult<User> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = $2, email = $3, phone = $4, admin = $5
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(update.id.as_uuid())
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(update.admin)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        match row {
            Some(row) => user_from_row(&row),
            None => Err(DomainError::not_found()),
        }
    }

    #[instrument(skip(self), err)]
    async fn remove_user(&self, id: UserId) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_user", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_users(&self) -> DomainResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;

        rows.iter().map(user_from_row).collect()
    }
}

const POST_COLUMNS: &str = "id, title, blocks, created_at";

fn post_from_row(row: &PgRow) -> DomainResult<Post> {
    let blocks: serde_json::Value = row
        .try_get("blocks")
        .map_err(|e| map_sqlx_error("decode_post", e))?;
    let blocks: Vec<Block> = serde_json::from_value(blocks)
        .map_err(|e| DomainError::persistence(format!("decode_post: {e}")))?;

    Ok(Post {
        id: PostId::from_uuid(
            row.try_get("id")
                .map_err(|e| map_sqlx_error("decode_post", e))?,
        ),
        title: row
            .try_get("title")
            .map_err(|e| map_sqlx_error("decode_post", e))?,
        blocks,
        created_at: row
            .try_get("created_at")
            .map_err(|e| map_sqlx_error("decode_post", e))?,
    })
}

/// Postgres-backed blog posts.
#[derive(Debug, Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn blocks_json(post: &Post) -> DomainResult<serde_json::Value> {
        serde_json::to_value(&post.blocks)
            .map_err(|e| DomainError::persistence(format!("encode_post: {e}")))
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    #[instrument(skip(self, post), fields(post_id = %post.id), err)]
    async fn create_post(&self, post: Post) -> DomainResult<Post> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, blocks, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(&post.title)
        .bind(Self::blocks_json(&post)?)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_post", e))?;

        Ok(post)
    }

    #[instrument(skip(self, post), fields(post_id = %post.id), err)]
    async fn update_post(&self, post: Post) -> DomainResult<Post> {
        let result = sqlx::query("UPDATE posts SET title = $2, blocks = $3 WHERE id = $1")
            .bind(post.id.as_uuid())
            .bind(&post.title)
            .bind(Self::blocks_json(&post)?)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_post", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found());
        }
        Ok(post)
    }

    #[instrument(skip(self), err)]
    async fn get_post(&self, id: PostId) -> DomainResult<Post> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_post", e))?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(DomainError::not_found()),
        }
    }

    #[instrument(skip(self), err)]
    async fn list_posts(&self) -> DomainResult<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_posts", e))?;

        rows.iter().map(post_from_row).collect()
    }
}

const MESSAGE_COLUMNS: &str = "id, title, body, created_at";

fn message_from_row(row: &PgRow) -> DomainResult<Message> {
    Ok(Message {
        id: MessageId::from_uuid(
            row.try_get("id")
                .map_err(|e| map_sqlx_error("decode_message", e))?,
        ),
        title: row
            .try_get("title")
            .map_err(|e| map_sqlx_error("decode_message", e))?,
        body: row
            .try_get("body")
            .map_err(|e| map_sqlx_error("decode_message", e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| map_sqlx_error("decode_message", e))?,
    })
}

/// Postgres-backed broadcast messages.
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    #[instrument(skip(self, message), fields(message_id = %message.id), err)]
    async fn create_message(&self, message: Message) -> DomainResult<Message> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, title, body, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(&message.title)
        .bind(&message.body)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_message", e))?;

        Ok(message)
    }

    #[instrument(skip(self), err)]
    async fn list_messages(&self) -> DomainResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_messages", e))?;

        rows.iter().map(message_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn delete_message(&self, id: MessageId) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_message", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found());
        }
        Ok(())
    }
}
