use serde::Deserialize;
use serde_json::{Value, json};

use farmstand_auth::User;
use farmstand_content::{Block, BlockKind, Message, Post};
use farmstand_ledger::{Claim, Item};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RequestCodeBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeBody {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ClaimItemBody {
    pub item_id: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub photo_path: Option<String>,
    pub total_quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemBody {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub photo_path: Option<String>,
    pub total_quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemBody {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminClaimBody {
    pub item_id: String,
    pub user_id: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveClaimBody {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserBody {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct RemoveUserBody {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct BlockBody {
    pub kind: String,
    pub content: String,
    pub position: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<BlockBody>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageBody {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastBody {
    pub subject: String,
    pub body: String,
}

// -------------------------
// Response mapping
// -------------------------

pub fn item_to_json(item: &Item) -> Value {
    json!({
        "id": item.id.to_string(),
        "name": item.name,
        "description": item.description,
        "photo_path": item.photo_path,
        "total_quantity": item.total_quantity,
        "remaining_quantity": item.remaining_quantity,
        "active": item.active,
        "created_at": item.created_at.to_rfc3339(),
    })
}

pub fn claim_to_json(claim: &Claim, item_name: &str) -> Value {
    json!({
        "id": claim.id.to_string(),
        "item_id": claim.item_id.to_string(),
        "item_name": item_name,
        "user_id": claim.user_id.to_string(),
        "amount": claim.amount,
        "active": claim.active,
        "created_at": claim.created_at.to_rfc3339(),
    })
}

pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id.to_string(),
        "email": user.email,
        "name": user.name,
        "phone": user.phone,
        "admin": user.admin,
        "created_at": user.created_at.to_rfc3339(),
    })
}

pub fn post_to_json(post: &Post) -> Value {
    json!({
        "id": post.id.to_string(),
        "title": post.title,
        "blocks": post.blocks.iter().map(block_to_json).collect::<Vec<_>>(),
        "created_at": post.created_at.to_rfc3339(),
    })
}

fn block_to_json(block: &Block) -> Value {
    json!({
        "kind": match block.kind {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
        },
        "content": block.content,
        "position": block.position,
    })
}

pub fn message_to_json(message: &Message) -> Value {
    json!({
        "id": message.id.to_string(),
        "title": message.title,
        "body": message.body,
        "created_at": message.created_at.to_rfc3339(),
    })
}
