use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmstand_core::{DomainError, DomainResult, PostId};

/// Kind of a post block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Image,
}

/// One ordered block of post content: a paragraph of text or a reference to
/// an already-uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Text body, or the image path for image blocks.
    pub content: String,
    pub position: u32,
}

/// A blog post composed of ordered blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub blocks: Vec<Block>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        id: PostId,
        title: impl Into<String>,
        blocks: Vec<Block>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("post title cannot be empty"));
        }
        let mut blocks = blocks;
        blocks.sort_by_key(|b| b.position);
        Ok(Self {
            id,
            title,
            blocks,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_kept_in_position_order() {
        let post = Post::new(
            PostId::new(),
            "Harvest news",
            vec![
                Block {
                    kind: BlockKind::Image,
                    content: "/202608/field.jpg".into(),
                    position: 1,
                },
                Block {
                    kind: BlockKind::Text,
                    content: "First paragraph".into(),
                    position: 0,
                },
            ],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(post.blocks[0].position, 0);
        assert!(matches!(post.blocks[0].kind, BlockKind::Text));
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = Post::new(PostId::new(), " ", vec![], Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
