use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmstand_core::{DomainError, DomainResult, MessageId};

/// A broadcast message shown on the community board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        id: MessageId,
        title: impl Into<String>,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let title = title.into();
        let body = body.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("message title cannot be empty"));
        }
        if body.trim().is_empty() {
            return Err(DomainError::validation("message body cannot be empty"));
        }
        Ok(Self {
            id,
            title,
            body,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_requires_title_and_body() {
        assert!(Message::new(MessageId::new(), "", "body", Utc::now()).is_err());
        assert!(Message::new(MessageId::new(), "title", " ", Utc::now()).is_err());
        assert!(Message::new(MessageId::new(), "title", "body", Utc::now()).is_ok());
    }
}
