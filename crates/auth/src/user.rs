use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmstand_core::UserId;

use crate::{code::LoginCode, role::Role};

/// A user account.
///
/// Accounts are created either explicitly by an admin or implicitly the
/// first time an email requests a login code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub admin: bool,
    /// Pending login code, if one was issued and not yet consumed.
    pub login_code: Option<LoginCode>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            email: email.into(),
            name: String::new(),
            phone: String::new(),
            admin: false,
            login_code: None,
            created_at,
        }
    }

    pub fn role(&self) -> Role {
        if self.admin { Role::Admin } else { Role::Customer }
    }

    /// Whether `presented` establishes a session for this account right now.
    pub fn verify_login_code(&self, presented: &str, now: DateTime<Utc>) -> bool {
        self.login_code
            .as_ref()
            .is_some_and(|c| c.matches(presented, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_without_pending_code_rejects_everything() {
        let user = User::new(UserId::new(), "a@example.com", Utc::now());
        assert!(!user.verify_login_code("123456", Utc::now()));
    }

    #[test]
    fn pending_code_is_honored() {
        let now = Utc::now();
        let mut user = User::new(UserId::new(), "a@example.com", now);
        let code = LoginCode::generate(now);
        user.login_code = Some(code.clone());

        assert!(user.verify_login_code(&code.code, now));
        assert_eq!(user.role(), Role::Customer);
    }
}
