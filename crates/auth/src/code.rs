use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login codes stay valid for 15 minutes from issuance.
pub const LOGIN_CODE_TTL_MINUTES: i64 = 15;

/// A short-lived 6-digit code emailed to a user to establish a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl LoginCode {
    /// Generate a fresh code expiring [`LOGIN_CODE_TTL_MINUTES`] from `now`.
    ///
    /// Entropy comes from a random UUID; six decimal digits is what the
    /// email template and front end expect.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let seed = u32::from_le_bytes(
            Uuid::new_v4().as_bytes()[..4]
                .try_into()
                .expect("uuid has at least 4 bytes"),
        );
        Self {
            code: format!("{:06}", seed % 1_000_000),
            expires_at: now + Duration::minutes(LOGIN_CODE_TTL_MINUTES),
        }
    }

    /// Constant policy check: the presented code must match and the code
    /// must not have expired.
    pub fn matches(&self, presented: &str, now: DateTime<Utc>) -> bool {
        self.code == presented && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_is_six_digits() {
        let code = LoginCode::generate(Utc::now());
        assert_eq!(code.code.len(), 6);
        assert!(code.code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn matching_code_within_ttl_is_accepted() {
        let now = Utc::now();
        let code = LoginCode::generate(now);
        assert!(code.matches(&code.code.clone(), now + Duration::minutes(14)));
    }

    #[test]
    fn wrong_code_is_rejected() {
        let now = Utc::now();
        let code = LoginCode::generate(now);
        assert!(!code.matches("000000", now) || code.code == "000000");
        assert!(!code.matches("not-even-digits", now));
    }

    #[test]
    fn expired_code_is_rejected() {
        let now = Utc::now();
        let code = LoginCode::generate(now);
        assert!(!code.matches(&code.code.clone(), now + Duration::minutes(16)));
    }
}
