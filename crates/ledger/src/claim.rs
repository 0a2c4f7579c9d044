use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmstand_core::{ClaimId, DomainError, DomainResult, ItemId, UserId};

/// A record of a user (or an admin on a user's behalf) taking a quantity of
/// an item.
///
/// Reversal marks the claim inactive and leaves the row queryable; claims
/// are never hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub amount: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Claim {
    /// Create a new active claim. The amount must be positive; whether it
    /// fits the item's remaining quantity is decided by
    /// [`Item::check_claim`](crate::Item::check_claim).
    pub fn new(
        id: ClaimId,
        item_id: ItemId,
        user_id: UserId,
        amount: i64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if amount <= 0 {
            return Err(DomainError::validation("claim amount must be positive"));
        }
        Ok(Self {
            id,
            item_id,
            user_id,
            amount,
            active: true,
            created_at,
        })
    }

    /// Mark the claim reversed. Reversing twice is rejected so the amount
    /// is never credited back more than once.
    pub fn reverse(&mut self) -> DomainResult<()> {
        if !self.active {
            return Err(DomainError::conflict("claim is already reversed"));
        }
        self.active = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(amount: i64) -> DomainResult<Claim> {
        Claim::new(
            ClaimId::new(),
            ItemId::new(),
            UserId::new(),
            amount,
            Utc::now(),
        )
    }

    #[test]
    fn new_claim_is_active() {
        let c = claim(5).unwrap();
        assert!(c.active);
        assert_eq!(c.amount, 5);
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        assert!(matches!(claim(0).unwrap_err(), DomainError::Validation(_)));
        assert!(matches!(claim(-1).unwrap_err(), DomainError::Validation(_)));
    }

    #[test]
    fn second_reversal_is_a_conflict() {
        let mut c = claim(5).unwrap();
        c.reverse().unwrap();
        let err = c.reverse().unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(!c.active);
    }
}
