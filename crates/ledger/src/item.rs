use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmstand_core::{DomainError, DomainResult, ItemId};

/// A claimable inventory entry.
///
/// `remaining_quantity` is derived state, not independently authoritative:
/// it must always equal `total_quantity` minus the sum of amounts over the
/// item's active claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    /// Opaque path to a previously uploaded photo, if any. Upload and
    /// resizing are handled outside this system.
    pub photo_path: Option<String>,
    pub total_quantity: i64,
    pub remaining_quantity: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Create a new active item with `remaining == total`.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        description: impl Into<String>,
        photo_path: Option<String>,
        total_quantity: i64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if total_quantity < 0 {
            return Err(DomainError::validation("total_quantity cannot be negative"));
        }
        Ok(Self {
            id,
            name,
            description: description.into(),
            photo_path,
            total_quantity,
            remaining_quantity: total_quantity,
            active: true,
            created_at,
        })
    }

    /// Quantity not currently available. For an item whose remaining
    /// quantity reflects its active claims this equals their sum; after
    /// deactivation it also counts the frozen claims.
    pub fn held_quantity(&self) -> i64 {
        self.total_quantity - self.remaining_quantity
    }

    /// Decide whether a claim of `amount` is admissible right now.
    ///
    /// Pure check, no mutation. Adapters must call this on the persisted
    /// row state at commit time (under a row lock), never on a value cached
    /// earlier in the request.
    pub fn check_claim(&self, amount: i64) -> DomainResult<()> {
        if !self.active {
            return Err(DomainError::not_found());
        }
        if amount <= 0 {
            return Err(DomainError::validation("claim amount must be positive"));
        }
        if amount > self.remaining_quantity {
            return Err(DomainError::insufficient_stock(format!(
                "requested {} but only {} remaining",
                amount, self.remaining_quantity
            )));
        }
        Ok(())
    }

    /// Apply an admissible claim: decrement remaining by `amount`.
    pub fn apply_claim(&mut self, amount: i64) -> DomainResult<()> {
        self.check_claim(amount)?;
        self.remaining_quantity -= amount;
        Ok(())
    }

    /// Credit a reversed claim's amount back to remaining.
    ///
    /// Crediting past `total_quantity` would mean the claim was already
    /// reversed or the ledger is corrupt; refuse rather than overshoot.
    pub fn release(&mut self, amount: i64) -> DomainResult<()> {
        if amount <= 0 {
            return Err(DomainError::validation("release amount must be positive"));
        }
        if self.remaining_quantity + amount > self.total_quantity {
            return Err(DomainError::conflict(
                "release would exceed total quantity",
            ));
        }
        self.remaining_quantity += amount;
        Ok(())
    }

    /// Re-total an item that may already have active claims.
    ///
    /// `active_claimed` is the sum of the item's active claim amounts; the
    /// store computes it from the claim records in the same transaction as
    /// the write. It cannot be derived from `total - remaining` here: claims
    /// frozen by deactivation are inactive but were never credited back, so
    /// that difference over-counts after a deactivate/update cycle.
    /// `remaining` becomes `new_total - active_claimed`; shrinking the total
    /// below the claimed sum is rejected so the ledger never goes negative.
    pub fn retotal(&mut self, new_total: i64, active_claimed: i64) -> DomainResult<()> {
        if new_total < 0 {
            return Err(DomainError::validation("total_quantity cannot be negative"));
        }
        if new_total < active_claimed {
            return Err(DomainError::validation(format!(
                "total_quantity {} is below the {} already claimed",
                new_total, active_claimed
            )));
        }
        self.total_quantity = new_total;
        self.remaining_quantity = new_total - active_claimed;
        Ok(())
    }

    /// Soft-delete: the item is no longer offered. Remaining quantity is
    /// left untouched; claim deactivation is the store's responsibility.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
