//! Inventory claim ledger domain module.
//!
//! This crate contains the business rules for items and claims, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). The
//! single invariant every operation must preserve:
//!
//! `remaining_quantity + Σ(amount of active claims) == total_quantity`
//!
//! Storage adapters are responsible for making check+mutate atomic (row lock
//! or equivalent); the decision logic itself lives here.

pub mod claim;
pub mod item;


pub use claim::Claim;
pub use item::Item;

/// Check the ledger invariant for one item against its claim set.
///
/// Inactive claims are excluded: their amounts have either been credited
/// back (reversal) or frozen by item deactivation. Deactivated items are
/// excluded entirely — they are no longer offered and their remaining
/// quantity is deliberately left as-is.
pub fn ledger_balanced(item: &Item, claims: &[Claim]) -> bool {
    if !item.active {
        return true;
    }
    let claimed: i64 = claims
        .iter()
        .filter(|c| c.active && c.item_id == item.id)
        .map(|c| c.amount)
        .sum();
    item.remaining_quantity >= 0
        && item.remaining_quantity <= item.total_quantity
        && item.remaining_quantity + claimed == item.total_quantity
}
