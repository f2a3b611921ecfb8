//! Double-entry ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Account keys (owner, currency, account type)
//! - Posting validation (balance invariant, entry count, nonzero amounts)
//! - Idempotency decisions for replay-safe posting
//! - Balance aggregation over the append-only entry log
//! - Error types for ledger operations
//!
//! Balances are never stored; they are always derived by summing entries.
//! The zero-sum invariant is enforced here, before anything is persisted;
//! the schema deliberately has no CHECK for it.

pub mod account;
pub mod balance;
pub mod error;
pub mod posting;

#[cfg(test)]
mod posting_props;

pub use account::{AccountKey, AccountOwner, LedgerAccountType};
pub use balance::{AccountBalance, check_available};
pub use error::LedgerError;
pub use posting::{EntryLine, IdempotencyDecision, Posting, PostingReference, decide_idempotency};
