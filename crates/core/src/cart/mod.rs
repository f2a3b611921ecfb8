//! Cart domain: status machine, optimistic version locking, item drafts.

pub mod error;
pub mod state;

pub use error::CartError;
pub use state::{AbandonOutcome, CartItemDraft, CartStatus, cart_subtotal, check_version};
