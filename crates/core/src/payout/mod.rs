//! Payout processing: request validation and the payout status machine.

pub mod error;
pub mod state;

pub use error::PayoutError;
pub use state::{PayoutRequest, PayoutStatus};
