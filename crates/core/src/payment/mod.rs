//! Payment intent and attempt tracking.

pub mod error;
pub mod state;

pub use error::PaymentError;
pub use state::{PaymentAttemptStatus, PaymentIntentStatus, next_attempt_number};
