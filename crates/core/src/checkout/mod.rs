//! Checkout domain: freezing a cart into an immutable checkout, the
//! checkout/order status machines, and the per-seller order fan-out.

pub mod error;
pub mod state;
pub mod totals;

pub use error::CheckoutError;
pub use state::{CheckoutStatus, OrderStatus};
pub use totals::{CheckoutTotals, OrderDraft, split_orders, verify_totals};
