//! Repository layer over the payments and ledger schemas.
//!
//! Each repository owns one aggregate and keeps its invariants inside a
//! single database transaction. Pure decisions (status machines, posting
//! validation, charge resolution) live in `telar-core`; this layer only
//! loads rows, asks, and persists the answer.

pub mod account;
pub mod cart;
pub mod charge_rule;
pub mod checkout;
pub mod payment;
pub mod payout;
pub mod posting;
pub mod price;
pub mod settlement;

pub use account::AccountRepository;
pub use cart::{CartRepository, CartWithItems, NewCart, NewCartItem};
pub use charge_rule::{ChargeRuleRepository, NewChargeRule};
pub use checkout::{CheckoutRepository, CheckoutWithOrders, CreateCheckout};
pub use payment::{
    CreateIntent, IntentWithAttempts, PaymentRepository, RecordAttempt,
};
pub use payout::PayoutRepository;
pub use posting::{PostOutcome, PostingRepository, TransactionWithEntries};
pub use price::PriceRepository;
pub use settlement::SettlementRepository;
