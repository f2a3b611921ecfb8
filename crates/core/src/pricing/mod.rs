//! Context-scoped product pricing.
//!
//! A product has at most one open price per (product, context, shop,
//! currency), enforced by the partial unique index `uq_product_prices_open`.
//! Resolution never falls back across currency or context; changing a price is a
//! close-then-open rotation the db layer runs under a row lock.

pub mod error;
pub mod resolver;

pub use error::PricingError;
pub use resolver::{PriceKey, PriceRow, PriceSource, RotationPlan, resolve_price};
