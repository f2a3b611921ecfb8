//! Core business logic for Telar.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, state machines, and invariant checks live here; the db
//! crate wires them to PostgreSQL inside transaction boundaries.
//!
//! # Modules
//!
//! - `context` - Sale context (marketplace vs tenant storefront)
//! - `ledger` - Double-entry posting validation and balance aggregation
//! - `charges` - Fee/tax rule resolution (the charge rule engine)
//! - `pricing` - Context-scoped product price resolution
//! - `cart` - Cart state machine and optimistic version checking
//! - `checkout` - Checkout state machine, totals, and per-seller order split
//! - `payment` - Payment intent/attempt lifecycle tracking
//! - `payout` - Shop payout lifecycle and balance preconditions

pub mod cart;
pub mod charges;
pub mod checkout;
pub mod context;
pub mod ledger;
pub mod payment;
pub mod payout;
pub mod pricing;
