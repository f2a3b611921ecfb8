//! Charge rule engine.
//!
//! Resolves the platform fees and taxes applicable to a checkout or order:
//! active rules matched by sale context, currency and effective-date window,
//! applied in priority order. Absence of matching rules is a valid
//! zero-charge result, never an error.

pub mod engine;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::{ChargeRule, SaleContextMatch, resolve_charges};
pub use types::{ChargeBasis, ChargeDirection, ChargeLine, ChargeScope, buyer_charges_total};
