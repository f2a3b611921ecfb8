//! `SeaORM` entity definitions for the `payments` and `ledger` schemas.

pub mod accounts;
pub mod cart_items;
pub mod carts;
pub mod charge_rules;
pub mod charge_types;
pub mod checkout_charges;
pub mod checkouts;
pub mod ledger_entries;
pub mod ledger_transactions;
pub mod order_items;
pub mod orders;
pub mod payment_attempts;
pub mod payment_intents;
pub mod payment_providers;
pub mod payouts;
pub mod product_prices;
pub mod sea_orm_active_enums;
