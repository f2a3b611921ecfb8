//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the `payments` and `ledger` schemas
//! - Repository abstractions for data access
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, CartRepository, ChargeRuleRepository, CheckoutRepository,
    PaymentRepository, PayoutRepository, PostingRepository, PriceRepository,
    SettlementRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use telar_shared::config::DatabaseConfig;

/// Establishes a pooled connection to the database.
///
/// The search path covers both the `payments` and `ledger` schemas so
/// entity queries can reference their enum types unqualified.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(&config.url);
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .set_schema_search_path("public,payments,ledger");
    Database::connect(options).await
}
