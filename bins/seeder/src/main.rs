//! Database seeder for Telar development and testing.
//!
//! Seeds payment providers, the marketplace platform fee rule, and a few
//! product prices so a local checkout can run end to end.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use telar_core::charges::{ChargeDirection, ChargeScope, SaleContextMatch};
use telar_core::context::SaleContext;
use telar_core::pricing::{PriceKey, PriceSource};
use telar_db::repositories::{ChargeRuleRepository, NewChargeRule};
use telar_db::{PaymentRepository, PriceRepository};
use telar_shared::config::DatabaseConfig;
use telar_shared::types::{ChargeTypeId, Currency};

/// Sample product IDs (consistent for all seeds).
const PRODUCT_MOCHILA: &str = "00000000-0000-0000-0000-00000000a001";
const PRODUCT_SOMBRERO: &str = "00000000-0000-0000-0000-00000000a002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let config = DatabaseConfig {
        url: database_url,
        max_connections: 5,
        min_connections: 1,
    };

    println!("Connecting to database...");
    let db = telar_db::connect(&config)
        .await
        .expect("Failed to connect to database");

    println!("Seeding payment providers...");
    let payments = PaymentRepository::new(db.clone());
    payments
        .ensure_provider(
            "wompi",
            "Wompi",
            json!({ "methods": ["card", "pse", "nequi"] }),
        )
        .await
        .expect("Failed to seed wompi provider");
    payments
        .ensure_provider("mercadopago", "Mercado Pago", json!({ "methods": ["card"] }))
        .await
        .expect("Failed to seed mercadopago provider");

    println!("Seeding platform fee rule...");
    let charges = ChargeRuleRepository::new(db.clone());
    let fee_type = charges
        .ensure_type("platform_fee", ChargeDirection::Add, ChargeScope::Checkout)
        .await
        .expect("Failed to seed platform_fee charge type");

    let active = charges
        .load_active(SaleContext::Marketplace)
        .await
        .expect("Failed to load active charge rules");
    if active
        .iter()
        .any(|rule| rule.charge_type_id.into_inner() == fee_type.id)
    {
        println!("  platform_fee rule already present, skipping");
    } else {
        // 5% buyer-side marketplace fee, any COP checkout.
        charges
            .create_rule(NewChargeRule {
                charge_type_id: ChargeTypeId::from_uuid(fee_type.id),
                context: SaleContextMatch::Marketplace,
                currency: Some(Currency::Cop),
                rate_bps: Some(500),
                fixed_minor: None,
                priority: 10,
                effective_from: Utc::now(),
                effective_to: None,
            })
            .await
            .expect("Failed to seed platform_fee rule");
    }

    println!("Seeding product prices...");
    let prices = PriceRepository::new(db.clone());
    for (product_id, amount_minor) in [(PRODUCT_MOCHILA, 50_000), (PRODUCT_SOMBRERO, 80_000)] {
        let product_id = Uuid::parse_str(product_id).expect("bad seed product id");
        let key = PriceKey::new(product_id, SaleContext::Marketplace, Currency::Cop);
        let row = prices
            .rotate(&key, amount_minor, PriceSource::ProductBase)
            .await
            .expect("Failed to seed product price");
        println!("  {product_id} -> {} {}", row.amount_minor, row.currency.code());
    }

    println!("Seeding complete.");
}
