//! Initial database migration.
//!
//! Creates the `payments` and `ledger` schemas: enums, commerce tables
//! (prices, charge rules, carts, checkouts, orders, payment tracking,
//! payouts) and the double-entry ledger tables.
//!
//! The `auth` and `shop` schemas hold minimal stand-ins for the identity
//! and catalog services this backend integrates with.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: EXTENSIONS & EXTERNAL SCHEMAS
        // ============================================================
        db.execute_unprepared(EXTENSIONS_SQL).await?;
        db.execute_unprepared(EXTERNAL_SCHEMAS_SQL).await?;

        // ============================================================
        // PART 2: PAYMENTS SCHEMA & ENUMS
        // ============================================================
        db.execute_unprepared(PAYMENTS_SCHEMA_SQL).await?;
        db.execute_unprepared(PAYMENTS_ENUMS_SQL).await?;

        // ============================================================
        // PART 3: PROVIDERS, PRICES & CHARGE RULES
        // ============================================================
        db.execute_unprepared(PAYMENT_PROVIDERS_SQL).await?;
        db.execute_unprepared(PRODUCT_PRICES_SQL).await?;
        db.execute_unprepared(CHARGE_TYPES_SQL).await?;
        db.execute_unprepared(CHARGE_RULES_SQL).await?;

        // ============================================================
        // PART 4: CARTS
        // ============================================================
        db.execute_unprepared(CARTS_SQL).await?;
        db.execute_unprepared(CART_SHIPPING_INFO_SQL).await?;
        db.execute_unprepared(CART_ITEMS_SQL).await?;

        // ============================================================
        // PART 5: CHECKOUTS & ORDERS
        // ============================================================
        db.execute_unprepared(CHECKOUTS_SQL).await?;
        db.execute_unprepared(ORDERS_SQL).await?;
        db.execute_unprepared(ORDER_ITEMS_SQL).await?;
        db.execute_unprepared(CHECKOUT_CHARGES_SQL).await?;

        // ============================================================
        // PART 6: PAYMENT INTENTS, ATTEMPTS & PAYOUTS
        // ============================================================
        db.execute_unprepared(PAYMENT_INTENTS_SQL).await?;
        db.execute_unprepared(PAYMENT_ATTEMPTS_SQL).await?;
        db.execute_unprepared(PAYOUTS_SQL).await?;

        // ============================================================
        // PART 7: LEDGER SCHEMA
        // ============================================================
        db.execute_unprepared(LEDGER_SCHEMA_SQL).await?;
        db.execute_unprepared(LEDGER_ENUMS_SQL).await?;
        db.execute_unprepared(LEDGER_ACCOUNTS_SQL).await?;
        db.execute_unprepared(LEDGER_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const EXTENSIONS_SQL: &str = r#"
CREATE EXTENSION IF NOT EXISTS "uuid-ossp";
CREATE EXTENSION IF NOT EXISTS "pgcrypto";
"#;

// Stand-ins for the identity and catalog services. Only the columns this
// backend references are modeled.
const EXTERNAL_SCHEMAS_SQL: &str = r"
CREATE SCHEMA IF NOT EXISTS auth;
CREATE TABLE IF NOT EXISTS auth.users (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    email text UNIQUE,
    full_name text
);

CREATE SCHEMA IF NOT EXISTS shop;
CREATE TABLE IF NOT EXISTS shop.artisan_shops (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    name text NOT NULL
);
CREATE TABLE IF NOT EXISTS shop.products (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    shop_id uuid REFERENCES shop.artisan_shops(id),
    name text,
    sku text,
    price_minor bigint DEFAULT 0
);
";

const PAYMENTS_SCHEMA_SQL: &str = r"
CREATE SCHEMA IF NOT EXISTS payments;
";

const PAYMENTS_ENUMS_SQL: &str = r"
DO $$
BEGIN
  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'sale_context') THEN
    CREATE TYPE payments.sale_context AS ENUM ('marketplace', 'tenant');
  END IF;
  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'cart_status') THEN
    CREATE TYPE payments.cart_status AS ENUM ('open', 'locked', 'converted', 'abandoned');
  END IF;
  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'checkout_status') THEN
    CREATE TYPE payments.checkout_status AS ENUM ('created', 'awaiting_payment', 'paid', 'failed', 'canceled', 'refunded', 'partial_refunded');
  END IF;
  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'order_status') THEN
    CREATE TYPE payments.order_status AS ENUM ('pending_fulfillment', 'delivered', 'canceled', 'refunded');
  END IF;
  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'charge_direction') THEN
    CREATE TYPE payments.charge_direction AS ENUM ('add', 'subtract');
  END IF;
  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'charge_scope') THEN
    CREATE TYPE payments.charge_scope AS ENUM ('checkout', 'order');
  END IF;
  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'payment_intent_status') THEN
    CREATE TYPE payments.payment_intent_status AS ENUM ('requires_payment_method', 'requires_action', 'processing', 'succeeded', 'failed', 'canceled');
  END IF;
  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'payment_attempt_status') THEN
    CREATE TYPE payments.payment_attempt_status AS ENUM ('created', 'redirected', 'authorized', 'captured', 'failed', 'canceled');
  END IF;
  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'payout_status') THEN
    CREATE TYPE payments.payout_status AS ENUM ('requested', 'processing', 'paid', 'failed', 'canceled');
  END IF;
END$$;
";

const PAYMENT_PROVIDERS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.payment_providers (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    code text NOT NULL UNIQUE,
    display_name text NOT NULL,
    is_active boolean NOT NULL DEFAULT true,
    capabilities jsonb NOT NULL DEFAULT '{}'::jsonb,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);
";

// The partial unique index is the invariant that at most one price row
// per (product, context, shop, currency) is open at any moment.
const PRODUCT_PRICES_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.product_prices (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    product_id uuid NOT NULL REFERENCES shop.products(id) ON DELETE CASCADE,
    context payments.sale_context NOT NULL,
    context_shop_id uuid NULL REFERENCES shop.artisan_shops(id) ON DELETE CASCADE,
    currency char(3) NOT NULL,
    amount_minor bigint NOT NULL CHECK (amount_minor >= 0),
    price_source text NOT NULL DEFAULT 'product_base' CHECK (price_source IN ('product_base', 'override')),
    is_active boolean NOT NULL DEFAULT true,
    effective_from timestamptz NOT NULL DEFAULT now(),
    effective_to timestamptz NULL,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now(),
    CONSTRAINT product_prices_context_chk CHECK (
        (context = 'marketplace' AND context_shop_id IS NULL) OR
        (context = 'tenant' AND context_shop_id IS NOT NULL)
    )
);
CREATE UNIQUE INDEX IF NOT EXISTS uq_product_prices_open
    ON payments.product_prices(product_id, context, context_shop_id, currency)
    WHERE is_active = true AND effective_to IS NULL;
";

const CHARGE_TYPES_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.charge_types (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    code text NOT NULL UNIQUE,
    direction payments.charge_direction NOT NULL,
    scope payments.charge_scope NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now()
);
";

const CHARGE_RULES_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.charge_rules (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    charge_type_id uuid NOT NULL REFERENCES payments.charge_types(id) ON DELETE RESTRICT,
    context payments.sale_context NOT NULL,
    context_shop_id uuid NULL REFERENCES shop.artisan_shops(id) ON DELETE CASCADE,
    currency char(3) NULL,
    rate_bps integer NULL CHECK (rate_bps IS NULL OR rate_bps >= 0),
    fixed_minor bigint NULL CHECK (fixed_minor IS NULL OR fixed_minor >= 0),
    priority integer NOT NULL DEFAULT 100,
    is_active boolean NOT NULL DEFAULT true,
    effective_from timestamptz NOT NULL DEFAULT now(),
    effective_to timestamptz NULL,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);
";

const CARTS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.carts (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    buyer_user_id uuid NOT NULL REFERENCES auth.users(id) ON DELETE CASCADE,
    context payments.sale_context NOT NULL DEFAULT 'marketplace',
    context_shop_id uuid NULL REFERENCES shop.artisan_shops(id) ON DELETE CASCADE,
    currency char(3) NOT NULL DEFAULT 'COP',
    status payments.cart_status NOT NULL DEFAULT 'open',
    version integer NOT NULL DEFAULT 1,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now(),
    locked_at timestamptz NULL,
    converted_at timestamptz NULL
);
";

const CART_SHIPPING_INFO_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.cart_shipping_info (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    cart_id uuid NOT NULL REFERENCES payments.carts(id) ON DELETE CASCADE,
    full_name text NOT NULL,
    email text NOT NULL,
    phone text NOT NULL,
    address text NOT NULL,
    city_code integer NOT NULL,
    city_name text NOT NULL,
    region_name text NOT NULL,
    postal_code text NOT NULL,
    shipping_method text NOT NULL,
    tracking_number text,
    freight_minor bigint DEFAULT 0,
    freight_surcharge_minor bigint DEFAULT 0,
    freight_total_minor bigint DEFAULT 0,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);
";

const CART_ITEMS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.cart_items (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    cart_id uuid NOT NULL REFERENCES payments.carts(id) ON DELETE CASCADE,
    product_id uuid NOT NULL REFERENCES shop.products(id) ON DELETE RESTRICT,
    seller_shop_id uuid NOT NULL REFERENCES shop.artisan_shops(id) ON DELETE RESTRICT,
    quantity integer NOT NULL CHECK (quantity > 0),
    currency char(3) NOT NULL,
    unit_price_minor bigint NOT NULL CHECK (unit_price_minor >= 0),
    price_source text NOT NULL CHECK (price_source IN ('product_base', 'override')),
    price_ref_id uuid NULL REFERENCES payments.product_prices(id) ON DELETE SET NULL,
    metadata jsonb NOT NULL DEFAULT '{}'::jsonb,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);
";

const CHECKOUTS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.checkouts (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    cart_id uuid NOT NULL REFERENCES payments.carts(id) ON DELETE RESTRICT,
    buyer_user_id uuid NOT NULL REFERENCES auth.users(id) ON DELETE CASCADE,
    context payments.sale_context NOT NULL,
    context_shop_id uuid NULL REFERENCES shop.artisan_shops(id) ON DELETE CASCADE,
    currency char(3) NOT NULL,
    status payments.checkout_status NOT NULL DEFAULT 'created',
    subtotal_minor bigint NOT NULL DEFAULT 0 CHECK (subtotal_minor >= 0),
    charges_total_minor bigint NOT NULL DEFAULT 0 CHECK (charges_total_minor >= 0),
    total_minor bigint NOT NULL DEFAULT 0 CHECK (total_minor >= 0),
    idempotency_key text NOT NULL UNIQUE,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);
";

const ORDERS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.orders (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    checkout_id uuid NOT NULL REFERENCES payments.checkouts(id) ON DELETE CASCADE,
    seller_shop_id uuid NOT NULL REFERENCES shop.artisan_shops(id) ON DELETE RESTRICT,
    currency char(3) NOT NULL,
    gross_subtotal_minor bigint NOT NULL CHECK (gross_subtotal_minor >= 0),
    net_to_seller_minor bigint NOT NULL CHECK (net_to_seller_minor >= 0),
    status payments.order_status NOT NULL DEFAULT 'pending_fulfillment',
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now(),
    UNIQUE (checkout_id, seller_shop_id)
);
";

const ORDER_ITEMS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.order_items (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    order_id uuid NOT NULL REFERENCES payments.orders(id) ON DELETE CASCADE,
    product_id uuid NOT NULL REFERENCES shop.products(id) ON DELETE RESTRICT,
    quantity integer NOT NULL CHECK (quantity > 0),
    currency char(3) NOT NULL,
    unit_price_minor bigint NOT NULL CHECK (unit_price_minor >= 0),
    line_total_minor bigint NOT NULL CHECK (line_total_minor >= 0),
    metadata jsonb NOT NULL DEFAULT '{}'::jsonb,
    created_at timestamptz NOT NULL DEFAULT now()
);
";

const CHECKOUT_CHARGES_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.checkout_charges (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    checkout_id uuid NOT NULL REFERENCES payments.checkouts(id) ON DELETE CASCADE,
    charge_type_id uuid NOT NULL REFERENCES payments.charge_types(id) ON DELETE RESTRICT,
    scope payments.charge_scope NOT NULL,
    order_id uuid NULL REFERENCES payments.orders(id) ON DELETE CASCADE,
    amount_minor bigint NOT NULL,
    currency char(3) NOT NULL,
    rule_id uuid NULL REFERENCES payments.charge_rules(id) ON DELETE SET NULL,
    basis jsonb NOT NULL DEFAULT '{}'::jsonb,
    created_at timestamptz NOT NULL DEFAULT now(),
    CONSTRAINT checkout_charges_scope_chk CHECK (
        (scope = 'checkout' AND order_id IS NULL) OR
        (scope = 'order' AND order_id IS NOT NULL)
    )
);
";

const PAYMENT_INTENTS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.payment_intents (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    checkout_id uuid NOT NULL REFERENCES payments.checkouts(id) ON DELETE RESTRICT,
    provider_id uuid NOT NULL REFERENCES payments.payment_providers(id) ON DELETE RESTRICT,
    currency char(3) NOT NULL,
    amount_minor bigint NOT NULL CHECK (amount_minor >= 0),
    status payments.payment_intent_status NOT NULL DEFAULT 'requires_payment_method',
    external_intent_id text NULL,
    provider_data jsonb NOT NULL DEFAULT '{}'::jsonb,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now(),
    UNIQUE (provider_id, external_intent_id)
);
";

const PAYMENT_ATTEMPTS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.payment_attempts (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    payment_intent_id uuid NOT NULL REFERENCES payments.payment_intents(id) ON DELETE CASCADE,
    attempt_no integer NOT NULL CHECK (attempt_no > 0),
    status payments.payment_attempt_status NOT NULL DEFAULT 'created',
    idempotency_key text NOT NULL UNIQUE,
    request_payload jsonb NOT NULL DEFAULT '{}'::jsonb,
    response_payload jsonb NOT NULL DEFAULT '{}'::jsonb,
    error_message text NULL,
    created_at timestamptz NOT NULL DEFAULT now(),
    UNIQUE (payment_intent_id, attempt_no)
);
";

const PAYOUTS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payments.payouts (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    shop_id uuid NOT NULL REFERENCES shop.artisan_shops(id) ON DELETE RESTRICT,
    currency char(3) NOT NULL,
    amount_minor bigint NOT NULL CHECK (amount_minor > 0),
    status payments.payout_status NOT NULL DEFAULT 'requested',
    external_payout_id text NULL,
    destination jsonb NOT NULL DEFAULT '{}'::jsonb,
    idempotency_key text NOT NULL UNIQUE,
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);
";

const LEDGER_SCHEMA_SQL: &str = r"
CREATE SCHEMA IF NOT EXISTS ledger;
";

const LEDGER_ENUMS_SQL: &str = r"
DO $$
BEGIN
  IF NOT EXISTS (
    SELECT 1 FROM pg_type t
    JOIN pg_namespace n ON t.typnamespace = n.oid
    WHERE t.typname = 'owner_type' AND n.nspname = 'ledger'
  ) THEN
    CREATE TYPE ledger.owner_type AS ENUM ('platform', 'shop');
  END IF;

  IF NOT EXISTS (
    SELECT 1 FROM pg_type t
    JOIN pg_namespace n ON t.typnamespace = n.oid
    WHERE t.typname = 'account_type' AND n.nspname = 'ledger'
  ) THEN
    CREATE TYPE ledger.account_type AS ENUM ('clearing', 'revenue', 'taxes', 'pending', 'available', 'payout_in_transit');
  END IF;
END$$;
";

const LEDGER_ACCOUNTS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS ledger.accounts (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    owner_type ledger.owner_type NOT NULL,
    owner_id uuid NULL,
    currency char(3) NOT NULL,
    account_type ledger.account_type NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now(),
    CONSTRAINT accounts_owner_chk CHECK (
        (owner_type = 'platform' AND owner_id IS NULL) OR
        (owner_type = 'shop' AND owner_id IS NOT NULL)
    ),
    UNIQUE NULLS NOT DISTINCT (owner_type, owner_id, currency, account_type)
);
";

// One transaction per business event: the idempotency key dedupes
// retries, the (reference_type, reference_id) pair dedupes the event.
const LEDGER_TRANSACTIONS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS ledger.transactions (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    reference_type text NOT NULL,
    reference_id uuid NOT NULL,
    currency char(3) NOT NULL,
    description text NULL,
    idempotency_key text NOT NULL UNIQUE,
    created_at timestamptz NOT NULL DEFAULT now(),
    UNIQUE (reference_type, reference_id)
);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE IF NOT EXISTS ledger.entries (
    id uuid PRIMARY KEY DEFAULT uuid_generate_v4(),
    transaction_id uuid NOT NULL REFERENCES ledger.transactions(id) ON DELETE CASCADE,
    account_id uuid NOT NULL REFERENCES ledger.accounts(id) ON DELETE RESTRICT,
    amount_minor bigint NOT NULL CHECK (amount_minor <> 0),
    metadata jsonb NOT NULL DEFAULT '{}'::jsonb,
    created_at timestamptz NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS idx_ledger_entries_account
    ON ledger.entries(account_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ledger.entries CASCADE;
DROP TABLE IF EXISTS ledger.transactions CASCADE;
DROP TABLE IF EXISTS ledger.accounts CASCADE;
DROP TYPE IF EXISTS ledger.account_type CASCADE;
DROP TYPE IF EXISTS ledger.owner_type CASCADE;
DROP SCHEMA IF EXISTS ledger CASCADE;

DROP TABLE IF EXISTS payments.payouts CASCADE;
DROP TABLE IF EXISTS payments.payment_attempts CASCADE;
DROP TABLE IF EXISTS payments.payment_intents CASCADE;
DROP TABLE IF EXISTS payments.checkout_charges CASCADE;
DROP TABLE IF EXISTS payments.order_items CASCADE;
DROP TABLE IF EXISTS payments.orders CASCADE;
DROP TABLE IF EXISTS payments.checkouts CASCADE;
DROP TABLE IF EXISTS payments.cart_items CASCADE;
DROP TABLE IF EXISTS payments.cart_shipping_info CASCADE;
DROP TABLE IF EXISTS payments.carts CASCADE;
DROP TABLE IF EXISTS payments.charge_rules CASCADE;
DROP TABLE IF EXISTS payments.charge_types CASCADE;
DROP INDEX IF EXISTS payments.uq_product_prices_open;
DROP TABLE IF EXISTS payments.product_prices CASCADE;
DROP TABLE IF EXISTS payments.payment_providers CASCADE;
DROP TYPE IF EXISTS payments.payout_status CASCADE;
DROP TYPE IF EXISTS payments.payment_attempt_status CASCADE;
DROP TYPE IF EXISTS payments.payment_intent_status CASCADE;
DROP TYPE IF EXISTS payments.charge_scope CASCADE;
DROP TYPE IF EXISTS payments.charge_direction CASCADE;
DROP TYPE IF EXISTS payments.order_status CASCADE;
DROP TYPE IF EXISTS payments.checkout_status CASCADE;
DROP TYPE IF EXISTS payments.cart_status CASCADE;
DROP TYPE IF EXISTS payments.sale_context CASCADE;
DROP SCHEMA IF EXISTS payments CASCADE;

DROP TABLE IF EXISTS shop.products CASCADE;
DROP TABLE IF EXISTS shop.artisan_shops CASCADE;
DROP TABLE IF EXISTS auth.users CASCADE;
";
