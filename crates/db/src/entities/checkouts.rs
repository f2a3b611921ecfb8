//! `SeaORM` Entity for the `payments.checkouts` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CheckoutStatus, SaleContext};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "payments", table_name = "checkouts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cart_id: Uuid,
    pub buyer_user_id: Uuid,
    pub context: SaleContext,
    pub context_shop_id: Option<Uuid>,
    pub currency: String,
    pub status: CheckoutStatus,
    pub subtotal_minor: i64,
    pub charges_total_minor: i64,
    pub total_minor: i64,
    #[sea_orm(unique)]
    pub idempotency_key: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::carts::Entity",
        from = "Column::CartId",
        to = "super::carts::Column::Id"
    )]
    Carts,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
    #[sea_orm(has_many = "super::checkout_charges::Entity")]
    CheckoutCharges,
    #[sea_orm(has_many = "super::payment_intents::Entity")]
    PaymentIntents,
}

impl Related<super::carts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::checkout_charges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CheckoutCharges.def()
    }
}

impl Related<super::payment_intents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentIntents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
