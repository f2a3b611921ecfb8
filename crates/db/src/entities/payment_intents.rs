//! `SeaORM` Entity for the `payments.payment_intents` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentIntentStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "payments", table_name = "payment_intents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub checkout_id: Uuid,
    pub provider_id: Uuid,
    pub currency: String,
    pub amount_minor: i64,
    pub status: PaymentIntentStatus,
    pub external_intent_id: Option<String>,
    pub provider_data: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::checkouts::Entity",
        from = "Column::CheckoutId",
        to = "super::checkouts::Column::Id"
    )]
    Checkouts,
    #[sea_orm(
        belongs_to = "super::payment_providers::Entity",
        from = "Column::ProviderId",
        to = "super::payment_providers::Column::Id"
    )]
    PaymentProviders,
    #[sea_orm(has_many = "super::payment_attempts::Entity")]
    PaymentAttempts,
}

impl Related<super::checkouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Checkouts.def()
    }
}

impl Related<super::payment_providers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentProviders.def()
    }
}

impl Related<super::payment_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentAttempts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
