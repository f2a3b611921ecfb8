//! `SeaORM` Entity for the `payments.payment_attempts` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentAttemptStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "payments", table_name = "payment_attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payment_intent_id: Uuid,
    pub attempt_no: i32,
    pub status: PaymentAttemptStatus,
    #[sea_orm(unique)]
    pub idempotency_key: String,
    pub request_payload: Json,
    pub response_payload: Json,
    pub error_message: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payment_intents::Entity",
        from = "Column::PaymentIntentId",
        to = "super::payment_intents::Column::Id"
    )]
    PaymentIntents,
}

impl Related<super::payment_intents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentIntents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
