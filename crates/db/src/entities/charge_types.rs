//! `SeaORM` Entity for the `payments.charge_types` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ChargeDirection, ChargeScope};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "payments", table_name = "charge_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub direction: ChargeDirection,
    pub scope: ChargeScope,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::charge_rules::Entity")]
    ChargeRules,
}

impl Related<super::charge_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargeRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
