//! `SeaORM` Entity for the `payments.charge_rules` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SaleContext;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "payments", table_name = "charge_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub charge_type_id: Uuid,
    pub context: SaleContext,
    pub context_shop_id: Option<Uuid>,
    pub currency: Option<String>,
    pub rate_bps: Option<i32>,
    pub fixed_minor: Option<i64>,
    pub priority: i32,
    pub is_active: bool,
    pub effective_from: DateTimeWithTimeZone,
    pub effective_to: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charge_types::Entity",
        from = "Column::ChargeTypeId",
        to = "super::charge_types::Column::Id"
    )]
    ChargeTypes,
}

impl Related<super::charge_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargeTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
