//! `SeaORM` Entity for the `payments.checkout_charges` table.
//!
//! Each row snapshots one resolved charge with its computation basis,
//! so totals can be re-derived even after the rule changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ChargeScope;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "payments", table_name = "checkout_charges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub checkout_id: Uuid,
    pub charge_type_id: Uuid,
    pub scope: ChargeScope,
    pub order_id: Option<Uuid>,
    pub amount_minor: i64,
    pub currency: String,
    pub rule_id: Option<Uuid>,
    pub basis: Json,
    pub created_at: DateTimeWithTimeZone,
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
        belongs_to = "super::charge_types::Entity",
        from = "Column::ChargeTypeId",
        to = "super::charge_types::Column::Id"
    )]
    ChargeTypes,
    #[sea_orm(
        belongs_to = "super::charge_rules::Entity",
        from = "Column::RuleId",
        to = "super::charge_rules::Column::Id"
    )]
    ChargeRules,
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Orders,
}

impl Related<super::checkouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Checkouts.def()
    }
}

impl Related<super::charge_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargeTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
