//! Charge type and rule repository.
//!
//! Loads candidate rule rows (joined with their charge type for direction
//! and scope) and hands them to the pure charge engine; rule selection and
//! pricing never happen in SQL.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use telar_core::charges::{ChargeDirection, ChargeRule, ChargeScope, SaleContextMatch};
use telar_core::context::SaleContext;
use telar_shared::AppError;
use telar_shared::types::{ChargeRuleId, ChargeTypeId, Currency, MinorAmount};

use crate::entities::sea_orm_active_enums;
use crate::entities::{charge_rules, charge_types};

fn db_err(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}

/// Input for creating a charge rule.
#[derive(Debug, Clone)]
pub struct NewChargeRule {
    /// The charge type this rule materializes.
    pub charge_type_id: ChargeTypeId,
    /// Context scope of the rule.
    pub context: SaleContextMatch,
    /// Currency restriction; `None` matches any currency.
    pub currency: Option<Currency>,
    /// Rate in basis points.
    pub rate_bps: Option<i32>,
    /// Fixed component, minor units.
    pub fixed_minor: Option<MinorAmount>,
    /// Application order; lower applies first.
    pub priority: i32,
    /// Start of the effective window (inclusive).
    pub effective_from: DateTime<Utc>,
    /// End of the effective window (exclusive); `None` = open-ended.
    pub effective_to: Option<DateTime<Utc>>,
}

/// Repository over `payments.charge_types` and `payments.charge_rules`.
#[derive(Debug, Clone)]
pub struct ChargeRuleRepository {
    db: DatabaseConnection,
}

impl ChargeRuleRepository {
    /// Creates a new charge rule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds or creates a charge type by its unique code.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn ensure_type(
        &self,
        code: &str,
        direction: ChargeDirection,
        scope: ChargeScope,
    ) -> Result<charge_types::Model, AppError> {
        if let Some(existing) = charge_types::Entity::find()
            .filter(charge_types::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(db_err)?
        {
            return Ok(existing);
        }

        let row = charge_types::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_owned()),
            direction: Set(direction.into()),
            scope: Set(scope.into()),
            created_at: Set(Utc::now().into()),
        };
        match row.insert(&self.db).await {
            Ok(model) => Ok(model),
            // Lost the unique race on code; the winner's row is what we want.
            Err(_) => charge_types::Entity::find()
                .filter(charge_types::Column::Code.eq(code))
                .one(&self.db)
                .await
                .map_err(db_err)?
                .ok_or_else(|| AppError::Database(format!("charge type {code} vanished"))),
        }
    }

    /// Creates a charge rule.
    ///
    /// # Errors
    ///
    /// Returns a database error on insert failure.
    pub async fn create_rule(
        &self,
        input: NewChargeRule,
    ) -> Result<charge_rules::Model, AppError> {
        let (context, context_shop_id) = match input.context {
            SaleContextMatch::Marketplace => (sea_orm_active_enums::SaleContext::Marketplace, None),
            SaleContextMatch::Tenant(shop) => (sea_orm_active_enums::SaleContext::Tenant, shop),
        };

        let now = Utc::now();
        let row = charge_rules::ActiveModel {
            id: Set(Uuid::new_v4()),
            charge_type_id: Set(input.charge_type_id.into_inner()),
            context: Set(context),
            context_shop_id: Set(context_shop_id),
            currency: Set(input.currency.map(|c| c.code().to_owned())),
            rate_bps: Set(input.rate_bps),
            fixed_minor: Set(input.fixed_minor),
            priority: Set(input.priority),
            is_active: Set(true),
            effective_from: Set(input.effective_from.into()),
            effective_to: Set(input.effective_to.map(Into::into)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        row.insert(&self.db).await.map_err(db_err)
    }

    /// Deactivates a rule. History stays; the engine skips inactive rows.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown rule id.
    pub async fn deactivate_rule(&self, rule_id: ChargeRuleId) -> Result<(), AppError> {
        let rule = charge_rules::Entity::find_by_id(rule_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("charge rule {rule_id}")))?;

        let mut active: charge_rules::ActiveModel = rule.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    /// Loads the active rules that could apply in a sale context.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn load_active(&self, context: SaleContext) -> Result<Vec<ChargeRule>, AppError> {
        load_rules(&self.db, context).await.map_err(db_err)
    }
}

/// Loads candidate rules for a sale context, joined with their charge types.
///
/// Filters only on the context discriminant and the active flag; the charge
/// engine applies the shop, currency and effective-window checks.
pub(crate) async fn load_rules<C: ConnectionTrait>(
    conn: &C,
    context: SaleContext,
) -> Result<Vec<ChargeRule>, DbErr> {
    let discriminant = match context {
        SaleContext::Marketplace => sea_orm_active_enums::SaleContext::Marketplace,
        SaleContext::Tenant(_) => sea_orm_active_enums::SaleContext::Tenant,
    };

    let rows = charge_rules::Entity::find()
        .find_also_related(charge_types::Entity)
        .filter(charge_rules::Column::Context.eq(discriminant))
        .filter(charge_rules::Column::IsActive.eq(true))
        .all(conn)
        .await?;

    let mut rules = Vec::with_capacity(rows.len());
    for (rule, charge_type) in rows {
        let charge_type = charge_type.ok_or_else(|| {
            DbErr::RecordNotFound(format!("charge type for rule {}", rule.id))
        })?;
        rules.push(to_core_rule(rule, &charge_type)?);
    }
    Ok(rules)
}

fn to_core_rule(
    rule: charge_rules::Model,
    charge_type: &charge_types::Model,
) -> Result<ChargeRule, DbErr> {
    let context = match rule.context {
        sea_orm_active_enums::SaleContext::Marketplace => SaleContextMatch::Marketplace,
        sea_orm_active_enums::SaleContext::Tenant => SaleContextMatch::Tenant(rule.context_shop_id),
    };
    let currency = rule
        .currency
        .as_deref()
        .map(str::parse::<Currency>)
        .transpose()
        .map_err(|e| DbErr::Type(format!("charge rule {}: {e}", rule.id)))?;

    Ok(ChargeRule {
        id: ChargeRuleId::from_uuid(rule.id),
        charge_type_id: ChargeTypeId::from_uuid(rule.charge_type_id),
        direction: charge_type.direction.into(),
        scope: charge_type.scope.into(),
        context,
        currency,
        rate_bps: rule.rate_bps,
        fixed_minor: rule.fixed_minor,
        priority: rule.priority,
        is_active: rule.is_active,
        effective_from: rule.effective_from.with_timezone(&Utc),
        effective_to: rule.effective_to.map(|t| t.with_timezone(&Utc)),
        created_at: rule.created_at.with_timezone(&Utc),
    })
}
