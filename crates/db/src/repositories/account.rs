//! Account repository for the ledger account registry.
//!
//! Accounts are created lazily: the first posting that touches a
//! (owner, currency, type) key inserts the row. The unique constraint on
//! the key makes concurrent first-touch creation safe.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, Insert,
    QueryFilter, QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, OnConflict};
use chrono::Utc;
use uuid::Uuid;

use telar_core::ledger::{AccountBalance, AccountKey, LedgerError};
use telar_shared::types::AccountId;

use crate::entities::{accounts, ledger_entries, sea_orm_active_enums};

fn db_err(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

/// Account repository for the ledger account registry.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the account for a key, creating it if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_or_create(&self, key: &AccountKey) -> Result<accounts::Model, LedgerError> {
        get_or_create(&self.db, key).await
    }

    /// Derives the balance of an account by summing its entries.
    ///
    /// Balances are never stored; SUM over `ledger.entries` is the only
    /// source of truth.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn balance(&self, key: &AccountKey) -> Result<AccountBalance, LedgerError> {
        let Some(account) = find_by_key(&self.db, key).await? else {
            // No account yet means no entries: a zero balance, not an error.
            return Ok(AccountBalance::from_entries(
                AccountId::from(Uuid::nil()),
                key.currency,
                std::iter::empty(),
            ));
        };

        let (total, count) = sum_entries(&self.db, account.id).await?;
        Ok(AccountBalance {
            account_id: AccountId::from(account.id),
            currency: key.currency,
            balance_minor: total,
            entry_count: count,
        })
    }
}

/// Finds an account row by its natural key.
pub(crate) async fn find_by_key<C: ConnectionTrait>(
    conn: &C,
    key: &AccountKey,
) -> Result<Option<accounts::Model>, LedgerError> {
    let owner_type: sea_orm_active_enums::OwnerType = match key.owner.owner_id() {
        Some(_) => sea_orm_active_enums::OwnerType::Shop,
        None => sea_orm_active_enums::OwnerType::Platform,
    };
    let account_type: sea_orm_active_enums::AccountType = key.account_type.into();

    let mut query = accounts::Entity::find()
        .filter(accounts::Column::OwnerType.eq(owner_type))
        .filter(accounts::Column::Currency.eq(key.currency.code()))
        .filter(accounts::Column::AccountType.eq(account_type));

    query = match key.owner.owner_id() {
        Some(owner_id) => query.filter(accounts::Column::OwnerId.eq(owner_id)),
        None => query.filter(accounts::Column::OwnerId.is_null()),
    };

    query.one(conn).await.map_err(db_err)
}

/// Builds the row for a key's first touch.
fn new_account(key: &AccountKey) -> accounts::ActiveModel {
    let owner_type = match key.owner.owner_id() {
        Some(_) => sea_orm_active_enums::OwnerType::Shop,
        None => sea_orm_active_enums::OwnerType::Platform,
    };

    accounts::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_type: Set(owner_type),
        owner_id: Set(key.owner.owner_id()),
        currency: Set(key.currency.code().to_owned()),
        account_type: Set(key.account_type.into()),
        created_at: Set(Utc::now().into()),
    }
}

/// Insert that yields to a concurrent first touch instead of raising a
/// unique violation. Raising would abort a caller-owned transaction, and
/// the poster runs this inside one.
fn insert_do_nothing(account: accounts::ActiveModel) -> Insert<accounts::ActiveModel> {
    accounts::Entity::insert(account).on_conflict(
        OnConflict::columns([
            accounts::Column::OwnerType,
            accounts::Column::OwnerId,
            accounts::Column::Currency,
            accounts::Column::AccountType,
        ])
        .do_nothing()
        .to_owned(),
    )
}

/// Finds or lazily creates the account row for a key.
pub(crate) async fn get_or_create<C: ConnectionTrait>(
    conn: &C,
    key: &AccountKey,
) -> Result<accounts::Model, LedgerError> {
    if let Some(existing) = find_by_key(conn, key).await? {
        return Ok(existing);
    }

    match insert_do_nothing(new_account(key)).exec(conn).await {
        // RecordNotInserted is the DO NOTHING path: the race's winner
        // already holds the row.
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(err) => return Err(db_err(err)),
    }

    find_by_key(conn, key)
        .await?
        .ok_or_else(|| LedgerError::Database("account row missing after upsert".to_string()))
}

#[derive(FromQueryResult)]
struct BalanceRow {
    total_minor: i64,
    entry_count: i64,
}

/// Sums entry amounts for an account. Runs inside whatever connection or
/// transaction the caller provides, so payout balance checks see a
/// consistent snapshot.
pub(crate) async fn sum_entries<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> Result<(i64, u64), LedgerError> {
    let row = ledger_entries::Entity::find()
        .select_only()
        .column_as(
            Expr::cust("COALESCE(SUM(amount_minor), 0)::bigint"),
            "total_minor",
        )
        .column_as(ledger_entries::Column::Id.count(), "entry_count")
        .filter(ledger_entries::Column::AccountId.eq(account_id))
        .into_model::<BalanceRow>()
        .one(conn)
        .await
        .map_err(db_err)?;

    match row {
        Some(row) => Ok((row.total_minor, u64::try_from(row.entry_count).unwrap_or(0))),
        None => Ok((0, 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sea_orm::{DbBackend, QueryTrait};
    use telar_core::ledger::{AccountOwner, LedgerAccountType};
    use telar_shared::types::{Currency, ShopId};

    fn platform_key() -> AccountKey {
        AccountKey {
            owner: AccountOwner::Platform,
            currency: Currency::Cop,
            account_type: LedgerAccountType::Revenue,
        }
    }

    #[test]
    fn first_touch_insert_yields_on_conflict() {
        // The insert must never raise a unique violation: inside the
        // poster's transaction that would abort the whole posting.
        let sql = insert_do_nothing(new_account(&platform_key()))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("ON CONFLICT"), "missing conflict clause: {sql}");
        assert!(sql.contains("DO NOTHING"), "missing do-nothing clause: {sql}");
        for column in ["owner_type", "owner_id", "currency", "account_type"] {
            assert!(
                sql.contains(column),
                "conflict target missing {column}: {sql}"
            );
        }
    }

    #[test]
    fn new_account_maps_owner_kinds() {
        let platform = new_account(&platform_key());
        assert_eq!(platform.owner_id.clone().unwrap(), None);

        let shop = ShopId::new();
        let key = AccountKey {
            owner: AccountOwner::Shop(shop),
            currency: Currency::Cop,
            account_type: LedgerAccountType::Available,
        };
        assert_eq!(new_account(&key).owner_id.clone().unwrap(), Some(shop.into_inner()));
    }
}
