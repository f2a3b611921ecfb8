//! Ledger account keys.
//!
//! An account is a bucket keyed by (owner, currency, account type). Accounts
//! are created lazily on first reference and never deleted; referencing
//! entries RESTRICT deletion at the schema level.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use telar_shared::types::{Currency, ShopId};

use super::error::LedgerError;

/// The six ledger account types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerAccountType {
    /// Funds captured from buyers, not yet distributed.
    Clearing,
    /// Platform fee revenue.
    Revenue,
    /// Collected taxes.
    Taxes,
    /// Seller funds awaiting fulfillment/settlement.
    Pending,
    /// Seller funds eligible for payout.
    Available,
    /// Seller funds locked into an in-flight payout.
    PayoutInTransit,
}

impl LedgerAccountType {
    /// The enum value as stored in `ledger.account_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clearing => "clearing",
            Self::Revenue => "revenue",
            Self::Taxes => "taxes",
            Self::Pending => "pending",
            Self::Available => "available",
            Self::PayoutInTransit => "payout_in_transit",
        }
    }
}

/// Who owns a ledger account.
///
/// Platform accounts have no owner id; shop accounts carry the shop's UUID.
/// The schema enforces this with a CHECK; the enum makes the wrong pairing
/// unrepresentable in domain code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "owner_type", content = "owner_id", rename_all = "lowercase")]
pub enum AccountOwner {
    /// The platform itself.
    Platform,
    /// An artisan shop.
    Shop(ShopId),
}

impl AccountOwner {
    /// The discriminant as stored in `ledger.owner_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Shop(_) => "shop",
        }
    }

    /// The `owner_id` column value.
    #[must_use]
    pub fn owner_id(self) -> Option<Uuid> {
        match self {
            Self::Platform => None,
            Self::Shop(shop) => Some(shop.into_inner()),
        }
    }

    /// Reconstructs an owner from raw column values.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidOwnerKind` when the pairing rule is
    /// violated (platform with an id, shop without one).
    pub fn from_parts(owner_type: &str, owner_id: Option<Uuid>) -> Result<Self, LedgerError> {
        match (owner_type, owner_id) {
            ("platform", None) => Ok(Self::Platform),
            ("platform", Some(id)) => Err(LedgerError::InvalidOwnerKind(format!(
                "platform account must not have owner_id (got {id})"
            ))),
            ("shop", Some(id)) => Ok(Self::Shop(ShopId::from_uuid(id))),
            ("shop", None) => Err(LedgerError::InvalidOwnerKind(
                "shop account requires owner_id".to_string(),
            )),
            (other, _) => Err(LedgerError::InvalidOwnerKind(format!(
                "unknown owner type: {other}"
            ))),
        }
    }
}

/// The natural key of a ledger account.
///
/// Unique in `ledger.accounts` over (owner_type, owner_id, currency,
/// account_type); `get_or_create` upserts against this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountKey {
    /// The account owner.
    pub owner: AccountOwner,
    /// ISO 4217 currency.
    pub currency: Currency,
    /// The account type bucket.
    pub account_type: LedgerAccountType,
}

impl AccountKey {
    /// Creates a platform account key.
    #[must_use]
    pub const fn platform(currency: Currency, account_type: LedgerAccountType) -> Self {
        Self {
            owner: AccountOwner::Platform,
            currency,
            account_type,
        }
    }

    /// Creates a shop account key.
    #[must_use]
    pub const fn shop(shop: ShopId, currency: Currency, account_type: LedgerAccountType) -> Self {
        Self {
            owner: AccountOwner::Shop(shop),
            currency,
            account_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_parts() {
        assert_eq!(AccountOwner::Platform.as_str(), "platform");
        assert_eq!(AccountOwner::Platform.owner_id(), None);

        let shop = ShopId::new();
        assert_eq!(AccountOwner::Shop(shop).as_str(), "shop");
        assert_eq!(AccountOwner::Shop(shop).owner_id(), Some(shop.into_inner()));
    }

    #[test]
    fn test_owner_from_parts() {
        assert_eq!(
            AccountOwner::from_parts("platform", None).unwrap(),
            AccountOwner::Platform
        );

        let id = Uuid::new_v4();
        assert_eq!(
            AccountOwner::from_parts("shop", Some(id)).unwrap(),
            AccountOwner::Shop(ShopId::from_uuid(id))
        );
    }

    #[test]
    fn test_owner_from_parts_rejects_bad_pairs() {
        assert!(matches!(
            AccountOwner::from_parts("platform", Some(Uuid::new_v4())),
            Err(LedgerError::InvalidOwnerKind(_))
        ));
        assert!(matches!(
            AccountOwner::from_parts("shop", None),
            Err(LedgerError::InvalidOwnerKind(_))
        ));
        assert!(matches!(
            AccountOwner::from_parts("bank", None),
            Err(LedgerError::InvalidOwnerKind(_))
        ));
    }

    #[test]
    fn test_account_type_strings() {
        assert_eq!(LedgerAccountType::Clearing.as_str(), "clearing");
        assert_eq!(
            LedgerAccountType::PayoutInTransit.as_str(),
            "payout_in_transit"
        );
    }

    #[test]
    fn test_key_constructors() {
        let shop = ShopId::new();
        let key = AccountKey::shop(shop, Currency::Cop, LedgerAccountType::Available);
        assert_eq!(key.owner, AccountOwner::Shop(shop));
        assert_eq!(key.currency, Currency::Cop);

        let key = AccountKey::platform(Currency::Cop, LedgerAccountType::Revenue);
        assert_eq!(key.owner, AccountOwner::Platform);
    }
}
