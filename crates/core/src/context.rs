//! Sale context: marketplace-wide catalog vs a single shop's storefront.
//!
//! Prices and charge rules are scoped by context. The schema stores the pair
//! (context, context_shop_id) with a CHECK that marketplace rows carry NULL
//! and tenant rows carry a shop id; modeling the pair as one enum makes the
//! invalid combinations unrepresentable.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use telar_shared::types::ShopId;

/// Where a sale happens: the shared marketplace or a shop's own storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "context", content = "context_shop_id", rename_all = "lowercase")]
pub enum SaleContext {
    /// Platform-wide catalog.
    Marketplace,
    /// A single shop's private storefront.
    Tenant(ShopId),
}

/// Raised when a raw (context, context_shop_id) pair violates the pairing rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// Marketplace rows must not carry a shop id.
    #[error("Marketplace context must not have a context_shop_id")]
    UnexpectedShopId,

    /// Tenant rows must carry a shop id.
    #[error("Tenant context requires a context_shop_id")]
    MissingShopId,

    /// Unknown context discriminant.
    #[error("Unknown sale context: {0}")]
    UnknownContext(String),
}

impl SaleContext {
    /// The enum discriminant as stored in `payments.sale_context`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Marketplace => "marketplace",
            Self::Tenant(_) => "tenant",
        }
    }

    /// The shop id column value for this context.
    #[must_use]
    pub fn context_shop_id(self) -> Option<Uuid> {
        match self {
            Self::Marketplace => None,
            Self::Tenant(shop) => Some(shop.into_inner()),
        }
    }

    /// Reconstructs a context from raw column values.
    ///
    /// # Errors
    ///
    /// Returns `ContextError` if the pairing rule is violated.
    pub fn from_parts(context: &str, context_shop_id: Option<Uuid>) -> Result<Self, ContextError> {
        match (context, context_shop_id) {
            ("marketplace", None) => Ok(Self::Marketplace),
            ("marketplace", Some(_)) => Err(ContextError::UnexpectedShopId),
            ("tenant", Some(shop)) => Ok(Self::Tenant(ShopId::from_uuid(shop))),
            ("tenant", None) => Err(ContextError::MissingShopId),
            (other, _) => Err(ContextError::UnknownContext(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketplace_parts() {
        let ctx = SaleContext::Marketplace;
        assert_eq!(ctx.as_str(), "marketplace");
        assert_eq!(ctx.context_shop_id(), None);
    }

    #[test]
    fn test_tenant_parts() {
        let shop = ShopId::new();
        let ctx = SaleContext::Tenant(shop);
        assert_eq!(ctx.as_str(), "tenant");
        assert_eq!(ctx.context_shop_id(), Some(shop.into_inner()));
    }

    #[test]
    fn test_from_parts_roundtrip() {
        let shop = Uuid::new_v4();
        assert_eq!(
            SaleContext::from_parts("marketplace", None).unwrap(),
            SaleContext::Marketplace
        );
        assert_eq!(
            SaleContext::from_parts("tenant", Some(shop)).unwrap(),
            SaleContext::Tenant(ShopId::from_uuid(shop))
        );
    }

    #[test]
    fn test_from_parts_rejects_bad_pairs() {
        assert_eq!(
            SaleContext::from_parts("marketplace", Some(Uuid::new_v4())),
            Err(ContextError::UnexpectedShopId)
        );
        assert_eq!(
            SaleContext::from_parts("tenant", None),
            Err(ContextError::MissingShopId)
        );
        assert!(matches!(
            SaleContext::from_parts("wholesale", None),
            Err(ContextError::UnknownContext(_))
        ));
    }
}
