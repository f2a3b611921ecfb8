//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `CartId` where a
//! `CheckoutId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID (UUID v4, matching `uuid_generate_v4()`).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a buyer user.");
typed_id!(ShopId, "Unique identifier for an artisan shop.");
typed_id!(ProductId, "Unique identifier for a product.");
typed_id!(AccountId, "Unique identifier for a ledger account.");
typed_id!(TransactionId, "Unique identifier for a ledger transaction.");
typed_id!(EntryId, "Unique identifier for a ledger entry.");
typed_id!(CartId, "Unique identifier for a cart.");
typed_id!(CartItemId, "Unique identifier for a cart item.");
typed_id!(CheckoutId, "Unique identifier for a checkout.");
typed_id!(OrderId, "Unique identifier for an order.");
typed_id!(PriceId, "Unique identifier for a product price row.");
typed_id!(ChargeTypeId, "Unique identifier for a charge type.");
typed_id!(ChargeRuleId, "Unique identifier for a charge rule.");
typed_id!(ProviderId, "Unique identifier for a payment provider.");
typed_id!(PaymentIntentId, "Unique identifier for a payment intent.");
typed_id!(PaymentAttemptId, "Unique identifier for a payment attempt.");
typed_id!(PayoutId, "Unique identifier for a payout.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_roundtrip() {
        let uuid = Uuid::new_v4();
        let id = CartId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(id.to_string(), uuid.to_string());
        assert_eq!(CartId::from_str(&uuid.to_string()).unwrap(), id);
    }

    #[test]
    fn test_typed_id_new_is_random() {
        assert_ne!(CheckoutId::new(), CheckoutId::new());
    }

    #[test]
    fn test_typed_id_serde_transparent() {
        let id = ShopId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
        let back: ShopId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
