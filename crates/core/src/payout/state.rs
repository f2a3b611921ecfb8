//! Payout request validation and status machine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use telar_shared::types::{Currency, MinorAmount, ShopId};

use crate::payout::error::PayoutError;

/// Lifecycle of a payout.
///
/// Requesting a payout posts available → payout_in_transit and moves to
/// processing in the same database transaction. Confirmation settles the
/// in-transit amount against platform clearing; failure posts the exact
/// reverse so the shop's available balance is restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Accepted, funds not yet reserved.
    Requested,
    /// Funds reserved in payout_in_transit; provider transfer in flight.
    Processing,
    /// Transfer confirmed; terminal.
    Paid,
    /// Transfer failed; funds returned to available. Terminal.
    Failed,
    /// Canceled before funds were reserved; terminal.
    Canceled,
}

impl PayoutStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    /// Whether the edge `self -> to` is part of the machine.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Requested, Self::Processing | Self::Canceled)
                | (Self::Processing, Self::Paid | Self::Failed)
        )
    }

    /// Applies a transition, rejecting edges the machine does not declare.
    pub fn transition(self, to: Self) -> Result<Self, PayoutError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(PayoutError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }

    /// Terminal payouts never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Failed | Self::Canceled)
    }
}

/// A validated payout request, ready for the atomic balance-check-and-post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutRequest {
    /// Shop withdrawing funds.
    pub shop_id: ShopId,
    /// Currency of the withdrawal.
    pub currency: Currency,
    /// Amount in minor units, strictly positive.
    pub amount_minor: MinorAmount,
    /// Provider-specific destination (bank account, wallet address).
    pub destination: Value,
    /// Caller-supplied key deduplicating retries of the same request.
    pub idempotency_key: String,
}

impl PayoutRequest {
    /// Validates and builds a request.
    pub fn new(
        shop_id: ShopId,
        currency: Currency,
        amount_minor: MinorAmount,
        destination: Value,
        idempotency_key: String,
    ) -> Result<Self, PayoutError> {
        if amount_minor <= 0 {
            return Err(PayoutError::InvalidAmount(amount_minor));
        }
        if idempotency_key.trim().is_empty() {
            return Err(PayoutError::EmptyIdempotencyKey);
        }
        Ok(Self {
            shop_id,
            currency,
            amount_minor,
            destination,
            idempotency_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(PayoutStatus::Requested, PayoutStatus::Processing, true)]
    #[case(PayoutStatus::Requested, PayoutStatus::Canceled, true)]
    #[case(PayoutStatus::Requested, PayoutStatus::Paid, false)]
    #[case(PayoutStatus::Processing, PayoutStatus::Paid, true)]
    #[case(PayoutStatus::Processing, PayoutStatus::Failed, true)]
    #[case(PayoutStatus::Processing, PayoutStatus::Canceled, false)]
    #[case(PayoutStatus::Paid, PayoutStatus::Failed, false)]
    #[case(PayoutStatus::Failed, PayoutStatus::Processing, false)]
    #[case(PayoutStatus::Canceled, PayoutStatus::Requested, false)]
    fn payout_edges(#[case] from: PayoutStatus, #[case] to: PayoutStatus, #[case] allowed: bool) {
        assert_eq!(from.transition(to).is_ok(), allowed);
    }

    #[test]
    fn zero_and_negative_amounts_rejected() {
        for amount in [0, -1, -100_000] {
            let err = PayoutRequest::new(
                ShopId::new(),
                Currency::Cop,
                amount,
                json!({"bank": "x"}),
                "key-1".to_owned(),
            )
            .unwrap_err();
            assert!(matches!(err, PayoutError::InvalidAmount(_)));
            assert_eq!(err.http_status_code(), 400);
        }
    }

    #[test]
    fn blank_idempotency_key_rejected() {
        let err = PayoutRequest::new(
            ShopId::new(),
            Currency::Cop,
            100_000,
            json!({"bank": "x"}),
            "   ".to_owned(),
        )
        .unwrap_err();
        assert!(matches!(err, PayoutError::EmptyIdempotencyKey));
    }

    #[test]
    fn valid_request_passes() {
        let request = PayoutRequest::new(
            ShopId::new(),
            Currency::Cop,
            100_000,
            json!({"account": "12345"}),
            "payout-abc".to_owned(),
        )
        .unwrap();
        assert_eq!(request.amount_minor, 100_000);
    }
}
