//! Checkout and order status machines.

use serde::{Deserialize, Serialize};

use crate::checkout::error::CheckoutError;

/// Lifecycle of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    /// Frozen from a cart, no payment started yet.
    Created,
    /// A payment intent exists and is in flight.
    AwaitingPayment,
    /// Payment captured; the ledger transaction has been posted.
    Paid,
    /// Payment failed; the cart has been unlocked.
    Failed,
    /// Canceled before payment succeeded.
    Canceled,
    /// Fully refunded after payment.
    Refunded,
    /// Partially refunded after payment.
    PartialRefunded,
}

impl CheckoutStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Refunded => "refunded",
            Self::PartialRefunded => "partial_refunded",
        }
    }

    /// Whether the edge `self -> to` is part of the machine.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Created, Self::AwaitingPayment | Self::Canceled)
                | (
                    Self::AwaitingPayment,
                    Self::Paid | Self::Failed | Self::Canceled
                )
                | (Self::Paid, Self::Refunded | Self::PartialRefunded)
                | (Self::PartialRefunded, Self::Refunded)
        )
    }

    /// Applies a transition, rejecting edges the machine does not declare.
    pub fn transition(self, to: Self) -> Result<Self, CheckoutError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(CheckoutError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }

    /// Terminal statuses (besides paid, which can still be refunded).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Canceled | Self::Refunded)
    }
}

/// Lifecycle of a per-seller order inside a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Paid for, waiting on the seller.
    PendingFulfillment,
    /// Delivered to the buyer; pending funds may be released.
    Delivered,
    /// Canceled before delivery.
    Canceled,
    /// Refunded to the buyer.
    Refunded,
}

impl OrderStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingFulfillment => "pending_fulfillment",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
            Self::Refunded => "refunded",
        }
    }

    /// Whether the edge `self -> to` is part of the machine.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::PendingFulfillment, Self::Delivered | Self::Canceled)
                | (Self::Delivered, Self::Refunded)
        )
    }

    /// Applies a transition, rejecting edges the machine does not declare.
    pub fn transition(self, to: Self) -> Result<Self, CheckoutError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(CheckoutError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CheckoutStatus::Created, CheckoutStatus::AwaitingPayment, true)]
    #[case(CheckoutStatus::Created, CheckoutStatus::Canceled, true)]
    #[case(CheckoutStatus::Created, CheckoutStatus::Paid, false)]
    #[case(CheckoutStatus::AwaitingPayment, CheckoutStatus::Paid, true)]
    #[case(CheckoutStatus::AwaitingPayment, CheckoutStatus::Failed, true)]
    #[case(CheckoutStatus::AwaitingPayment, CheckoutStatus::Canceled, true)]
    #[case(CheckoutStatus::Paid, CheckoutStatus::Refunded, true)]
    #[case(CheckoutStatus::Paid, CheckoutStatus::PartialRefunded, true)]
    #[case(CheckoutStatus::PartialRefunded, CheckoutStatus::Refunded, true)]
    #[case(CheckoutStatus::Paid, CheckoutStatus::AwaitingPayment, false)]
    #[case(CheckoutStatus::Failed, CheckoutStatus::Paid, false)]
    #[case(CheckoutStatus::Refunded, CheckoutStatus::Paid, false)]
    #[case(CheckoutStatus::Canceled, CheckoutStatus::AwaitingPayment, false)]
    fn checkout_edges(
        #[case] from: CheckoutStatus,
        #[case] to: CheckoutStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.transition(to).is_ok(), allowed);
    }

    #[rstest]
    #[case(OrderStatus::PendingFulfillment, OrderStatus::Delivered, true)]
    #[case(OrderStatus::PendingFulfillment, OrderStatus::Canceled, true)]
    #[case(OrderStatus::PendingFulfillment, OrderStatus::Refunded, false)]
    #[case(OrderStatus::Delivered, OrderStatus::Refunded, true)]
    #[case(OrderStatus::Delivered, OrderStatus::Canceled, false)]
    #[case(OrderStatus::Canceled, OrderStatus::Delivered, false)]
    #[case(OrderStatus::Refunded, OrderStatus::PendingFulfillment, false)]
    fn order_edges(#[case] from: OrderStatus, #[case] to: OrderStatus, #[case] allowed: bool) {
        assert_eq!(from.transition(to).is_ok(), allowed);
    }

    #[test]
    fn invalid_edge_is_a_business_rule_error() {
        let err = CheckoutStatus::Failed
            .transition(CheckoutStatus::Paid)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CHECKOUT_TRANSITION");
        assert_eq!(err.http_status_code(), 422);
        assert!(!err.is_retryable());
    }
}
