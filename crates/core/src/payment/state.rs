//! Payment intent and attempt status machines.

use serde::{Deserialize, Serialize};

use crate::payment::error::PaymentError;

/// Lifecycle of a payment intent, one per checkout payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    /// No attempt has supplied a payment method yet.
    RequiresPaymentMethod,
    /// The buyer must complete an external step (3DS, redirect).
    RequiresAction,
    /// The provider is processing the charge.
    Processing,
    /// Captured; terminal. Triggers the ledger capture posting.
    Succeeded,
    /// Definitively failed; terminal.
    Failed,
    /// Canceled before success; terminal.
    Canceled,
}

impl PaymentIntentStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    /// Whether the edge `self -> to` is part of the machine.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (
                Self::RequiresPaymentMethod,
                Self::RequiresAction | Self::Processing | Self::Failed | Self::Canceled
            ) | (
                Self::RequiresAction,
                Self::Processing | Self::Failed | Self::Canceled
            ) | (Self::Processing, Self::Succeeded | Self::Failed)
        )
    }

    /// Applies a transition, rejecting edges the machine does not declare.
    pub fn transition(self, to: Self) -> Result<Self, PaymentError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(PaymentError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }

    /// Terminal intents accept no further attempts or transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// Lifecycle of one provider attempt under an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentAttemptStatus {
    /// Recorded, not yet sent to the buyer.
    Created,
    /// The buyer was redirected to the provider.
    Redirected,
    /// The provider authorized the charge.
    Authorized,
    /// Funds captured; terminal.
    Captured,
    /// Failed; terminal.
    Failed,
    /// Canceled; terminal.
    Canceled,
}

impl PaymentAttemptStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Redirected => "redirected",
            Self::Authorized => "authorized",
            Self::Captured => "captured",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    /// Terminal attempts never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Captured | Self::Failed | Self::Canceled)
    }

    /// Whether the edge `self -> to` is part of the machine. The happy
    /// path is strictly created → redirected → authorized → captured;
    /// failure and cancel are reachable from any non-terminal status.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        if matches!(to, Self::Failed | Self::Canceled) {
            return !self.is_terminal();
        }
        matches!(
            (self, to),
            (Self::Created, Self::Redirected)
                | (Self::Redirected, Self::Authorized)
                | (Self::Authorized, Self::Captured)
        )
    }

    /// Applies a transition, rejecting edges the machine does not declare.
    pub fn transition(self, to: Self) -> Result<Self, PaymentError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(PaymentError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }
}

/// Attempts are numbered from 1 per intent, in creation order.
#[must_use]
pub const fn next_attempt_number(current_max: Option<i32>) -> i32 {
    match current_max {
        Some(n) => n + 1,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PaymentIntentStatus::RequiresPaymentMethod, PaymentIntentStatus::RequiresAction, true)]
    #[case(PaymentIntentStatus::RequiresPaymentMethod, PaymentIntentStatus::Processing, true)]
    #[case(PaymentIntentStatus::RequiresPaymentMethod, PaymentIntentStatus::Succeeded, false)]
    #[case(PaymentIntentStatus::RequiresAction, PaymentIntentStatus::Processing, true)]
    #[case(PaymentIntentStatus::RequiresAction, PaymentIntentStatus::Succeeded, false)]
    #[case(PaymentIntentStatus::Processing, PaymentIntentStatus::Succeeded, true)]
    #[case(PaymentIntentStatus::Processing, PaymentIntentStatus::Failed, true)]
    #[case(PaymentIntentStatus::Processing, PaymentIntentStatus::Canceled, false)]
    #[case(PaymentIntentStatus::Succeeded, PaymentIntentStatus::Failed, false)]
    #[case(PaymentIntentStatus::Failed, PaymentIntentStatus::Processing, false)]
    #[case(PaymentIntentStatus::Canceled, PaymentIntentStatus::Processing, false)]
    fn intent_edges(
        #[case] from: PaymentIntentStatus,
        #[case] to: PaymentIntentStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.transition(to).is_ok(), allowed);
    }

    #[rstest]
    #[case(PaymentAttemptStatus::Created, PaymentAttemptStatus::Redirected, true)]
    #[case(PaymentAttemptStatus::Created, PaymentAttemptStatus::Authorized, false)]
    #[case(PaymentAttemptStatus::Redirected, PaymentAttemptStatus::Authorized, true)]
    #[case(PaymentAttemptStatus::Authorized, PaymentAttemptStatus::Captured, true)]
    #[case(PaymentAttemptStatus::Created, PaymentAttemptStatus::Failed, true)]
    #[case(PaymentAttemptStatus::Redirected, PaymentAttemptStatus::Canceled, true)]
    #[case(PaymentAttemptStatus::Authorized, PaymentAttemptStatus::Failed, true)]
    #[case(PaymentAttemptStatus::Captured, PaymentAttemptStatus::Failed, false)]
    #[case(PaymentAttemptStatus::Failed, PaymentAttemptStatus::Created, false)]
    #[case(PaymentAttemptStatus::Canceled, PaymentAttemptStatus::Redirected, false)]
    fn attempt_edges(
        #[case] from: PaymentAttemptStatus,
        #[case] to: PaymentAttemptStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.transition(to).is_ok(), allowed);
    }

    #[test]
    fn attempts_number_from_one() {
        assert_eq!(next_attempt_number(None), 1);
        assert_eq!(next_attempt_number(Some(1)), 2);
        assert_eq!(next_attempt_number(Some(7)), 8);
    }

    #[test]
    fn terminal_intent_blocks_everything() {
        for terminal in [
            PaymentIntentStatus::Succeeded,
            PaymentIntentStatus::Failed,
            PaymentIntentStatus::Canceled,
        ] {
            assert!(terminal.is_terminal());
            for to in [
                PaymentIntentStatus::RequiresPaymentMethod,
                PaymentIntentStatus::Processing,
                PaymentIntentStatus::Succeeded,
            ] {
                assert!(!terminal.can_transition_to(to));
            }
        }
    }
}
