//! `SeaORM` active enums mapping the Postgres enum types in the
//! `payments` and `ledger` schemas.
//!
//! Conversions to and from the `telar-core` domain enums live here so
//! repositories never match on raw strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use telar_core::cart::CartStatus as CoreCartStatus;
use telar_core::charges::{ChargeDirection as CoreDirection, ChargeScope as CoreScope};
use telar_core::checkout::{CheckoutStatus as CoreCheckoutStatus, OrderStatus as CoreOrderStatus};
use telar_core::ledger::LedgerAccountType as CoreAccountType;
use telar_core::payment::{
    PaymentAttemptStatus as CoreAttemptStatus, PaymentIntentStatus as CoreIntentStatus,
};
use telar_core::payout::PayoutStatus as CorePayoutStatus;

/// `payments.sale_context`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sale_context")]
pub enum SaleContext {
    #[sea_orm(string_value = "marketplace")]
    Marketplace,
    #[sea_orm(string_value = "tenant")]
    Tenant,
}

/// `payments.cart_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cart_status")]
pub enum CartStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "locked")]
    Locked,
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "abandoned")]
    Abandoned,
}

/// `payments.checkout_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "checkout_status")]
pub enum CheckoutStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "awaiting_payment")]
    AwaitingPayment,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "canceled")]
    Canceled,
    #[sea_orm(string_value = "refunded")]
    Refunded,
    #[sea_orm(string_value = "partial_refunded")]
    PartialRefunded,
}

/// `payments.order_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending_fulfillment")]
    PendingFulfillment,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "canceled")]
    Canceled,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

/// `payments.charge_direction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "charge_direction")]
pub enum ChargeDirection {
    #[sea_orm(string_value = "add")]
    Add,
    #[sea_orm(string_value = "subtract")]
    Subtract,
}

/// `payments.charge_scope`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "charge_scope")]
pub enum ChargeScope {
    #[sea_orm(string_value = "checkout")]
    Checkout,
    #[sea_orm(string_value = "order")]
    Order,
}

/// `payments.payment_intent_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_intent_status")]
pub enum PaymentIntentStatus {
    #[sea_orm(string_value = "requires_payment_method")]
    RequiresPaymentMethod,
    #[sea_orm(string_value = "requires_action")]
    RequiresAction,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "succeeded")]
    Succeeded,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

/// `payments.payment_attempt_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_attempt_status")]
pub enum PaymentAttemptStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "redirected")]
    Redirected,
    #[sea_orm(string_value = "authorized")]
    Authorized,
    #[sea_orm(string_value = "captured")]
    Captured,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

/// `payments.payout_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payout_status")]
pub enum PayoutStatus {
    #[sea_orm(string_value = "requested")]
    Requested,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

/// `ledger.owner_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "owner_type")]
pub enum OwnerType {
    #[sea_orm(string_value = "platform")]
    Platform,
    #[sea_orm(string_value = "shop")]
    Shop,
}

/// `ledger.account_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "clearing")]
    Clearing,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "taxes")]
    Taxes,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "payout_in_transit")]
    PayoutInTransit,
}

impl From<CoreCartStatus> for CartStatus {
    fn from(status: CoreCartStatus) -> Self {
        match status {
            CoreCartStatus::Open => Self::Open,
            CoreCartStatus::Locked => Self::Locked,
            CoreCartStatus::Converted => Self::Converted,
            CoreCartStatus::Abandoned => Self::Abandoned,
        }
    }
}

impl From<CartStatus> for CoreCartStatus {
    fn from(status: CartStatus) -> Self {
        match status {
            CartStatus::Open => Self::Open,
            CartStatus::Locked => Self::Locked,
            CartStatus::Converted => Self::Converted,
            CartStatus::Abandoned => Self::Abandoned,
        }
    }
}

impl From<CoreCheckoutStatus> for CheckoutStatus {
    fn from(status: CoreCheckoutStatus) -> Self {
        match status {
            CoreCheckoutStatus::Created => Self::Created,
            CoreCheckoutStatus::AwaitingPayment => Self::AwaitingPayment,
            CoreCheckoutStatus::Paid => Self::Paid,
            CoreCheckoutStatus::Failed => Self::Failed,
            CoreCheckoutStatus::Canceled => Self::Canceled,
            CoreCheckoutStatus::Refunded => Self::Refunded,
            CoreCheckoutStatus::PartialRefunded => Self::PartialRefunded,
        }
    }
}

impl From<CheckoutStatus> for CoreCheckoutStatus {
    fn from(status: CheckoutStatus) -> Self {
        match status {
            CheckoutStatus::Created => Self::Created,
            CheckoutStatus::AwaitingPayment => Self::AwaitingPayment,
            CheckoutStatus::Paid => Self::Paid,
            CheckoutStatus::Failed => Self::Failed,
            CheckoutStatus::Canceled => Self::Canceled,
            CheckoutStatus::Refunded => Self::Refunded,
            CheckoutStatus::PartialRefunded => Self::PartialRefunded,
        }
    }
}

impl From<CoreOrderStatus> for OrderStatus {
    fn from(status: CoreOrderStatus) -> Self {
        match status {
            CoreOrderStatus::PendingFulfillment => Self::PendingFulfillment,
            CoreOrderStatus::Delivered => Self::Delivered,
            CoreOrderStatus::Canceled => Self::Canceled,
            CoreOrderStatus::Refunded => Self::Refunded,
        }
    }
}

impl From<OrderStatus> for CoreOrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::PendingFulfillment => Self::PendingFulfillment,
            OrderStatus::Delivered => Self::Delivered,
            OrderStatus::Canceled => Self::Canceled,
            OrderStatus::Refunded => Self::Refunded,
        }
    }
}

impl From<CoreDirection> for ChargeDirection {
    fn from(direction: CoreDirection) -> Self {
        match direction {
            CoreDirection::Add => Self::Add,
            CoreDirection::Subtract => Self::Subtract,
        }
    }
}

impl From<ChargeDirection> for CoreDirection {
    fn from(direction: ChargeDirection) -> Self {
        match direction {
            ChargeDirection::Add => Self::Add,
            ChargeDirection::Subtract => Self::Subtract,
        }
    }
}

impl From<CoreScope> for ChargeScope {
    fn from(scope: CoreScope) -> Self {
        match scope {
            CoreScope::Checkout => Self::Checkout,
            CoreScope::Order => Self::Order,
        }
    }
}

impl From<ChargeScope> for CoreScope {
    fn from(scope: ChargeScope) -> Self {
        match scope {
            ChargeScope::Checkout => Self::Checkout,
            ChargeScope::Order => Self::Order,
        }
    }
}

impl From<CoreIntentStatus> for PaymentIntentStatus {
    fn from(status: CoreIntentStatus) -> Self {
        match status {
            CoreIntentStatus::RequiresPaymentMethod => Self::RequiresPaymentMethod,
            CoreIntentStatus::RequiresAction => Self::RequiresAction,
            CoreIntentStatus::Processing => Self::Processing,
            CoreIntentStatus::Succeeded => Self::Succeeded,
            CoreIntentStatus::Failed => Self::Failed,
            CoreIntentStatus::Canceled => Self::Canceled,
        }
    }
}

impl From<PaymentIntentStatus> for CoreIntentStatus {
    fn from(status: PaymentIntentStatus) -> Self {
        match status {
            PaymentIntentStatus::RequiresPaymentMethod => Self::RequiresPaymentMethod,
            PaymentIntentStatus::RequiresAction => Self::RequiresAction,
            PaymentIntentStatus::Processing => Self::Processing,
            PaymentIntentStatus::Succeeded => Self::Succeeded,
            PaymentIntentStatus::Failed => Self::Failed,
            PaymentIntentStatus::Canceled => Self::Canceled,
        }
    }
}

impl From<CoreAttemptStatus> for PaymentAttemptStatus {
    fn from(status: CoreAttemptStatus) -> Self {
        match status {
            CoreAttemptStatus::Created => Self::Created,
            CoreAttemptStatus::Redirected => Self::Redirected,
            CoreAttemptStatus::Authorized => Self::Authorized,
            CoreAttemptStatus::Captured => Self::Captured,
            CoreAttemptStatus::Failed => Self::Failed,
            CoreAttemptStatus::Canceled => Self::Canceled,
        }
    }
}

impl From<PaymentAttemptStatus> for CoreAttemptStatus {
    fn from(status: PaymentAttemptStatus) -> Self {
        match status {
            PaymentAttemptStatus::Created => Self::Created,
            PaymentAttemptStatus::Redirected => Self::Redirected,
            PaymentAttemptStatus::Authorized => Self::Authorized,
            PaymentAttemptStatus::Captured => Self::Captured,
            PaymentAttemptStatus::Failed => Self::Failed,
            PaymentAttemptStatus::Canceled => Self::Canceled,
        }
    }
}

impl From<CorePayoutStatus> for PayoutStatus {
    fn from(status: CorePayoutStatus) -> Self {
        match status {
            CorePayoutStatus::Requested => Self::Requested,
            CorePayoutStatus::Processing => Self::Processing,
            CorePayoutStatus::Paid => Self::Paid,
            CorePayoutStatus::Failed => Self::Failed,
            CorePayoutStatus::Canceled => Self::Canceled,
        }
    }
}

impl From<PayoutStatus> for CorePayoutStatus {
    fn from(status: PayoutStatus) -> Self {
        match status {
            PayoutStatus::Requested => Self::Requested,
            PayoutStatus::Processing => Self::Processing,
            PayoutStatus::Paid => Self::Paid,
            PayoutStatus::Failed => Self::Failed,
            PayoutStatus::Canceled => Self::Canceled,
        }
    }
}

impl From<CoreAccountType> for AccountType {
    fn from(account_type: CoreAccountType) -> Self {
        match account_type {
            CoreAccountType::Clearing => Self::Clearing,
            CoreAccountType::Revenue => Self::Revenue,
            CoreAccountType::Taxes => Self::Taxes,
            CoreAccountType::Pending => Self::Pending,
            CoreAccountType::Available => Self::Available,
            CoreAccountType::PayoutInTransit => Self::PayoutInTransit,
        }
    }
}

impl From<AccountType> for CoreAccountType {
    fn from(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Clearing => Self::Clearing,
            AccountType::Revenue => Self::Revenue,
            AccountType::Taxes => Self::Taxes,
            AccountType::Pending => Self::Pending,
            AccountType::Available => Self::Available,
            AccountType::PayoutInTransit => Self::PayoutInTransit,
        }
    }
}
