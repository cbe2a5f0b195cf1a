//! Session save-gate errors.

use paydesk_shared::AppError;
use paydesk_shared::types::PaymentRowId;
use thiserror::Error;

use crate::debt::AllocationError;

/// Reasons a payment session cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A payment row fails row-level validation.
    #[error("Payment row {0} is invalid")]
    InvalidPaymentRow(PaymentRowId),

    /// Existing credit must be drawn before a shortfall is registered.
    #[error("Available account credit must be used before leaving an unpaid balance")]
    AccountCreditRequired,

    /// The overpayment must be applied to existing debt first.
    #[error("Overpayment must be allocated to existing debt")]
    DebtAllocationRequired,

    /// Debt allocation could not be applied.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

impl SessionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPaymentRow(_) => "INVALID_PAYMENT_ROW",
            Self::AccountCreditRequired => "ACCOUNT_CREDIT_REQUIRED",
            Self::DebtAllocationRequired => "DEBT_ALLOCATION_REQUIRED",
            Self::Allocation(err) => err.error_code(),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        Self::BusinessRule(err.to_string())
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        Self::BusinessRule(err.to_string())
    }
}
