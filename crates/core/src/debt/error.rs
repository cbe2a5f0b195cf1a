//! Debt allocation error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons an allocation session cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// Open transactions have not been loaded yet.
    #[error("Open transactions are still loading")]
    NotLoaded,

    /// More was allocated than the overpayment pool holds.
    #[error("Allocated {allocated} exceeds the available {available}")]
    OverAllocated {
        /// Sum of allocations.
        allocated: Decimal,
        /// Pool available for allocation.
        available: Decimal,
    },

    /// Money is left over while debt is still unpaid.
    #[error("Partial allocation: {remaining} left to allocate while {debt_left} of debt remains")]
    PartialAllocation {
        /// Pool not yet allocated.
        remaining: Decimal,
        /// Debt not yet covered.
        debt_left: Decimal,
    },

    /// Row index does not exist in the session.
    #[error("Debt row {0} is out of range")]
    RowOutOfRange(usize),
}

impl AllocationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotLoaded => "DEBTS_NOT_LOADED",
            Self::OverAllocated { .. } => "OVER_ALLOCATED",
            Self::PartialAllocation { .. } => "PARTIAL_ALLOCATION",
            Self::RowOutOfRange(_) => "DEBT_ROW_OUT_OF_RANGE",
        }
    }
}
