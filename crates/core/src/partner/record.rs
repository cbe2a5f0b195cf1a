//! Snapshot of the transaction a payment session is opened for.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment status reported for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing has been paid yet.
    Unpaid,
    /// Some, but not all, of the due amount has been paid.
    Partial,
    /// Fully paid.
    Paid,
}

/// Totals of the transaction being paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Total amount due for the transaction.
    pub total_due: Decimal,
    /// Amount already paid before this session.
    pub total_paid: Decimal,
    /// Reported payment status.
    pub status: PaymentStatus,
}

impl TransactionRecord {
    /// Amount still to be paid, never negative.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        self.total_due
            .saturating_sub(self.total_paid)
            .max(Decimal::ZERO)
    }
}
