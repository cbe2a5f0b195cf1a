//! Debt allocation domain types.

use chrono::NaiveDate;
use paydesk_shared::types::TransactionId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Part of an overpayment applied to a previously open transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebtAllocation {
    /// The open transaction being paid down.
    pub transaction_id: TransactionId,
    /// Amount applied, in local currency.
    pub amount: Decimal,
}

impl DebtAllocation {
    /// Creates a new allocation.
    #[must_use]
    pub const fn new(transaction_id: TransactionId, amount: Decimal) -> Self {
        Self {
            transaction_id,
            amount,
        }
    }
}

/// An open transaction of the partner, supplied read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTransaction {
    /// Transaction identifier.
    pub id: TransactionId,
    /// Transaction date, used for oldest-first allocation.
    pub date: NaiveDate,
    /// Total amount due.
    pub total_due: Decimal,
    /// Amount already paid.
    pub total_paid: Decimal,
}

impl OpenTransaction {
    /// Outstanding balance (`total_due - total_paid`).
    #[must_use]
    pub fn leftover(&self) -> Decimal {
        self.total_due.saturating_sub(self.total_paid)
    }
}

/// A value supplied by an external collaborator that may still be loading.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum Loadable<T> {
    /// Not yet available.
    #[default]
    Pending,
    /// Available.
    Ready(T),
}

impl<T> Loadable<T> {
    /// Returns true while the value is not yet available.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl<T> From<Option<T>> for Loadable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Pending, Self::Ready)
    }
}

/// One open transaction inside an allocation session.
///
/// `allocate` and `pay_fully` are session state only and are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DebtRow {
    /// The open transaction.
    pub debt: OpenTransaction,
    /// Amount the user chose to allocate.
    pub allocate: Decimal,
    /// True iff `allocate == leftover`.
    pub pay_fully: bool,
}

impl DebtRow {
    /// Opens a row seeded with a previously applied amount.
    #[must_use]
    pub fn new(debt: OpenTransaction, allocate: Decimal) -> Self {
        let mut row = Self {
            debt,
            allocate: Decimal::ZERO,
            pay_fully: false,
        };
        row.set_allocate(allocate);
        row
    }

    /// Outstanding balance of the underlying transaction.
    #[must_use]
    pub fn leftover(&self) -> Decimal {
        self.debt.leftover()
    }

    /// Sets the allocated amount and re-derives `pay_fully`.
    pub(crate) fn set_allocate(&mut self, amount: Decimal) {
        self.allocate = amount;
        self.pay_fully = amount == self.leftover();
    }

    /// Clears the allocation.
    pub(crate) fn clear(&mut self) {
        self.allocate = Decimal::ZERO;
        self.pay_fully = false;
    }
}
