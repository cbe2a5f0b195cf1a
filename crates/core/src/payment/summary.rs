//! Payment summary derivation.
//!
//! `PaymentSummaryCalculator::calculate` is a pure function of its input: it
//! never mutates, never fails and always yields the same summary for the same
//! input. Invalid states are reported through the boolean flags only.

use paydesk_shared::types::PaymentRowId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::types::{PaymentMethod, PaymentRow};
use crate::currency::{rate_is_consistent, round_for_display};
use crate::debt::DebtAllocation;
use crate::partner::{PartnerBalance, TransactionMode};

/// Everything the summary is derived from.
///
/// `Hash + Eq` so it can key a memoized summary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SummaryInput {
    /// Direction of the transaction.
    pub mode: TransactionMode,
    /// Amount due for the transaction, in local currency.
    pub total_due: Decimal,
    /// Entered payment rows.
    pub payments: Vec<PaymentRow>,
    /// Current debt allocations.
    pub debt_allocations: Vec<DebtAllocation>,
    /// When set, an overpayment is handed back as change instead of kept as advance.
    pub refund_change: bool,
    /// Partner balance snapshot.
    pub partner_balance: PartnerBalance,
}

/// Derived totals and save-gating flags. Recomputed from scratch on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedSummary {
    /// Sum of all rows in local currency.
    pub total_paid: Decimal,
    /// Amount paid beyond the due amount.
    pub overpaid: Decimal,
    /// Amount still missing to cover the due amount.
    pub underpaid: Decimal,
    /// Sum of debt allocations.
    pub debt_paid: Decimal,
    /// Overpayment not consumed by debt allocations.
    pub effective_overpaid: Decimal,
    /// Projected partner balance after the transaction.
    pub balance_after: Decimal,
    /// Existing credit must be drawn before a shortfall is accepted.
    pub must_use_account_credit: bool,
    /// An overpayment must retire existing debt before it becomes credit.
    pub must_allocate_debt: bool,
    /// Every row is valid and neither gate above is raised.
    pub payment_is_valid: bool,
    /// Rows failing row-level validation, in row order.
    pub invalid_rows: Vec<PaymentRowId>,
}

impl DerivedSummary {
    /// Returns a copy with every amount rounded for display.
    #[must_use]
    pub fn rounded(&self, decimal_places: u32) -> Self {
        let round = |value: Decimal| round_for_display(value, decimal_places);
        Self {
            total_paid: round(self.total_paid),
            overpaid: round(self.overpaid),
            underpaid: round(self.underpaid),
            debt_paid: round(self.debt_paid),
            effective_overpaid: round(self.effective_overpaid),
            balance_after: round(self.balance_after),
            must_use_account_credit: self.must_use_account_credit,
            must_allocate_debt: self.must_allocate_debt,
            payment_is_valid: self.payment_is_valid,
            invalid_rows: self.invalid_rows.clone(),
        }
    }
}

/// Reason a single payment row is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssue {
    /// Amount is zero or negative.
    NonPositiveAmount,
    /// Exchange rate is zero or negative.
    NonPositiveRate,
    /// Local row without a unit rate, or foreign row with a unit rate.
    InconsistentRate,
    /// Account-credit row draws more than the available advance.
    CreditExceedsAdvance,
    /// Account-credit row is not in local currency.
    CreditNotLocal,
    /// Amount times rate does not fit in a `Decimal`.
    NonFinite,
}

/// Validates a single row against the available advance.
///
/// Returns every rule the row breaks; an empty list means the row is valid.
#[must_use]
pub fn validate_row(row: &PaymentRow, advance: Decimal) -> Vec<RowIssue> {
    let mut issues = Vec::new();

    if row.amount <= Decimal::ZERO {
        issues.push(RowIssue::NonPositiveAmount);
    }
    if row.exchange_rate <= Decimal::ZERO {
        issues.push(RowIssue::NonPositiveRate);
    }
    if !rate_is_consistent(row.currency, row.exchange_rate) {
        issues.push(RowIssue::InconsistentRate);
    }
    if row.local_amount().is_none() {
        issues.push(RowIssue::NonFinite);
    }
    if row.method == PaymentMethod::AccountCredit {
        if row.amount > advance.abs() {
            issues.push(RowIssue::CreditExceedsAdvance);
        }
        if !row.currency.is_local() {
            issues.push(RowIssue::CreditNotLocal);
        }
    }

    issues
}

/// Local-currency total of a set of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaidTotal {
    /// Sum of the rows that fit.
    pub total: Decimal,
    /// Rows left out because their amount, or the running total, overflowed.
    pub out_of_range: Vec<PaymentRowId>,
}

/// Sums rows in local currency, in row order.
///
/// A row whose local amount does not fit in a `Decimal`, or would push the
/// running total past it, is left out of the total and listed instead.
#[must_use]
pub fn sum_local<'a>(rows: impl IntoIterator<Item = &'a PaymentRow>) -> PaidTotal {
    let mut paid = PaidTotal::default();
    for row in rows {
        match row.local_amount().and_then(|v| paid.total.checked_add(v)) {
            Some(total) => paid.total = total,
            None => paid.out_of_range.push(row.id),
        }
    }
    paid
}

/// Sum of all rows normalized to local currency, skipping out-of-range rows.
#[must_use]
pub fn total_paid(rows: &[PaymentRow]) -> Decimal {
    sum_local(rows).total
}

/// Pure summary calculator.
pub struct PaymentSummaryCalculator;

impl PaymentSummaryCalculator {
    /// Derives the payment summary.
    ///
    /// Steps:
    /// 1. Normalize every row to local currency and sum
    /// 2. Sum debt allocations
    /// 3. Split the gap into overpaid / underpaid
    /// 4. Project the partner balance (signs depend on the mode)
    /// 5. Raise the account-credit and debt-allocation gates
    /// 6. Validate each row
    #[must_use]
    pub fn calculate(input: &SummaryInput) -> DerivedSummary {
        let mode = input.mode;
        let balance = &input.partner_balance;
        let advance = balance.advance_for(mode);
        let existing_debt = balance.debt_for(mode);

        let paid = sum_local(&input.payments);
        let total_paid = paid.total;
        // snapshots come from outside, so the projection saturates instead of panicking
        let debt_paid = input
            .debt_allocations
            .iter()
            .fold(Decimal::ZERO, |sum, a| sum.saturating_add(a.amount));

        let overpaid = total_paid.saturating_sub(input.total_due).max(Decimal::ZERO);
        let underpaid = input.total_due.saturating_sub(total_paid).max(Decimal::ZERO);
        let effective_overpaid = overpaid.saturating_sub(debt_paid).max(Decimal::ZERO);

        let account_row = input
            .payments
            .iter()
            .find(|row| row.method.is_account_credit());
        // account-credit rows are local by invariant
        let account_used = account_row.map_or(Decimal::ZERO, |row| row.amount);

        let paid_for_current = total_paid.saturating_sub(debt_paid);
        let unpaid = input
            .total_due
            .saturating_sub(paid_for_current)
            .max(Decimal::ZERO);
        let extra_advance = if input.refund_change {
            Decimal::ZERO
        } else {
            paid_for_current
                .saturating_sub(input.total_due)
                .max(Decimal::ZERO)
        };

        let balance_after = match mode {
            TransactionMode::Sale => balance
                .total
                .saturating_add(debt_paid)
                .saturating_sub(unpaid)
                .saturating_add(extra_advance)
                .saturating_sub(account_used),
            TransactionMode::Supply => balance
                .total
                .saturating_sub(debt_paid)
                .saturating_add(unpaid)
                .saturating_sub(extra_advance)
                .saturating_add(account_used),
        };

        let account_credit_in_use = account_row.is_some_and(|row| row.amount > Decimal::ZERO);
        let must_use_account_credit =
            advance > Decimal::ZERO && total_paid < input.total_due && !account_credit_in_use;
        let must_allocate_debt =
            existing_debt > Decimal::ZERO && overpaid > Decimal::ZERO && debt_paid.is_zero();

        let invalid_rows: Vec<PaymentRowId> = input
            .payments
            .iter()
            .filter(|row| {
                paid.out_of_range.contains(&row.id) || !validate_row(row, advance).is_empty()
            })
            .map(|row| row.id)
            .collect();

        let payment_is_valid =
            invalid_rows.is_empty() && !must_use_account_credit && !must_allocate_debt;

        trace!(
            %total_paid,
            %overpaid,
            %underpaid,
            %debt_paid,
            %balance_after,
            payment_is_valid,
            "payment summary derived"
        );

        DerivedSummary {
            total_paid,
            overpaid,
            underpaid,
            debt_paid,
            effective_overpaid,
            balance_after,
            must_use_account_credit,
            must_allocate_debt,
            payment_is_valid,
            invalid_rows,
        }
    }
}
