//! Payment editing session.
//!
//! `PaymentSession` owns every piece of mutable state of one payment dialog:
//! the payment rows, the applied debt allocations, the selected partner and
//! the refund flag. Every mutator re-derives the summary afterwards and
//! applies the reactive rules:
//! - allocations are dropped once there is no overpayment left to allocate
//! - allocations are dropped whenever the partner changes

use std::sync::Arc;

use paydesk_shared::types::{PaymentRowId, TransactionId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::SessionError;
use crate::debt::{DebtAllocation, DebtAllocator, Loadable, OpenTransaction};
use crate::partner::{PartnerBalance, PartnerContext, TransactionMode, TransactionRecord};
use crate::payment::{
    DerivedSummary, PaymentLine, PaymentMethod, PaymentPatch, PaymentRow, PaymentRowSet,
    PaymentSummaryCalculator, RowContext, SummaryCache, SummaryInput,
};

/// Everything the persistence layer needs to record the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavePayload {
    /// Finalized payment rows.
    pub payments: Vec<PaymentLine>,
    /// Finalized debt allocations.
    pub debt_allocations: Vec<DebtAllocation>,
    /// Whether the overpayment is handed back as change.
    pub refund_change: bool,
}

/// One payment editing session.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    mode: TransactionMode,
    total_due: Decimal,
    partner: Option<PartnerContext>,
    refund_change: bool,
    rows: PaymentRowSet,
    debt_allocations: Vec<DebtAllocation>,
    cache: Option<SummaryCache>,
}

impl PaymentSession {
    /// Opens a session paying `total_due` with no partner selected.
    #[must_use]
    pub fn new(mode: TransactionMode, total_due: Decimal) -> Self {
        let ctx = RowContext {
            mode,
            total_due,
            advance: Decimal::ZERO,
        };
        debug!(?mode, %total_due, "payment session opened");
        Self {
            mode,
            total_due,
            partner: None,
            refund_change: false,
            rows: PaymentRowSet::new(&ctx),
            debt_allocations: Vec::new(),
            cache: None,
        }
    }

    /// Opens a session paying the outstanding amount of `record`.
    #[must_use]
    pub fn for_record(mode: TransactionMode, record: &TransactionRecord) -> Self {
        Self::new(mode, record.outstanding())
    }

    /// Opens a session for `partner`, whose credit seeds the first row.
    #[must_use]
    pub fn with_partner(
        mode: TransactionMode,
        total_due: Decimal,
        partner: PartnerContext,
    ) -> Self {
        let advance = partner.balance.advance_for(mode);
        let ctx = RowContext {
            mode,
            total_due,
            advance,
        };
        debug!(?mode, %total_due, partner_id = %partner.id, %advance, "payment session opened");
        Self {
            mode,
            total_due,
            partner: Some(partner),
            refund_change: false,
            rows: PaymentRowSet::new(&ctx),
            debt_allocations: Vec::new(),
            cache: None,
        }
    }

    /// Memoizes summaries through `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: SummaryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Direction of the transaction.
    #[must_use]
    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    /// Amount due.
    #[must_use]
    pub fn total_due(&self) -> Decimal {
        self.total_due
    }

    /// Selected partner, if any.
    #[must_use]
    pub fn partner(&self) -> Option<&PartnerContext> {
        self.partner.as_ref()
    }

    /// Balance of the selected partner; zero when none is selected.
    #[must_use]
    pub fn partner_balance(&self) -> PartnerBalance {
        self.partner.map(|p| p.balance).unwrap_or_default()
    }

    /// Whether an overpayment is handed back as change.
    #[must_use]
    pub fn refund_change(&self) -> bool {
        self.refund_change
    }

    /// Current payment rows.
    #[must_use]
    pub fn rows(&self) -> &[PaymentRow] {
        self.rows.rows()
    }

    /// Currently applied debt allocations.
    #[must_use]
    pub fn debt_allocations(&self) -> &[DebtAllocation] {
        &self.debt_allocations
    }

    fn row_context(&self) -> RowContext {
        RowContext {
            mode: self.mode,
            total_due: self.total_due,
            advance: self.partner_balance().advance_for(self.mode),
        }
    }

    /// Input the summary is derived from.
    #[must_use]
    pub fn summary_input(&self) -> SummaryInput {
        SummaryInput {
            mode: self.mode,
            total_due: self.total_due,
            payments: self.rows.rows().to_vec(),
            debt_allocations: self.debt_allocations.clone(),
            refund_change: self.refund_change,
            partner_balance: self.partner_balance(),
        }
    }

    /// Derives the summary for the current state.
    #[must_use]
    pub fn summary(&self) -> Arc<DerivedSummary> {
        let input = self.summary_input();
        match &self.cache {
            Some(cache) => cache.get_or_calculate(&input),
            None => Arc::new(PaymentSummaryCalculator::calculate(&input)),
        }
    }

    /// Appends a payment row with the business defaults applied.
    pub fn add_payment(&mut self) -> PaymentRowId {
        let ctx = self.row_context();
        let id = self.rows.add(&ctx);
        self.after_payment_change();
        id
    }

    /// Merges `patch` into row `id`. Returns false if no such row exists.
    pub fn update_payment(&mut self, id: PaymentRowId, patch: PaymentPatch) -> bool {
        let ctx = self.row_context();
        let updated = self.rows.update(id, patch, &ctx);
        if updated {
            self.after_payment_change();
        }
        updated
    }

    /// Removes row `id` unless it is the last one.
    pub fn remove_payment(&mut self, id: PaymentRowId) -> bool {
        let removed = self.rows.remove(id);
        if removed {
            self.after_payment_change();
        }
        removed
    }

    /// Methods selectable for `row` (or for a new row when `None`).
    #[must_use]
    pub fn available_methods(&self, row: Option<PaymentRowId>) -> Vec<PaymentMethod> {
        self.rows.available_methods(row, &self.row_context())
    }

    /// Sets whether an overpayment is handed back as change.
    pub fn set_refund_change(&mut self, refund_change: bool) {
        self.refund_change = refund_change;
        debug!(refund_change, "refund change toggled");
    }

    /// Changes the selected partner. Debt allocations are always cleared.
    pub fn select_partner(&mut self, partner: Option<PartnerContext>) {
        debug!(
            partner_id = ?partner.map(|p| p.id),
            cleared = self.debt_allocations.len(),
            "partner selected"
        );
        self.partner = partner;
        self.debt_allocations.clear();
    }

    /// Opens an allocation session over the partner's open transactions.
    ///
    /// The pool is the current overpayment plus what is already allocated.
    /// `exclude` is the transaction being paid, which is never offered as a debt.
    #[must_use]
    pub fn open_debt_allocator(
        &self,
        debts: Loadable<Vec<OpenTransaction>>,
        exclude: Option<TransactionId>,
    ) -> DebtAllocator {
        let summary = self.summary();
        let available = summary.overpaid.saturating_add(summary.debt_paid);
        DebtAllocator::open(debts, available, &self.debt_allocations, exclude)
    }

    /// Replaces the debt allocations with the result of `allocator`.
    pub fn apply_debt_allocations(
        &mut self,
        allocator: &DebtAllocator,
    ) -> Result<(), SessionError> {
        let allocations = allocator.apply()?;
        debug!(count = allocations.len(), "debt allocations applied");
        self.debt_allocations = allocations;
        Ok(())
    }

    /// Drops every debt allocation.
    pub fn clear_debt_allocations(&mut self) {
        self.debt_allocations.clear();
    }

    /// Finalized payment rows.
    #[must_use]
    pub fn build_payment_payload(&self) -> Vec<PaymentLine> {
        self.rows.to_payload()
    }

    /// Finalized debt allocations.
    #[must_use]
    pub fn build_debt_allocation_payload(&self) -> Vec<DebtAllocation> {
        self.debt_allocations.clone()
    }

    /// Returns true if the save action may be invoked.
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.summary().payment_is_valid
    }

    /// Builds the save payload, or the first reason the session cannot be saved.
    pub fn submit(&self) -> Result<SavePayload, SessionError> {
        let summary = self.summary();
        let gate = if let Some(&row) = summary.invalid_rows.first() {
            Err(SessionError::InvalidPaymentRow(row))
        } else if summary.must_use_account_credit {
            Err(SessionError::AccountCreditRequired)
        } else if summary.must_allocate_debt {
            Err(SessionError::DebtAllocationRequired)
        } else {
            Ok(())
        };

        if let Err(err) = gate {
            warn!(error = %err, code = err.error_code(), "payment submit rejected");
            return Err(err);
        }

        Ok(SavePayload {
            payments: self.build_payment_payload(),
            debt_allocations: self.build_debt_allocation_payload(),
            refund_change: self.refund_change,
        })
    }

    fn after_payment_change(&mut self) {
        if self.debt_allocations.is_empty() {
            return;
        }
        if self.summary().overpaid.is_zero() {
            debug!(
                cleared = self.debt_allocations.len(),
                "overpayment gone, debt allocations cleared"
            );
            self.debt_allocations.clear();
        }
    }
}
