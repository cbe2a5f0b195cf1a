//! Allocation of an overpayment across a partner's open transactions.
//!
//! An allocation session is opened with the pool that may be (re)allocated,
//! i.e. the current overpayment plus whatever is already allocated. Each open
//! transaction becomes a `DebtRow` whose `allocate` amount the user edits
//! directly, toggles to "pay fully", or fills automatically oldest-first.
//!
//! A session can be applied only if it allocates nothing, exhausts the pool,
//! or clears all debt. A partial allocation that leaves both money and debt
//! behind is rejected.

use paydesk_shared::types::TransactionId;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::error::AllocationError;
use super::types::{DebtAllocation, DebtRow, Loadable, OpenTransaction};

/// One debt allocation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtAllocator {
    rows: Loadable<Vec<DebtRow>>,
    available: Decimal,
    previous: Vec<DebtAllocation>,
    exclude: Option<TransactionId>,
}

impl DebtAllocator {
    /// Opens a session over `debts` with `available` to allocate.
    ///
    /// `previous` allocations are merged into the matching rows. Debts with
    /// nothing left to pay, and the transaction `exclude` (the one being paid),
    /// are not offered.
    #[must_use]
    pub fn open(
        debts: Loadable<Vec<OpenTransaction>>,
        available: Decimal,
        previous: &[DebtAllocation],
        exclude: Option<TransactionId>,
    ) -> Self {
        let mut allocator = Self {
            rows: Loadable::Pending,
            available,
            previous: previous.to_vec(),
            exclude,
        };
        if let Loadable::Ready(debts) = debts {
            allocator.load(debts);
        } else {
            debug!(%available, "debt allocation opened while open transactions load");
        }
        allocator
    }

    /// Rebuilds the rows once open transactions are available.
    pub fn load(&mut self, debts: Vec<OpenTransaction>) {
        let rows: Vec<DebtRow> = debts
            .into_iter()
            .filter(|debt| debt.leftover() > Decimal::ZERO)
            .filter(|debt| Some(debt.id) != self.exclude)
            .map(|debt| {
                let seeded = self
                    .previous
                    .iter()
                    .find(|a| a.transaction_id == debt.id)
                    .map_or(Decimal::ZERO, |a| a.amount);
                DebtRow::new(debt, seeded)
            })
            .collect();

        debug!(
            rows = rows.len(),
            available = %self.available,
            "debt allocation rows loaded"
        );
        self.rows = Loadable::Ready(rows);
    }

    /// Returns true while open transactions are still loading.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.rows.is_pending()
    }

    /// Rows in display order; empty while loading.
    #[must_use]
    pub fn rows(&self) -> &[DebtRow] {
        match &self.rows {
            Loadable::Pending => &[],
            Loadable::Ready(rows) => rows.as_slice(),
        }
    }

    fn rows_mut(&mut self) -> &mut [DebtRow] {
        match &mut self.rows {
            Loadable::Pending => &mut [],
            Loadable::Ready(rows) => rows.as_mut_slice(),
        }
    }

    /// Pool this session may allocate.
    #[must_use]
    pub fn available_amount(&self) -> Decimal {
        self.available
    }

    /// Sum of `allocate` over all rows.
    #[must_use]
    pub fn allocated_total(&self) -> Decimal {
        self.rows()
            .iter()
            .fold(Decimal::ZERO, |sum, row| sum.saturating_add(row.allocate))
    }

    /// Pool not yet allocated; negative when over-allocated.
    #[must_use]
    pub fn remaining_available(&self) -> Decimal {
        self.available.saturating_sub(self.allocated_total())
    }

    /// Sum of leftovers over all rows.
    #[must_use]
    pub fn total_debt(&self) -> Decimal {
        self.rows()
            .iter()
            .fold(Decimal::ZERO, |sum, row| sum.saturating_add(row.leftover()))
    }

    /// Debt not covered by the current allocation.
    #[must_use]
    pub fn debt_left(&self) -> Decimal {
        self.total_debt()
            .saturating_sub(self.allocated_total())
            .max(Decimal::ZERO)
    }

    /// Returns true if more than the pool is allocated.
    #[must_use]
    pub fn is_over_allocated(&self) -> bool {
        self.remaining_available() < Decimal::ZERO
    }

    /// Largest amount row `index` may hold: `min(leftover, remaining + current)`.
    #[must_use]
    pub fn row_limit(&self, index: usize) -> Option<Decimal> {
        let row = self.rows().get(index)?;
        Some(
            row.leftover()
                .min(self.remaining_available().saturating_add(row.allocate)),
        )
    }

    /// Sets the allocation of row `index`, clamped into `[0, row_limit]`.
    ///
    /// Returns the amount actually stored.
    pub fn change_allocate(
        &mut self,
        index: usize,
        value: Decimal,
    ) -> Result<Decimal, AllocationError> {
        let limit = self
            .row_limit(index)
            .ok_or(AllocationError::RowOutOfRange(index))?;
        let clamped = value.min(limit).max(Decimal::ZERO);

        let row = &mut self.rows_mut()[index];
        row.set_allocate(clamped);
        debug!(
            transaction_id = %row.debt.id,
            requested = %value,
            allocate = %clamped,
            pay_fully = row.pay_fully,
            "debt allocation changed"
        );
        Ok(clamped)
    }

    /// Returns true if row `index` may be toggled.
    ///
    /// A fully paid row can always be toggled off; turning it on requires the
    /// whole leftover to fit in `remaining + current`.
    #[must_use]
    pub fn can_toggle(&self, index: usize) -> bool {
        let Some(row) = self.rows().get(index) else {
            return false;
        };
        row.pay_fully || row.leftover() <= self.remaining_available().saturating_add(row.allocate)
    }

    /// Toggles "pay fully" on row `index`.
    ///
    /// Returns `Ok(false)` when toggling on is disabled.
    pub fn toggle_pay_fully(&mut self, index: usize) -> Result<bool, AllocationError> {
        let limit = self
            .row_limit(index)
            .ok_or(AllocationError::RowOutOfRange(index))?;
        if !self.can_toggle(index) {
            debug!(index, "pay fully toggle disabled");
            return Ok(false);
        }

        let row = &mut self.rows_mut()[index];
        if row.pay_fully {
            row.clear();
        } else {
            row.allocate = limit;
            row.pay_fully = true;
        }
        debug!(
            transaction_id = %row.debt.id,
            pay_fully = row.pay_fully,
            allocate = %row.allocate,
            "pay fully toggled"
        );
        Ok(true)
    }

    /// Spends the remaining pool on rows oldest-first.
    ///
    /// Amounts already allocated, whether seeded or entered by hand, are kept.
    /// Each row, in ascending date order, is topped up by
    /// `min(leftover - allocate, budget)` where the budget starts at
    /// `remaining_available` and shrinks as rows are filled. From an empty
    /// session this is `min(leftover, budget)` per row. Afterwards either the
    /// pool is exhausted or all debt is covered, unless the session was
    /// already over-allocated. Display order is left unchanged.
    pub fn auto_allocate_oldest(&mut self) {
        let mut budget = self.remaining_available().max(Decimal::ZERO);
        let rows = self.rows_mut();

        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by_key(|&i| rows[i].debt.date);

        for i in order {
            let row = &mut rows[i];
            let top_up = row
                .leftover()
                .saturating_sub(row.allocate)
                .max(Decimal::ZERO)
                .min(budget);
            row.set_allocate(row.allocate.saturating_add(top_up));
            budget = budget.saturating_sub(top_up);
        }

        debug!(
            allocated = %self.allocated_total(),
            remaining = %self.remaining_available(),
            "debts auto-allocated oldest first"
        );
    }

    /// Clears every row.
    pub fn reset(&mut self) {
        for row in self.rows_mut() {
            row.clear();
        }
        debug!("debt allocations reset");
    }

    /// Checks the allocation can be applied.
    pub fn validate(&self) -> Result<(), AllocationError> {
        if self.is_loading() {
            return Err(AllocationError::NotLoaded);
        }
        let allocated = self.allocated_total();
        if allocated.is_zero() {
            return Ok(());
        }
        if self.is_over_allocated() {
            return Err(AllocationError::OverAllocated {
                allocated,
                available: self.available,
            });
        }
        let remaining = self.remaining_available();
        let debt_left = self.debt_left();
        if !remaining.is_zero() && !debt_left.is_zero() {
            return Err(AllocationError::PartialAllocation {
                remaining,
                debt_left,
            });
        }
        Ok(())
    }

    /// Returns true if the session may be applied.
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.validate().is_ok()
    }

    /// Emits the rows with a positive allocation.
    pub fn apply(&self) -> Result<Vec<DebtAllocation>, AllocationError> {
        if let Err(err) = self.validate() {
            warn!(error = %err, "debt allocation rejected");
            return Err(err);
        }
        Ok(self
            .rows()
            .iter()
            .filter(|row| row.allocate > Decimal::ZERO)
            .map(|row| DebtAllocation::new(row.debt.id, row.allocate))
            .collect())
    }
}
