//! Payment row collection and its mutators.
//!
//! The set always holds at least one row. Mutators apply the business
//! defaults for account-credit rows:
//! - a new sale row draws existing credit first when any is available
//! - a row switched to account credit is forced to local currency at rate 1
//!   and its amount is capped by both the unpaid remainder and the advance

use paydesk_shared::types::{Currency, PaymentRowId};
use rust_decimal::Decimal;
use tracing::debug;

use super::summary::{sum_local, total_paid};
use super::types::{PaymentLine, PaymentMethod, PaymentPatch, PaymentRow};
use crate::partner::TransactionMode;

/// What the row mutators consult when applying defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowContext {
    /// Direction of the transaction.
    pub mode: TransactionMode,
    /// Amount due, in local currency.
    pub total_due: Decimal,
    /// Advance balance relevant to `mode`.
    pub advance: Decimal,
}

impl RowContext {
    /// Largest credit draw allowed against `remainder`, never negative.
    fn credit_cap(&self, remainder: Decimal) -> Decimal {
        remainder.min(self.advance.abs()).max(Decimal::ZERO)
    }
}

/// Ordered collection of payment rows for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRowSet {
    rows: Vec<PaymentRow>,
    next_id: u32,
}

impl PaymentRowSet {
    /// Creates a set holding its first row, built with the same defaults as `add`.
    #[must_use]
    pub fn new(ctx: &RowContext) -> Self {
        let mut set = Self {
            rows: Vec::with_capacity(2),
            next_id: 1,
        };
        set.add(ctx);
        set
    }

    /// Rows in entry order.
    #[must_use]
    pub fn rows(&self) -> &[PaymentRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false; the set never drops its last row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a row by id.
    #[must_use]
    pub fn get(&self, id: PaymentRowId) -> Option<&PaymentRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// The row drawing on account credit, if any.
    #[must_use]
    pub fn account_credit_row(&self) -> Option<&PaymentRow> {
        self.rows.iter().find(|row| row.method.is_account_credit())
    }

    /// Appends a row and returns its id.
    ///
    /// In sale mode, with a positive advance, a positive unpaid remainder and
    /// no account-credit row yet, the new row draws `min(remainder, |advance|)`
    /// from credit. The remainder is measured before the row is appended.
    /// Otherwise an empty local cash row is added.
    pub fn add(&mut self, ctx: &RowContext) -> PaymentRowId {
        let id = PaymentRowId::new(self.next_id);
        self.next_id += 1;

        let remainder = ctx.total_due.saturating_sub(total_paid(&self.rows));
        let draws_credit = ctx.mode == TransactionMode::Sale
            && ctx.advance > Decimal::ZERO
            && remainder > Decimal::ZERO
            && self.account_credit_row().is_none();

        let row = if draws_credit {
            PaymentRow::account_credit(id, ctx.credit_cap(remainder))
        } else {
            PaymentRow::cash(id)
        };

        debug!(row_id = %id, method = ?row.method, amount = %row.amount, "payment row added");
        self.rows.push(row);
        id
    }

    /// Merges `patch` into the row with `id`. Returns false if no such row exists.
    ///
    /// When the merged row uses account credit it is forced to local currency
    /// at rate 1. A row switching to account credit takes the full cap
    /// `min(remainder, |advance|)`, where the remainder excludes the row itself;
    /// a row already on account credit is clamped into `[0, cap]`.
    pub fn update(&mut self, id: PaymentRowId, patch: PaymentPatch, ctx: &RowContext) -> bool {
        let Some(index) = self.rows.iter().position(|row| row.id == id) else {
            debug!(row_id = %id, "update ignored for unknown payment row");
            return false;
        };

        let others_paid = sum_local(self.rows.iter().filter(|row| row.id != id)).total;
        let cap = ctx.credit_cap(ctx.total_due.saturating_sub(others_paid));

        let row = &mut self.rows[index];
        let was_credit = row.method.is_account_credit();
        row.merge(patch);

        if row.method.is_account_credit() {
            row.currency = Currency::Local;
            row.exchange_rate = Decimal::ONE;
            row.amount = if was_credit {
                row.amount.max(Decimal::ZERO).min(cap)
            } else {
                cap
            };
        }

        debug!(
            row_id = %id,
            method = ?row.method,
            currency = %row.currency,
            amount = %row.amount,
            "payment row updated"
        );
        true
    }

    /// Removes the row with `id` while more than one row remains.
    ///
    /// Returns true if a row was removed.
    pub fn remove(&mut self, id: PaymentRowId) -> bool {
        if self.rows.len() <= 1 {
            debug!(row_id = %id, "refusing to remove the last payment row");
            return false;
        }
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        let removed = self.rows.len() < before;
        if removed {
            debug!(row_id = %id, "payment row removed");
        }
        removed
    }

    /// Methods selectable for `for_row` (or for a new row when `None`).
    ///
    /// Account credit is offered only with a positive advance and when no
    /// other row already uses it.
    #[must_use]
    pub fn available_methods(
        &self,
        for_row: Option<PaymentRowId>,
        ctx: &RowContext,
    ) -> Vec<PaymentMethod> {
        let credit_taken = self
            .account_credit_row()
            .is_some_and(|row| Some(row.id) != for_row);
        let offer_credit = ctx.advance > Decimal::ZERO && !credit_taken;

        PaymentMethod::ALL
            .into_iter()
            .filter(|method| !method.is_account_credit() || offer_credit)
            .collect()
    }

    /// Finalized rows for the persistence layer.
    #[must_use]
    pub fn to_payload(&self) -> Vec<PaymentLine> {
        self.rows.iter().map(PaymentLine::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sale(total_due: Decimal, advance: Decimal) -> RowContext {
        RowContext {
            mode: TransactionMode::Sale,
            total_due,
            advance,
        }
    }

    #[test]
    fn test_new_set_has_one_cash_row_without_advance() {
        let set = PaymentRowSet::new(&sale(dec!(800), dec!(0)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.rows()[0], PaymentRow::cash(PaymentRowId::new(1)));
    }

    #[test]
    fn test_new_set_draws_credit_first_in_sale() {
        let set = PaymentRowSet::new(&sale(dec!(800), dec!(500)));
        let row = &set.rows()[0];
        assert_eq!(row.method, PaymentMethod::AccountCredit);
        assert_eq!(row.amount, dec!(500));
    }

    #[test]
    fn test_add_credit_amount_is_min_of_remainder_and_advance() {
        let ctx = sale(dec!(800), dec!(0));
        let mut set = PaymentRowSet::new(&ctx);
        set.update(PaymentRowId::new(1), PaymentPatch::amount(dec!(600)), &ctx);

        let ctx = sale(dec!(800), dec!(500));
        let id = set.add(&ctx);
        let row = set.get(id).unwrap();
        assert_eq!(row.method, PaymentMethod::AccountCredit);
        assert_eq!(row.amount, dec!(200));
        assert_eq!(row.currency, Currency::Local);
        assert_eq!(row.exchange_rate, Decimal::ONE);
    }

    #[test]
    fn test_add_only_one_credit_row() {
        let ctx = sale(dec!(800), dec!(500));
        let mut set = PaymentRowSet::new(&ctx);
        let id = set.add(&ctx);
        assert_eq!(set.get(id).unwrap().method, PaymentMethod::Cash);
    }

    #[test]
    fn test_add_in_supply_never_draws_credit() {
        let ctx = RowContext {
            mode: TransactionMode::Supply,
            total_due: dec!(800),
            advance: dec!(500),
        };
        let set = PaymentRowSet::new(&ctx);
        assert_eq!(set.rows()[0].method, PaymentMethod::Cash);
    }

    #[test]
    fn test_add_without_remainder_is_cash() {
        let ctx = sale(dec!(100), dec!(0));
        let mut set = PaymentRowSet::new(&ctx);
        set.update(PaymentRowId::new(1), PaymentPatch::amount(dec!(100)), &ctx);
        let id = set.add(&sale(dec!(100), dec!(500)));
        assert_eq!(set.get(id).unwrap().method, PaymentMethod::Cash);
    }

    #[test]
    fn test_ids_are_unique_after_removal() {
        let ctx = sale(dec!(100), dec!(0));
        let mut set = PaymentRowSet::new(&ctx);
        let second = set.add(&ctx);
        assert!(set.remove(second));
        let third = set.add(&ctx);
        assert_ne!(second, third);
    }

    #[test]
    fn test_update_unknown_row() {
        let ctx = sale(dec!(100), dec!(0));
        let mut set = PaymentRowSet::new(&ctx);
        assert!(!set.update(PaymentRowId::new(42), PaymentPatch::amount(dec!(1)), &ctx));
        assert_eq!(set.rows()[0].amount, Decimal::ZERO);
    }

    #[test]
    fn test_switch_to_credit_forces_local_and_caps() {
        let ctx = sale(dec!(1000), dec!(300));
        let mut set = PaymentRowSet::new(&sale(dec!(1000), dec!(0)));
        let id = PaymentRowId::new(1);
        set.update(
            id,
            PaymentPatch {
                amount: Some(dec!(10)),
                currency: Some(Currency::Usd),
                exchange_rate: Some(dec!(12000)),
                ..PaymentPatch::default()
            },
            &ctx,
        );
        set.update(id, PaymentPatch::method(PaymentMethod::AccountCredit), &ctx);

        let row = set.get(id).unwrap();
        assert_eq!(row.currency, Currency::Local);
        assert_eq!(row.exchange_rate, Decimal::ONE);
        assert_eq!(row.amount, dec!(300));
    }

    #[test]
    fn test_credit_cap_excludes_the_row_itself() {
        let ctx = sale(dec!(1000), dec!(900));
        let mut set = PaymentRowSet::new(&sale(dec!(1000), dec!(0)));
        set.update(PaymentRowId::new(1), PaymentPatch::amount(dec!(700)), &ctx);
        let second = set.add(&sale(dec!(1000), dec!(0)));
        set.update(second, PaymentPatch::method(PaymentMethod::AccountCredit), &ctx);
        assert_eq!(set.get(second).unwrap().amount, dec!(300));
    }

    #[test]
    fn test_credit_row_amount_is_clamped() {
        let ctx = sale(dec!(1000), dec!(400));
        let mut set = PaymentRowSet::new(&ctx);
        let id = PaymentRowId::new(1);
        assert_eq!(set.get(id).unwrap().amount, dec!(400));

        set.update(id, PaymentPatch::amount(dec!(250)), &ctx);
        assert_eq!(set.get(id).unwrap().amount, dec!(250));

        set.update(id, PaymentPatch::amount(dec!(5000)), &ctx);
        assert_eq!(set.get(id).unwrap().amount, dec!(400));

        set.update(id, PaymentPatch::amount(dec!(-5)), &ctx);
        assert_eq!(set.get(id).unwrap().amount, Decimal::ZERO);
    }

    #[test]
    fn test_credit_cap_never_negative() {
        let ctx = sale(dec!(100), dec!(500));
        let mut set = PaymentRowSet::new(&sale(dec!(100), dec!(0)));
        set.update(PaymentRowId::new(1), PaymentPatch::amount(dec!(150)), &ctx);
        let second = set.add(&sale(dec!(100), dec!(0)));
        set.update(second, PaymentPatch::method(PaymentMethod::AccountCredit), &ctx);
        assert_eq!(set.get(second).unwrap().amount, Decimal::ZERO);
    }

    #[test]
    fn test_remove_last_row_is_noop() {
        let ctx = sale(dec!(100), dec!(0));
        let mut set = PaymentRowSet::new(&ctx);
        assert!(!set.remove(PaymentRowId::new(1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_unknown_row() {
        let ctx = sale(dec!(100), dec!(0));
        let mut set = PaymentRowSet::new(&ctx);
        set.add(&ctx);
        assert!(!set.remove(PaymentRowId::new(99)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_available_methods() {
        let no_advance = sale(dec!(100), dec!(0));
        let set = PaymentRowSet::new(&no_advance);
        assert_eq!(
            set.available_methods(None, &no_advance),
            vec![
                PaymentMethod::Cash,
                PaymentMethod::Card,
                PaymentMethod::BankTransfer
            ]
        );

        let with_advance = sale(dec!(100), dec!(50));
        assert!(
            set.available_methods(None, &with_advance)
                .contains(&PaymentMethod::AccountCredit)
        );
    }

    #[test]
    fn test_available_methods_when_credit_taken() {
        let ctx = sale(dec!(100), dec!(50));
        let mut set = PaymentRowSet::new(&ctx);
        let credit_row = PaymentRowId::new(1);
        let cash_row = set.add(&ctx);

        assert!(
            !set.available_methods(None, &ctx)
                .contains(&PaymentMethod::AccountCredit)
        );
        assert!(
            !set.available_methods(Some(cash_row), &ctx)
                .contains(&PaymentMethod::AccountCredit)
        );
        assert!(
            set.available_methods(Some(credit_row), &ctx)
                .contains(&PaymentMethod::AccountCredit)
        );
    }

    #[test]
    fn test_to_payload_preserves_order() {
        let ctx = sale(dec!(100), dec!(0));
        let mut set = PaymentRowSet::new(&ctx);
        set.update(PaymentRowId::new(1), PaymentPatch::amount(dec!(60)), &ctx);
        let card = set.add(&ctx);
        set.update(
            card,
            PaymentPatch {
                amount: Some(dec!(40)),
                method: Some(PaymentMethod::Card),
                ..PaymentPatch::default()
            },
            &ctx,
        );

        let payload = set.to_payload();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].amount, dec!(60));
        assert_eq!(payload[1].method, PaymentMethod::Card);
    }

    #[test]
    fn test_out_of_range_row_is_left_out_of_remainder() {
        let ctx = sale(dec!(800), dec!(500));
        let mut set = PaymentRowSet::new(&ctx);
        let huge = set.add(&ctx);
        set.update(
            huge,
            PaymentPatch {
                amount: Some(Decimal::MAX),
                currency: Some(Currency::Usd),
                exchange_rate: Some(dec!(2)),
                ..PaymentPatch::default()
            },
            &ctx,
        );

        let third = set.add(&ctx);
        assert_eq!(set.get(third).unwrap().method, PaymentMethod::Cash);

        set.update(PaymentRowId::new(1), PaymentPatch::amount(dec!(100)), &ctx);
        assert_eq!(set.get(PaymentRowId::new(1)).unwrap().amount, dec!(100));
        assert_eq!(set.get(huge).unwrap().amount, Decimal::MAX);
    }
}
