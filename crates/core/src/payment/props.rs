//! Property-based tests for payment rows and summaries.

use paydesk_shared::types::{Currency, PaymentRowId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::rows::{PaymentRowSet, RowContext};
use super::summary::{PaymentSummaryCalculator, SummaryInput};
use super::types::{PaymentMethod, PaymentPatch, PaymentRow};
use crate::partner::{PartnerBalance, TransactionMode};

/// Strategy to generate a non-negative amount (0.00 to 100,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a positive exchange rate (0.0001 to 100,000.0000).
fn rate() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy mixing ordinary amounts with values at the edge of `Decimal`.
fn extreme_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        3 => amount(),
        1 => Just(Decimal::MAX),
        1 => Just(Decimal::MIN),
        1 => (0u64..1_000u64).prop_map(|d| Decimal::MAX - Decimal::from(d)),
    ]
}

fn currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::Local),
        Just(Currency::Usd),
        Just(Currency::Eur),
        Just(Currency::Rub),
    ]
}

fn method() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::Card),
        Just(PaymentMethod::BankTransfer),
        Just(PaymentMethod::AccountCredit),
    ]
}

fn mode() -> impl Strategy<Value = TransactionMode> {
    prop_oneof![Just(TransactionMode::Sale), Just(TransactionMode::Supply)]
}

/// Strategy to generate arbitrary rows with distinct ids.
fn rows() -> impl Strategy<Value = Vec<PaymentRow>> {
    prop::collection::vec((amount(), currency(), rate(), method()), 1..6).prop_map(|items| {
        items
            .into_iter()
            .zip(1u32..)
            .map(|((amount, currency, exchange_rate, method), id)| PaymentRow {
                id: PaymentRowId::new(id),
                amount,
                currency,
                exchange_rate,
                method,
                reference: None,
            })
            .collect()
    })
}

/// Rows whose amounts and rates may overflow when multiplied or summed.
fn extreme_rows() -> impl Strategy<Value = Vec<PaymentRow>> {
    prop::collection::vec((extreme_amount(), currency(), extreme_amount(), method()), 1..6)
        .prop_map(|items| {
            items
                .into_iter()
                .zip(1u32..)
                .map(|((amount, currency, exchange_rate, method), id)| PaymentRow {
                    id: PaymentRowId::new(id),
                    amount,
                    currency,
                    exchange_rate,
                    method,
                    reference: None,
                })
                .collect()
        })
}

/// Strategy to generate a patch touching any subset of fields.
fn patch() -> impl Strategy<Value = PaymentPatch> {
    (
        proptest::option::of(amount()),
        proptest::option::of(currency()),
        proptest::option::of(rate()),
        proptest::option::of(method()),
    )
        .prop_map(|(amount, currency, exchange_rate, method)| PaymentPatch {
            amount,
            currency,
            exchange_rate,
            method,
            reference: None,
        })
}

fn input(
    mode: TransactionMode,
    total_due: Decimal,
    payments: Vec<PaymentRow>,
    advance: Decimal,
) -> SummaryInput {
    SummaryInput {
        mode,
        total_due,
        payments,
        debt_allocations: vec![],
        refund_change: false,
        partner_balance: PartnerBalance {
            partner_advance: advance,
            company_advance: advance,
            ..PartnerBalance::default()
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// total_paid is exactly the sum of amount * rate.
    #[test]
    fn prop_total_paid_is_exact_sum(
        mode in mode(),
        total_due in amount(),
        payments in rows(),
    ) {
        let expected: Decimal = payments.iter().map(|r| r.amount * r.exchange_rate).sum();
        let summary = PaymentSummaryCalculator::calculate(&input(mode, total_due, payments, Decimal::ZERO));
        prop_assert_eq!(summary.total_paid, expected);
    }

    /// Overpaid and underpaid are never both non-zero, and neither is negative.
    #[test]
    fn prop_overpaid_underpaid_exclusive(
        mode in mode(),
        total_due in amount(),
        payments in rows(),
        advance in amount(),
    ) {
        let summary = PaymentSummaryCalculator::calculate(&input(mode, total_due, payments, advance));
        prop_assert!(summary.overpaid >= Decimal::ZERO);
        prop_assert!(summary.underpaid >= Decimal::ZERO);
        prop_assert!(summary.overpaid.is_zero() || summary.underpaid.is_zero());
        prop_assert!(summary.effective_overpaid >= Decimal::ZERO);
        prop_assert!(summary.effective_overpaid <= summary.overpaid);
    }

    /// Out-of-range rows never abort the derivation and are always reported invalid.
    #[test]
    fn prop_extreme_rows_are_flagged(
        mode in mode(),
        total_due in extreme_amount(),
        payments in extreme_rows(),
        advance in amount(),
    ) {
        let summary =
            PaymentSummaryCalculator::calculate(&input(mode, total_due, payments.clone(), advance));
        for row in &payments {
            if row.local_amount().is_none() {
                prop_assert!(summary.invalid_rows.contains(&row.id));
                prop_assert!(!summary.payment_is_valid);
            }
        }
        prop_assert!(summary.overpaid.is_zero() || summary.underpaid.is_zero());
    }

    /// Row mutators tolerate out-of-range amounts.
    #[test]
    fn prop_row_set_tolerates_extreme_amounts(
        total_due in extreme_amount(),
        advance in amount(),
        amounts in prop::collection::vec((0u32..4, extreme_amount(), extreme_amount()), 0..8),
    ) {
        let ctx = RowContext { mode: TransactionMode::Sale, total_due, advance };
        let mut set = PaymentRowSet::new(&ctx);
        for (id, amount, rate) in amounts {
            set.update(
                PaymentRowId::new(id),
                PaymentPatch {
                    amount: Some(amount),
                    currency: Some(Currency::Usd),
                    exchange_rate: Some(rate),
                    ..PaymentPatch::default()
                },
                &ctx,
            );
            set.add(&ctx);
        }
        prop_assert!(!set.is_empty());
    }

    /// Identical inputs always yield identical summaries.
    #[test]
    fn prop_calculation_is_deterministic(
        mode in mode(),
        total_due in amount(),
        payments in rows(),
        advance in amount(),
    ) {
        let data = input(mode, total_due, payments, advance);
        prop_assert_eq!(
            PaymentSummaryCalculator::calculate(&data),
            PaymentSummaryCalculator::calculate(&data.clone())
        );
    }

    /// Rows kept by the row set never carry account credit outside local currency at rate 1.
    #[test]
    fn prop_account_credit_rows_are_local(
        mode in mode(),
        total_due in amount(),
        advance in amount(),
        patches in prop::collection::vec((0u32..4, patch()), 0..12),
    ) {
        let ctx = RowContext { mode, total_due, advance };
        let mut set = PaymentRowSet::new(&ctx);
        set.add(&ctx);
        set.add(&ctx);
        for (id, patch) in patches {
            set.update(PaymentRowId::new(id), patch, &ctx);
        }

        for row in set.rows() {
            if row.method == PaymentMethod::AccountCredit {
                prop_assert_eq!(row.currency, Currency::Local);
                prop_assert_eq!(row.exchange_rate, Decimal::ONE);
                prop_assert!(row.amount >= Decimal::ZERO);
                prop_assert!(row.amount <= advance.abs());
            }
        }
    }

    /// Removing rows never empties the set.
    #[test]
    fn prop_remove_keeps_one_row(
        adds in 0usize..5,
        removals in prop::collection::vec(0u32..8, 0..10),
    ) {
        let ctx = RowContext {
            mode: TransactionMode::Sale,
            total_due: Decimal::ONE_HUNDRED,
            advance: Decimal::ZERO,
        };
        let mut set = PaymentRowSet::new(&ctx);
        for _ in 0..adds {
            set.add(&ctx);
        }
        for id in removals {
            set.remove(PaymentRowId::new(id));
        }
        prop_assert!(set.len() >= 1);
    }
}
