//! Property-based tests for debt allocation sessions.

use chrono::NaiveDate;
use paydesk_shared::types::TransactionId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::allocator::DebtAllocator;
use super::types::{Loadable, OpenTransaction};

/// Strategy to generate a positive amount (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate 1-8 open transactions with distinct ids.
fn open_debts() -> impl Strategy<Value = Vec<OpenTransaction>> {
    prop::collection::vec((positive_amount(), 0u32..365), 1..8).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (leftover, day))| OpenTransaction {
                id: TransactionId::new(i64::try_from(i).unwrap_or_default() + 1),
                date: NaiveDate::from_yo_opt(2024, day + 1).unwrap(),
                total_due: leftover,
                total_paid: Decimal::ZERO,
            })
            .collect()
    })
}

/// Strategy to generate a sequence of (row, value) edits.
fn edits() -> impl Strategy<Value = Vec<(usize, Decimal)>> {
    prop::collection::vec((0usize..8, positive_amount()), 0..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// No sequence of edits allocates beyond the pool or beyond a row's leftover.
    #[test]
    fn prop_edits_never_over_allocate(
        debts in open_debts(),
        available in positive_amount(),
        edits in edits(),
    ) {
        let mut allocator = DebtAllocator::open(Loadable::Ready(debts), available, &[], None);
        for (index, value) in edits {
            let _ = allocator.change_allocate(index, value);
        }

        prop_assert!(allocator.allocated_total() <= available);
        for row in allocator.rows() {
            prop_assert!(row.allocate >= Decimal::ZERO);
            prop_assert!(row.allocate <= row.leftover());
            prop_assert_eq!(row.pay_fully, row.allocate == row.leftover());
        }
    }

    /// Auto allocation exhausts the pool or clears the debt, and can always be applied.
    #[test]
    fn prop_auto_allocation_is_saveable(
        debts in open_debts(),
        available in positive_amount(),
    ) {
        let mut allocator = DebtAllocator::open(Loadable::Ready(debts), available, &[], None);
        allocator.auto_allocate_oldest();

        prop_assert!(
            allocator.remaining_available().is_zero() || allocator.debt_left().is_zero()
        );
        let applied = allocator.apply();
        prop_assert!(applied.is_ok());
        let total: Decimal = applied.unwrap_or_default().iter().map(|a| a.amount).sum();
        prop_assert!(total <= available);
    }

    /// Auto allocation after manual edits keeps every edited amount and still saves.
    #[test]
    fn prop_auto_allocation_tops_up_edits(
        debts in open_debts(),
        available in positive_amount(),
        edits in edits(),
    ) {
        let mut allocator = DebtAllocator::open(Loadable::Ready(debts), available, &[], None);
        for (index, value) in edits {
            let _ = allocator.change_allocate(index, value);
        }
        let before: Vec<Decimal> = allocator.rows().iter().map(|row| row.allocate).collect();

        allocator.auto_allocate_oldest();

        for (row, kept) in allocator.rows().iter().zip(before) {
            prop_assert!(row.allocate >= kept);
            prop_assert!(row.allocate <= row.leftover());
        }
        prop_assert!(
            allocator.remaining_available().is_zero() || allocator.debt_left().is_zero()
        );
        prop_assert!(allocator.can_save());
    }

    /// Whatever `apply` emits never exceeds the pool.
    #[test]
    fn prop_applied_allocations_within_pool(
        debts in open_debts(),
        available in positive_amount(),
        edits in edits(),
    ) {
        let mut allocator = DebtAllocator::open(Loadable::Ready(debts), available, &[], None);
        for (index, value) in edits {
            let _ = allocator.change_allocate(index, value);
        }
        if let Ok(allocations) = allocator.apply() {
            let total: Decimal = allocations.iter().map(|a| a.amount).sum();
            prop_assert!(total <= available);
            prop_assert!(allocations.iter().all(|a| a.amount > Decimal::ZERO));
        }
    }

    /// Toggling a row twice returns it to an empty allocation.
    #[test]
    fn prop_toggle_twice_round_trips(
        debts in open_debts(),
        available in positive_amount(),
        index in 0usize..8,
    ) {
        let mut allocator = DebtAllocator::open(Loadable::Ready(debts), available, &[], None);
        prop_assume!(index < allocator.rows().len());
        prop_assume!(allocator.can_toggle(index));

        prop_assert_eq!(allocator.toggle_pay_fully(index), Ok(true));
        prop_assert_eq!(allocator.toggle_pay_fully(index), Ok(true));
        prop_assert_eq!(allocator.rows()[index].allocate, Decimal::ZERO);
        prop_assert!(!allocator.rows()[index].pay_fully);
    }
}
