//! Payment rows and the derived payment summary.
//!
//! This module implements:
//! - Payment row types and partial updates
//! - The row collection with its business defaults
//! - The pure summary calculator and row validation
//! - Memoization of derived summaries

pub mod cache;
pub mod rows;
pub mod summary;
pub mod types;

#[cfg(test)]
mod props;

pub use cache::SummaryCache;
pub use rows::{PaymentRowSet, RowContext};
pub use summary::{
    DerivedSummary, PaidTotal, PaymentSummaryCalculator, RowIssue, SummaryInput, sum_local,
    total_paid, validate_row,
};
pub use types::{PaymentLine, PaymentMethod, PaymentPatch, PaymentRow};
