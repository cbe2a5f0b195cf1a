//! Debt allocation: retiring open transactions from an overpayment.

pub mod allocator;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use allocator::DebtAllocator;
pub use error::AllocationError;
pub use types::{DebtAllocation, DebtRow, Loadable, OpenTransaction};
