//! Core payment reconciliation logic for Paydesk.
//!
//! This crate contains pure business logic with ZERO I/O dependencies.
//! Every computation is synchronous and every derivation is a pure function
//! of its input.
//!
//! # Modules
//!
//! - `payment` - Payment rows, summary derivation and memoization
//! - `debt` - Allocating an overpayment against a partner's open transactions
//! - `session` - One payment editing session wiring rows, allocations and save gates
//! - `partner` - Partner balances and transaction snapshots
//! - `currency` - Local-currency normalization and exchange rate rules

pub mod currency;
pub mod debt;
pub mod partner;
pub mod payment;
pub mod session;
