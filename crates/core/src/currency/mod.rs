//! Multi-currency normalization and exchange rate rules.

pub mod conversion;
pub mod exchange;

pub use conversion::{round_for_display, to_local};
pub use exchange::rate_is_consistent;
