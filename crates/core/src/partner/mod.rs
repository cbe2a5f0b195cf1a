//! Partner balances and the transaction being paid.

pub mod balance;
pub mod record;

pub use balance::{PartnerBalance, PartnerContext, TransactionMode};
pub use record::{PaymentStatus, TransactionRecord};
