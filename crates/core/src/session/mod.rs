//! Payment editing sessions: rows, allocations and save gating wired together.

pub mod controller;
pub mod error;
pub mod event;


pub use controller::{PaymentSession, SavePayload};
pub use error::SessionError;
pub use event::SessionEvent;
