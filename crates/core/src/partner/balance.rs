//! Partner balance snapshot and mode-dependent selection rules.
//!
//! The same balance is read differently for a sale and a supply:
//! - Sale: the partner is a customer, `partner_advance` is usable credit and
//!   `receivable_debt` is what they already owe the business
//! - Supply: the partner is a supplier, `company_advance` is usable credit and
//!   `payable_debt` is what the business already owes them

use paydesk_shared::types::PartnerId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of the transaction being paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    /// The business sells to the partner.
    Sale,
    /// The partner supplies the business.
    Supply,
}

/// Read-only snapshot of a partner's running balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnerBalance {
    /// Net running balance.
    pub total: Decimal,
    /// Credit the partner has prepaid to the business.
    pub partner_advance: Decimal,
    /// Credit the business has prepaid to the partner.
    pub company_advance: Decimal,
    /// Open debt the business owes the partner.
    pub payable_debt: Decimal,
    /// Open debt the partner owes the business.
    pub receivable_debt: Decimal,
}

impl PartnerBalance {
    /// Advance balance usable toward a transaction in `mode`.
    #[must_use]
    pub const fn advance_for(&self, mode: TransactionMode) -> Decimal {
        match mode {
            TransactionMode::Sale => self.partner_advance,
            TransactionMode::Supply => self.company_advance,
        }
    }

    /// Pre-existing open debt relevant to a transaction in `mode`.
    #[must_use]
    pub const fn debt_for(&self, mode: TransactionMode) -> Decimal {
        match mode {
            TransactionMode::Sale => self.receivable_debt,
            TransactionMode::Supply => self.payable_debt,
        }
    }
}

/// The partner selected for the editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerContext {
    /// Partner identifier.
    pub id: PartnerId,
    /// Balance snapshot supplied by the partner store.
    pub balance: PartnerBalance,
}

impl PartnerContext {
    /// Creates a new partner context.
    #[must_use]
    pub const fn new(id: PartnerId, balance: PartnerBalance) -> Self {
        Self { id, balance }
    }
}
