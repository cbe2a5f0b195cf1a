//! Payment row domain types.
//!
//! A payment row is one line of money entered against the transaction being
//! paid. Rows may be in any supported currency and are normalized to local
//! currency through their exchange rate.

use paydesk_shared::types::{Currency, PaymentRowId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a payment row is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash in hand.
    Cash,
    /// Card terminal.
    Card,
    /// Bank transfer.
    BankTransfer,
    /// Draw-down of the partner's (or the business's) advance balance.
    AccountCredit,
}

impl PaymentMethod {
    /// Every method, in display order.
    pub const ALL: [Self; 4] = [
        Self::Cash,
        Self::Card,
        Self::BankTransfer,
        Self::AccountCredit,
    ];

    /// Returns true if the method draws on existing credit.
    #[must_use]
    pub const fn is_account_credit(self) -> bool {
        matches!(self, Self::AccountCredit)
    }
}

/// A single payment entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentRow {
    /// Identifier, unique within the row set.
    pub id: PaymentRowId,
    /// Amount in `currency`.
    pub amount: Decimal,
    /// Currency the amount is entered in.
    pub currency: Currency,
    /// Rate converting one unit of `currency` into local currency.
    pub exchange_rate: Decimal,
    /// Settlement method.
    pub method: PaymentMethod,
    /// Optional free-form reference (receipt number, transfer id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl PaymentRow {
    /// Creates an empty cash row in local currency.
    #[must_use]
    pub fn cash(id: PaymentRowId) -> Self {
        Self {
            id,
            amount: Decimal::ZERO,
            currency: Currency::Local,
            exchange_rate: Decimal::ONE,
            method: PaymentMethod::Cash,
            reference: None,
        }
    }

    /// Creates an account-credit row drawing `amount` in local currency.
    #[must_use]
    pub fn account_credit(id: PaymentRowId, amount: Decimal) -> Self {
        Self {
            id,
            amount,
            currency: Currency::Local,
            exchange_rate: Decimal::ONE,
            method: PaymentMethod::AccountCredit,
            reference: None,
        }
    }

    /// Amount normalized to local currency, or `None` if it is out of range.
    #[must_use]
    pub fn local_amount(&self) -> Option<Decimal> {
        crate::currency::to_local(self.amount, self.exchange_rate)
    }

    /// Merges a patch into this row, field by field.
    pub fn merge(&mut self, patch: PaymentPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(rate) = patch.exchange_rate {
            self.exchange_rate = rate;
        }
        if let Some(method) = patch.method {
            self.method = method;
        }
        if let Some(reference) = patch.reference {
            self.reference = Some(reference).filter(|r| !r.is_empty());
        }
    }
}

/// Partial update for a payment row. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentPatch {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New currency.
    pub currency: Option<Currency>,
    /// New exchange rate.
    pub exchange_rate: Option<Decimal>,
    /// New method.
    pub method: Option<PaymentMethod>,
    /// New reference; an empty string clears it.
    pub reference: Option<String>,
}

impl PaymentPatch {
    /// Patch setting only the amount.
    #[must_use]
    pub fn amount(amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Patch setting only the method.
    #[must_use]
    pub fn method(method: PaymentMethod) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    /// Patch setting currency and rate together.
    #[must_use]
    pub fn currency(currency: Currency, exchange_rate: Decimal) -> Self {
        Self {
            currency: Some(currency),
            exchange_rate: Some(exchange_rate),
            ..Self::default()
        }
    }
}

/// A finalized payment row as handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLine {
    /// Amount in `currency`.
    pub amount: Decimal,
    /// Currency the amount is entered in.
    pub currency: Currency,
    /// Rate to local currency.
    pub exchange_rate: Decimal,
    /// Settlement method.
    pub method: PaymentMethod,
    /// Optional reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl From<&PaymentRow> for PaymentLine {
    fn from(row: &PaymentRow) -> Self {
        Self {
            amount: row.amount,
            currency: row.currency,
            exchange_rate: row.exchange_rate,
            method: row.method,
            reference: row.reference.clone(),
        }
    }
}
