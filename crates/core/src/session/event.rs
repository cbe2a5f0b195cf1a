//! Message-passing update loop over a payment session.
//!
//! A presentation layer can drive a session purely through `SessionEvent`s
//! and read back the re-derived summary after each one.

use std::sync::Arc;

use paydesk_shared::types::PaymentRowId;
use serde::{Deserialize, Serialize};

use super::controller::PaymentSession;
use crate::partner::PartnerContext;
use crate::payment::{DerivedSummary, PaymentPatch};

/// A user action on a payment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Append a payment row.
    AddPayment,
    /// Update a payment row.
    UpdatePayment {
        /// Row to update.
        id: PaymentRowId,
        /// Fields to change.
        patch: PaymentPatch,
    },
    /// Remove a payment row.
    RemovePayment {
        /// Row to remove.
        id: PaymentRowId,
    },
    /// Toggle handing back the overpayment as change.
    SetRefundChange {
        /// New flag value.
        refund_change: bool,
    },
    /// Select (or clear) the partner.
    SelectPartner {
        /// The partner, or `None` to clear.
        partner: Option<PartnerContext>,
    },
    /// Drop all debt allocations.
    ClearDebtAllocations,
}

impl PaymentSession {
    /// Applies one event and returns the re-derived summary.
    pub fn dispatch(&mut self, event: SessionEvent) -> Arc<DerivedSummary> {
        match event {
            SessionEvent::AddPayment => {
                self.add_payment();
            }
            SessionEvent::UpdatePayment { id, patch } => {
                self.update_payment(id, patch);
            }
            SessionEvent::RemovePayment { id } => {
                self.remove_payment(id);
            }
            SessionEvent::SetRefundChange { refund_change } => {
                self.set_refund_change(refund_change);
            }
            SessionEvent::SelectPartner { partner } => self.select_partner(partner),
            SessionEvent::ClearDebtAllocations => self.clear_debt_allocations(),
        }
        self.summary()
    }
}
