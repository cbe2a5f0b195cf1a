//! Scenario files and the report produced by replaying them.

use paydesk_core::debt::{DebtAllocation, OpenTransaction};
use paydesk_core::partner::{PartnerContext, TransactionMode, TransactionRecord};
use paydesk_core::payment::{DerivedSummary, PaymentLine, SummaryCache};
use paydesk_core::session::{PaymentSession, SessionEvent};
use paydesk_shared::{AppConfig, AppError, AppResult};
use paydesk_shared::types::TransactionId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A payment dialog recorded as JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Direction of the transaction.
    pub mode: TransactionMode,
    /// Id of the transaction being paid; never offered as a debt.
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    /// Totals of the transaction being paid.
    pub transaction: TransactionRecord,
    /// Selected partner.
    #[serde(default)]
    pub partner: Option<PartnerContext>,
    /// Hand back the overpayment as change.
    #[serde(default)]
    pub refund_change: bool,
    /// User actions, replayed in order.
    #[serde(default)]
    pub events: Vec<SessionEvent>,
    /// Partner's open transactions. Absent means still loading.
    #[serde(default)]
    pub open_debts: Option<Vec<OpenTransaction>>,
}

impl Scenario {
    /// Parses a scenario file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `raw` is not a well-formed scenario.
    pub fn from_json(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw).map_err(|err| AppError::Validation(err.to_string()))
    }
}

/// Result of the save attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The session was saveable.
    Saved,
    /// The session was rejected by a save gate.
    Rejected {
        /// Machine-readable reason.
        code: &'static str,
        /// HTTP-style status of the rejection.
        status: u16,
        /// Human-readable reason.
        message: String,
    },
}

/// Printed report of one replayed scenario.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Label of the local currency.
    pub local_currency: String,
    /// Summary rounded for display.
    pub summary: DerivedSummary,
    /// Finalized payment rows.
    pub payments: Vec<PaymentLine>,
    /// Finalized debt allocations.
    pub debt_allocations: Vec<DebtAllocation>,
    /// Reason automatic allocation was refused, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation_error: Option<String>,
    /// Save attempt result.
    pub outcome: SubmitOutcome,
}

/// Replays `scenario` and reports the resulting state.
///
/// With `auto_allocate`, any overpayment is spread over the open debts oldest first.
pub fn run(scenario: Scenario, auto_allocate: bool, config: &AppConfig) -> Report {
    let due = scenario.transaction;
    let mut session = match scenario.partner {
        Some(partner) => PaymentSession::with_partner(scenario.mode, due.outstanding(), partner),
        None => PaymentSession::for_record(scenario.mode, &due),
    }
    .with_cache(SummaryCache::from_config(&config.cache));

    session.set_refund_change(scenario.refund_change);
    for event in scenario.events {
        debug!(?event, "replaying event");
        session.dispatch(event);
    }

    let mut allocation_error = None;
    if auto_allocate && session.summary().overpaid > Decimal::ZERO {
        let mut allocator =
            session.open_debt_allocator(scenario.open_debts.into(), scenario.transaction_id);
        allocator.auto_allocate_oldest();
        if let Err(err) = session.apply_debt_allocations(&allocator) {
            warn!(error = %err, "automatic debt allocation refused");
            allocation_error = Some(err.to_string());
        }
    }

    let outcome = match session.submit() {
        Ok(_) => SubmitOutcome::Saved,
        Err(err) => SubmitOutcome::Rejected {
            code: err.error_code(),
            message: err.to_string(),
            status: AppError::from(err).status_code(),
        },
    };
    info!(?outcome, "scenario replayed");

    Report {
        local_currency: config.engine.local_currency_code.clone(),
        summary: session.summary().rounded(config.engine.display_scale),
        payments: session.build_payment_payload(),
        debt_allocations: session.build_debt_allocation_payload(),
        allocation_error,
        outcome,
    }
}
