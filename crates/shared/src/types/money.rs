//! Currency codes accepted on payment rows.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts and rates travel as `rust_decimal::Decimal` alongside a `Currency`.

use serde::{Deserialize, Serialize};

/// Currencies a payment may be entered in.
///
/// `Local` is the transaction's home currency; every other currency is
/// normalized to it through the row's exchange rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// The transaction's home currency.
    #[default]
    Local,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Russian Ruble
    Rub,
}

impl Currency {
    /// Returns true for the home currency.
    #[must_use]
    pub const fn is_local(self) -> bool {
        matches!(self, Self::Local)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "LOCAL"),
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
            Self::Rub => write!(f, "RUB"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOCAL" => Ok(Self::Local),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "RUB" => Ok(Self::Rub),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
