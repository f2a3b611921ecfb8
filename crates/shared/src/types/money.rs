//! Minor-unit money types.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary amounts are `i64` minor units (centavos/cents), matching the
//! `bigint` columns in the payments and ledger schemas.

use serde::{Deserialize, Serialize};

/// A monetary amount in minor units (e.g. centavos).
///
/// Plain `i64` alias rather than a wrapper: amounts cross the SeaORM
/// boundary constantly and the wrapper added nothing but `.0` noise.
/// Signedness matters: ledger entries are signed.
pub type MinorAmount = i64;

/// ISO 4217 currency codes supported by the platform.
///
/// COP is the platform default; the marketplace serves Colombian artisans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Colombian Peso
    Cop,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
}

impl Currency {
    /// Returns the three-letter ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cop => "COP",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::Cop
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "COP" => Ok(Self::Cop),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Cop.to_string(), "COP");
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Eur.to_string(), "EUR");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("COP").unwrap(), Currency::Cop);
        assert_eq!(Currency::from_str("cop").unwrap(), Currency::Cop);
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("EUR").unwrap(), Currency::Eur);

        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_currency_default_is_cop() {
        assert_eq!(Currency::default(), Currency::Cop);
    }

    #[test]
    fn test_currency_serde() {
        assert_eq!(serde_json::to_string(&Currency::Cop).unwrap(), "\"COP\"");
        let parsed: Currency = serde_json::from_str("\"USD\"").unwrap();
        assert_eq!(parsed, Currency::Usd);
    }
}
