//! Monetary amounts and posting budgets.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount as reported by the marketplace.
///
/// Any part may be missing; `display` is the server-formatted string
/// (e.g. `"$30.00"`) and is preferred for human output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub display: Option<String>,
}

impl Money {
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            currency: Some("USD".into()),
            display: None,
        }
    }

    /// True when the amount is known and strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount.is_some_and(|a| a > Decimal::ZERO)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.display, self.amount) {
            (Some(display), _) if !display.is_empty() => write!(f, "{display}"),
            (_, Some(amount)) => write!(f, "${}", amount.normalize()),
            _ => write!(f, "N/A"),
        }
    }
}

/// How a posting pays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Budget {
    /// Hourly engagement with an optional rate range.
    Hourly {
        min: Option<Money>,
        max: Option<Money>,
    },
    /// Fixed-price engagement.
    Fixed(Money),
    /// No budget information was provided.
    #[default]
    Unspecified,
}

impl Budget {
    /// Classify raw budget fields.
    ///
    /// An hourly bound with a positive amount wins over a fixed amount, since
    /// the marketplace reports a zero fixed amount on hourly postings.
    #[must_use]
    pub fn classify(
        hourly_min: Option<Money>,
        hourly_max: Option<Money>,
        fixed: Option<Money>,
    ) -> Self {
        let hourly_min = hourly_min.filter(Money::is_positive);
        let hourly_max = hourly_max.filter(Money::is_positive);
        if hourly_min.is_some() || hourly_max.is_some() {
            return Budget::Hourly {
                min: hourly_min,
                max: hourly_max,
            };
        }
        match fixed.filter(Money::is_positive) {
            Some(amount) => Budget::Fixed(amount),
            None => Budget::Unspecified,
        }
    }

    #[must_use]
    pub fn is_hourly(&self) -> bool {
        matches!(self, Budget::Hourly { .. })
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Budget::Hourly {
                min: Some(min),
                max: Some(max),
            } if min.amount != max.amount => write!(f, "Hourly: {min} - {max}"),
            Budget::Hourly { min: Some(rate), .. } | Budget::Hourly { max: Some(rate), .. } => {
                write!(f, "Hourly: {rate}")
            }
            Budget::Hourly { .. } => write!(f, "Hourly"),
            Budget::Fixed(amount) => write!(f, "Fixed: {amount}"),
            Budget::Unspecified => write!(f, "Not specified"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn hourly_bounds_take_precedence_over_zero_fixed_amount() {
        let budget = Budget::classify(
            Some(Money::new(dec!(30))),
            Some(Money::new(dec!(60))),
            Some(Money::new(dec!(0))),
        );
        assert!(budget.is_hourly());
        assert_eq!(budget.to_string(), "Hourly: $30 - $60");
    }

    #[test]
    fn positive_fixed_amount_without_hourly_is_fixed() {
        let budget = Budget::classify(None, Some(Money::new(dec!(0))), Some(Money::new(dec!(750))));
        assert_eq!(budget, Budget::Fixed(Money::new(dec!(750))));
        assert_eq!(budget.to_string(), "Fixed: $750");
    }

    #[test]
    fn nothing_positive_is_unspecified() {
        assert_eq!(Budget::classify(None, None, None), Budget::Unspecified);
        assert_eq!(
            Budget::classify(None, None, Some(Money::default())),
            Budget::Unspecified
        );
    }

    #[test]
    fn display_prefers_server_formatting() {
        let money = Money {
            amount: Some(dec!(1500)),
            currency: Some("USD".into()),
            display: Some("$1,500.00".into()),
        };
        assert_eq!(money.to_string(), "$1,500.00");
        assert_eq!(Money::default().to_string(), "N/A");
    }
}
