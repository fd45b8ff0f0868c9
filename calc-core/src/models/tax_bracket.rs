use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One marginal bracket: income up to and including `upper_bound` is taxed at `rate`.
///
/// `upper_bound` of `None` marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn bounded(
        upper_bound: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Self {
            upper_bound: None,
            rate,
        }
    }
}

/// Errors raised when a bracket table breaks its ordering rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateTableError {
    #[error("rate table has no brackets")]
    Empty,

    #[error("bracket bound {bound} must exceed the previous bound {previous}")]
    NonIncreasingBound { previous: Decimal, bound: Decimal },

    #[error("bracket bound must be positive, got {0}")]
    NonPositiveBound(Decimal),

    #[error("only the last bracket may be unbounded (bracket {0})")]
    UnboundedBeforeLast(usize),

    #[error("last bracket must be unbounded")]
    BoundedLast,

    #[error("bracket rate must be non-negative, got {0}")]
    NegativeRate(Decimal),
}

/// An ordered, validated sequence of marginal brackets.
///
/// Bounds are strictly increasing and the last bracket is unbounded.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use calc_core::{RateTable, TaxBracket};
///
/// let table = RateTable::new(vec![
///     TaxBracket::bounded(dec!(30000), dec!(0)),
///     TaxBracket::bounded(dec!(120000), dec!(0.12)),
///     TaxBracket::unbounded(dec!(0.32)),
/// ])
/// .unwrap();
///
/// assert_eq!(table.brackets().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct RateTable {
    brackets: Vec<TaxBracket>,
}

impl RateTable {
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, RateTableError> {
        if brackets.is_empty() {
            return Err(RateTableError::Empty);
        }

        let last = brackets.len() - 1;
        let mut previous: Option<Decimal> = None;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO {
                return Err(RateTableError::NegativeRate(bracket.rate));
            }
            match bracket.upper_bound {
                None if index != last => return Err(RateTableError::UnboundedBeforeLast(index)),
                None => {}
                Some(_) if index == last => return Err(RateTableError::BoundedLast),
                Some(bound) => {
                    if bound <= Decimal::ZERO {
                        return Err(RateTableError::NonPositiveBound(bound));
                    }
                    if let Some(previous) = previous {
                        if bound <= previous {
                            return Err(RateTableError::NonIncreasingBound { previous, bound });
                        }
                    }
                    previous = Some(bound);
                }
            }
        }

        Ok(Self { brackets })
    }

    /// Builds a table from built-in constants that are known to be ordered.
    pub(crate) fn from_ordered(brackets: Vec<TaxBracket>) -> Self {
        debug_assert!(Self::new(brackets.clone()).is_ok());
        Self { brackets }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Bound of the last bounded bracket, i.e. where the top rate starts.
    pub fn top_threshold(&self) -> Option<Decimal> {
        self.brackets.iter().rev().find_map(|b| b.upper_bound)
    }
}

impl TryFrom<Vec<TaxBracket>> for RateTable {
    type Error = RateTableError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<RateTable> for Vec<TaxBracket> {
    fn from(table: RateTable) -> Self {
        table.brackets
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn accepts_single_unbounded_bracket() {
        let table = RateTable::new(vec![TaxBracket::unbounded(dec!(0.19))]).unwrap();

        assert_eq!(table.brackets().len(), 1);
        assert_eq!(table.top_threshold(), None);
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(RateTable::new(vec![]), Err(RateTableError::Empty));
    }

    #[test]
    fn rejects_equal_bounds() {
        let result = RateTable::new(vec![
            TaxBracket::bounded(dec!(30000), dec!(0)),
            TaxBracket::bounded(dec!(30000), dec!(0.12)),
            TaxBracket::unbounded(dec!(0.32)),
        ]);

        assert_eq!(
            result,
            Err(RateTableError::NonIncreasingBound {
                previous: dec!(30000),
                bound: dec!(30000),
            })
        );
    }

    #[test]
    fn rejects_bounded_last_bracket() {
        let result = RateTable::new(vec![
            TaxBracket::bounded(dec!(30000), dec!(0)),
            TaxBracket::bounded(dec!(120000), dec!(0.12)),
        ]);

        assert_eq!(result, Err(RateTableError::BoundedLast));
    }

    #[test]
    fn rejects_unbounded_bracket_in_the_middle() {
        let result = RateTable::new(vec![
            TaxBracket::unbounded(dec!(0.12)),
            TaxBracket::unbounded(dec!(0.32)),
        ]);

        assert_eq!(result, Err(RateTableError::UnboundedBeforeLast(0)));
    }

    #[test]
    fn rejects_negative_rate() {
        let result = RateTable::new(vec![TaxBracket::unbounded(dec!(-0.01))]);

        assert_eq!(result, Err(RateTableError::NegativeRate(dec!(-0.01))));
    }

    #[test]
    fn top_threshold_is_last_bounded_bound() {
        let table = RateTable::new(vec![
            TaxBracket::bounded(dec!(30000), dec!(0)),
            TaxBracket::bounded(dec!(120000), dec!(0.12)),
            TaxBracket::unbounded(dec!(0.32)),
        ])
        .unwrap();

        assert_eq!(table.top_threshold(), Some(dec!(120000)));
    }
}
