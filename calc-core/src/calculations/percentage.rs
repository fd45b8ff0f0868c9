//! Elementary percentage formulas.
//!
//! Every function takes the percentage-like operand `a` first and the amount
//! `b` second. Results are not rounded. Zero divisors and results outside the
//! range of [`Decimal`] are reported as [`PercentageError::InvalidInput`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PercentageError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

const OUT_OF_RANGE: PercentageError =
    PercentageError::InvalidInput("result exceeds the representable range");

/// `a`% of `b`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use calc_core::calculations::percentage::part_of_whole;
///
/// assert_eq!(part_of_whole(dec!(20), dec!(150)), Ok(dec!(30)));
/// ```
pub fn part_of_whole(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, PercentageError> {
    a.checked_mul(b)
        .map(|product| product / Decimal::ONE_HUNDRED)
        .ok_or(OUT_OF_RANGE)
}

/// Percentage change from `a` to `b`, relative to `|a|`.
pub fn percent_change(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, PercentageError> {
    if a.is_zero() {
        return Err(PercentageError::InvalidInput("percentage change from zero is undefined"));
    }
    b.checked_sub(a)
        .and_then(|delta| delta.checked_div(a.abs()))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(OUT_OF_RANGE)
}

/// `b` increased by `a`%.
pub fn add_percent(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, PercentageError> {
    b.checked_add(part_of_whole(a, b)?).ok_or(OUT_OF_RANGE)
}

/// `b` decreased by `a`%.
pub fn subtract_percent(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, PercentageError> {
    b.checked_sub(part_of_whole(a, b)?).ok_or(OUT_OF_RANGE)
}

/// What percentage of `a` is `b`.
pub fn ratio_as_percent(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, PercentageError> {
    if a.is_zero() {
        return Err(PercentageError::InvalidInput("ratio to zero is undefined"));
    }
    b.checked_div(a)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(OUT_OF_RANGE)
}

/// Price `b` after an `a`% discount. Same formula as [`subtract_percent`].
pub fn discount(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, PercentageError> {
    subtract_percent(a, b)
}

/// The six formulas by name, for callers that choose one at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PercentageOperation {
    PartOfWhole,
    PercentChange,
    AddPercent,
    SubtractPercent,
    RatioAsPercent,
    Discount,
}

impl PercentageOperation {
    pub const ALL: [PercentageOperation; 6] = [
        PercentageOperation::PartOfWhole,
        PercentageOperation::PercentChange,
        PercentageOperation::AddPercent,
        PercentageOperation::SubtractPercent,
        PercentageOperation::RatioAsPercent,
        PercentageOperation::Discount,
    ];

    /// Applies the formula to `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns [`PercentageError::InvalidInput`] when the formula divides by a
    /// zero `a` or the result does not fit in a [`Decimal`].
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use calc_core::calculations::{PercentageError, PercentageOperation};
    ///
    /// let change = PercentageOperation::PercentChange.apply(dec!(100), dec!(120));
    /// assert_eq!(change, Ok(dec!(20)));
    ///
    /// let ratio = PercentageOperation::RatioAsPercent.apply(dec!(0), dec!(5));
    /// assert!(matches!(ratio, Err(PercentageError::InvalidInput(_))));
    /// ```
    pub fn apply(
        &self,
        a: Decimal,
        b: Decimal,
    ) -> Result<Decimal, PercentageError> {
        match self {
            Self::PartOfWhole => part_of_whole(a, b),
            Self::PercentChange => percent_change(a, b),
            Self::AddPercent => add_percent(a, b),
            Self::SubtractPercent => subtract_percent(a, b),
            Self::RatioAsPercent => ratio_as_percent(a, b),
            Self::Discount => discount(a, b),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PartOfWhole => "part-of-whole",
            Self::PercentChange => "change",
            Self::AddPercent => "add",
            Self::SubtractPercent => "subtract",
            Self::RatioAsPercent => "ratio",
            Self::Discount => "discount",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }
}
