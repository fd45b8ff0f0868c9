//! Marginal (progressive) tax on a taxable base.
//!
//! The base is split across the brackets of a [`RateTable`] and each slice is
//! taxed at its own bracket's rate. A bracket's upper bound is inclusive, so a
//! base exactly on a boundary is taxed entirely at the lower rates.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use calc_core::calculations::ProgressiveTaxEngine;
//! use calc_core::TaxYearConfig;
//!
//! let config = TaxYearConfig::year_2025();
//! let engine = ProgressiveTaxEngine::new(&config.payroll_brackets);
//!
//! // 90 000 of the base falls into the 12% bracket, the rest into 32%.
//! assert_eq!(engine.apply(dec!(125024.88)), dec!(12407.9616));
//! ```

use rust_decimal::Decimal;
use tracing::warn;

use crate::RateTable;
use crate::calculations::common::{max, non_negative};

/// Applies a [`RateTable`] marginally to a taxable base.
#[derive(Debug, Clone, Copy)]
pub struct ProgressiveTaxEngine<'a> {
    table: &'a RateTable,
}

impl<'a> ProgressiveTaxEngine<'a> {
    pub fn new(table: &'a RateTable) -> Self {
        Self { table }
    }

    /// Tax owed on `taxable_base`, unrounded.
    ///
    /// A negative base is treated as zero.
    pub fn apply(
        &self,
        taxable_base: Decimal,
    ) -> Decimal {
        if taxable_base < Decimal::ZERO {
            warn!(
                taxable_base = %taxable_base,
                "Taxable base is negative; no tax applies"
            );
            return Decimal::ZERO;
        }

        let mut tax = Decimal::ZERO;
        let mut lower = Decimal::ZERO;

        for bracket in self.table.brackets() {
            if taxable_base <= lower {
                break;
            }
            let upper = match bracket.upper_bound {
                Some(bound) => bound.min(taxable_base),
                None => taxable_base,
            };
            tax += (upper - lower) * bracket.rate;
            lower = max(lower, upper);
        }

        tax
    }

    /// Tax attributable to the slice of income between `already_taxed` and
    /// `already_taxed + amount`, as used for year-to-date withholding.
    pub fn apply_increment(
        &self,
        already_taxed: Decimal,
        amount: Decimal,
    ) -> Decimal {
        let start = non_negative(already_taxed);
        let amount = non_negative(amount);
        self.apply(start + amount) - self.apply(start)
    }

    /// Marginal rate applying to the next unit above `taxable_base`.
    pub fn marginal_rate(
        &self,
        taxable_base: Decimal,
    ) -> Decimal {
        self.table
            .brackets()
            .iter()
            .find(|b| b.upper_bound.is_none_or(|bound| taxable_base < bound))
            .map(|b| b.rate)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Applies `brackets` to `taxable_base`; shorthand for [`ProgressiveTaxEngine::apply`].
pub fn apply_brackets(
    taxable_base: Decimal,
    brackets: &RateTable,
) -> Decimal {
    ProgressiveTaxEngine::new(brackets).apply(taxable_base)
}
