//! Multi-year investment projection with periodic contributions.
//!
//! Each year is split into compounding sub-periods. In every sub-period the
//! pro-rated share of that year's contributions is added first, then the
//! balance grows by `annual_return_rate / periods`. A contribution therefore
//! earns interest only from the sub-period in which it is paid.
//!
//! The running balance is carried unrounded; only reported figures are
//! rounded, and interest is always reported as `balance − principal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Frequency;
use crate::calculations::common::round_half_up;

/// Errors returned for inputs that cannot be projected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("{name} must be non-negative, got {value}")]
    NegativeAmount { name: &'static str, value: Decimal },

    #[error("annual return rate must be non-negative, got {0}")]
    NegativeRate(Decimal),

    #[error("balance exceeds the representable range in year {year}")]
    Overflow { year: u32 },
}

/// Inputs for a projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentParams {
    pub initial_amount: Decimal,
    /// Amount paid every `contribution_frequency` period.
    pub periodic_contribution: Decimal,
    pub contribution_frequency: Frequency,
    /// Annual rate as a fraction, e.g. `0.07` for 7%.
    pub annual_return_rate: Decimal,
    pub compounding_frequency: Frequency,
    pub duration_years: u32,
}

/// Position at the end of one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyProjectionRow {
    pub period: u32,
    pub cumulative_principal: Decimal,
    pub cumulative_interest: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub final_balance: Decimal,
    /// Includes the initial amount.
    pub total_contributed: Decimal,
    pub total_interest: Decimal,
    pub yearly_data: Vec<YearlyProjectionRow>,
}

/// Projects investment growth year by year.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundGrowthProjector;

impl CompoundGrowthProjector {
    pub fn new() -> Self {
        Self
    }

    /// Runs the projection for `params.duration_years` years.
    ///
    /// A zero duration yields no rows and a final balance equal to the
    /// initial amount.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] if an amount or the return rate is negative,
    /// or if the balance grows beyond what [`Decimal`] can hold.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use calc_core::calculations::{CompoundGrowthProjector, InvestmentParams};
    /// use calc_core::Frequency;
    ///
    /// let params = InvestmentParams {
    ///     initial_amount: dec!(1000),
    ///     periodic_contribution: dec!(0),
    ///     contribution_frequency: Frequency::Monthly,
    ///     annual_return_rate: dec!(0.10),
    ///     compounding_frequency: Frequency::Annual,
    ///     duration_years: 2,
    /// };
    ///
    /// let result = CompoundGrowthProjector::new().project(&params).unwrap();
    ///
    /// assert_eq!(result.final_balance, dec!(1210.00));
    /// assert_eq!(result.total_interest, dec!(210.00));
    /// assert_eq!(result.yearly_data.len(), 2);
    /// ```
    pub fn project(
        &self,
        params: &InvestmentParams,
    ) -> Result<ProjectionResult, ProjectionError> {
        validate(params)?;

        let periods = params.compounding_frequency.periods_per_year();
        let periods_decimal = Decimal::from(periods);
        let growth = params
            .annual_return_rate
            .checked_div(periods_decimal)
            .and_then(|rate| rate.checked_add(Decimal::ONE))
            .ok_or(ProjectionError::Overflow { year: 1 })?;
        let yearly_contributions = params
            .periodic_contribution
            .checked_mul(Decimal::from(params.contribution_frequency.periods_per_year()))
            .ok_or(ProjectionError::Overflow { year: 1 })?;
        let contribution_per_period = yearly_contributions / periods_decimal;

        let mut balance = params.initial_amount;
        let mut principal = params.initial_amount;
        let mut yearly_data = Vec::with_capacity(params.duration_years as usize);

        for year in 1..=params.duration_years {
            for _ in 0..periods {
                balance = balance
                    .checked_add(contribution_per_period)
                    .and_then(|b| b.checked_mul(growth))
                    .ok_or(ProjectionError::Overflow { year })?;
            }
            principal = principal
                .checked_add(yearly_contributions)
                .ok_or(ProjectionError::Overflow { year })?;

            yearly_data.push(row(year, principal, balance));
        }

        let final_balance = round_half_up(balance);
        let total_contributed = round_half_up(principal);

        Ok(ProjectionResult {
            final_balance,
            total_contributed,
            total_interest: final_balance - total_contributed,
            yearly_data,
        })
    }
}

fn row(
    period: u32,
    principal: Decimal,
    balance: Decimal,
) -> YearlyProjectionRow {
    let balance = round_half_up(balance);
    let cumulative_principal = round_half_up(principal);

    YearlyProjectionRow {
        period,
        cumulative_principal,
        cumulative_interest: balance - cumulative_principal,
        balance,
    }
}

fn validate(params: &InvestmentParams) -> Result<(), ProjectionError> {
    for (name, value) in [
        ("initial_amount", params.initial_amount),
        ("periodic_contribution", params.periodic_contribution),
    ] {
        if value < Decimal::ZERO {
            return Err(ProjectionError::NegativeAmount { name, value });
        }
    }
    if params.annual_return_rate < Decimal::ZERO {
        return Err(ProjectionError::NegativeRate(params.annual_return_rate));
    }
    Ok(())
}
