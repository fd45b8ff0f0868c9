//! Tax-advantaged retirement accounts (IKE and IKZE).
//!
//! Both accounts cap the yearly contribution at the statutory limit, project
//! it with [`CompoundGrowthProjector`] (paid at the start of each year,
//! compounded annually) and derive a monthly pension over the payout period.
//!
//! | Account | Limit (2025) | Tax benefit                                    |
//! |---------|--------------|------------------------------------------------|
//! | IKE     | 26 019.00    | No capital-gains tax on withdrawal             |
//! | IKZE    | 10 407.60    | Contributions deducted from income every year  |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::round_half_up;
use crate::calculations::compound_growth::{
    CompoundGrowthProjector, InvestmentParams, ProjectionError, ProjectionResult,
};
use crate::calculations::progressive_tax::ProgressiveTaxEngine;
use crate::{Frequency, TaxYearConfig, TaxYearConfigError};

/// Errors that can occur in retirement account projections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetirementError {
    #[error("invalid tax year configuration: {0}")]
    InvalidConfig(#[from] TaxYearConfigError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("payout period must be at least one year")]
    ZeroPayoutYears,

    #[error("monthly salary must be non-negative, got {0}")]
    NegativeSalary(Decimal),
}

/// Saving plan shared by both account types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementPlan {
    pub current_age: u32,
    /// Age at which payouts start; saving ends the year before.
    pub payout_age: u32,
    /// Amount paid every `contribution_frequency` period.
    pub contribution: Decimal,
    pub contribution_frequency: Frequency,
    /// Annual rate as a fraction.
    pub annual_return_rate: Decimal,
    pub payout_years: u32,
    /// Gross monthly salary, used for the public pension comparison.
    pub monthly_salary: Decimal,
}

pub type IkeInput = RetirementPlan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IkzeInput {
    pub plan: RetirementPlan,
    /// Rate at which contributions reduce income tax. `None` uses the payroll
    /// marginal rate of the plan's annual salary, but never less than the
    /// lowest positive rate of the payroll table.
    pub marginal_tax_rate: Option<Decimal>,
}

/// Figures common to both accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementProjection {
    pub years: u32,
    /// Yearly contribution after applying the limit.
    pub annual_contribution: Decimal,
    pub contribution_capped: bool,
    pub growth: ProjectionResult,
    pub monthly_pension: Decimal,
    pub profit: Decimal,
    pub profit_percentage: Decimal,
    pub estimated_public_pension: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IkeResult {
    pub projection: RetirementProjection,
    /// Capital-gains tax that would be due on the same profit outside IKE.
    pub capital_gains_tax_avoided: Decimal,
    /// Payout age is below the minimum for a tax-free withdrawal.
    pub early_payout_warning: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IkzeResult {
    pub projection: RetirementProjection,
    pub relief_rate: Decimal,
    pub annual_tax_relief: Decimal,
    pub total_tax_relief: Decimal,
}

/// Projects IKE and IKZE savings for one [`TaxYearConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RetirementAccountCalculator<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> RetirementAccountCalculator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Projects an IKE account.
    ///
    /// # Errors
    ///
    /// Returns [`RetirementError`] for an invalid configuration, negative
    /// amounts, or a zero payout period.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use calc_core::calculations::{RetirementAccountCalculator, RetirementPlan};
    /// use calc_core::{Frequency, TaxYearConfig};
    ///
    /// let config = TaxYearConfig::year_2025();
    /// let plan = RetirementPlan {
    ///     current_age: 60,
    ///     payout_age: 62,
    ///     contribution: dec!(1000),
    ///     contribution_frequency: Frequency::Monthly,
    ///     annual_return_rate: dec!(0.05),
    ///     payout_years: 10,
    ///     monthly_salary: dec!(6000),
    /// };
    ///
    /// let result = RetirementAccountCalculator::new(&config).ike(&plan).unwrap();
    ///
    /// assert_eq!(result.projection.growth.final_balance, dec!(25830.00));
    /// assert_eq!(result.projection.monthly_pension, dec!(215.25));
    /// ```
    pub fn ike(
        &self,
        input: &IkeInput,
    ) -> Result<IkeResult, RetirementError> {
        self.config.validate()?;

        let projection = self.project(input, self.config.ike_annual_limit, "IKE")?;
        let capital_gains_tax_avoided =
            round_half_up(projection.growth.total_interest * self.config.capital_gains_rate);

        Ok(IkeResult {
            projection,
            capital_gains_tax_avoided,
            early_payout_warning: input.payout_age < self.config.ike_min_payout_age,
        })
    }

    /// Projects an IKZE account with its yearly income tax relief.
    ///
    /// # Errors
    ///
    /// Returns [`RetirementError`] for an invalid configuration, negative
    /// amounts, or a zero payout period.
    pub fn ikze(
        &self,
        input: &IkzeInput,
    ) -> Result<IkzeResult, RetirementError> {
        self.config.validate()?;

        let projection = self.project(&input.plan, self.config.ikze_annual_limit, "IKZE")?;
        let relief_rate = input
            .marginal_tax_rate
            .unwrap_or_else(|| self.default_relief_rate(input.plan.monthly_salary));
        let annual_tax_relief = round_half_up(projection.annual_contribution * relief_rate);

        Ok(IkzeResult {
            total_tax_relief: annual_tax_relief * Decimal::from(projection.years),
            annual_tax_relief,
            relief_rate,
            projection,
        })
    }

    fn project(
        &self,
        plan: &RetirementPlan,
        annual_limit: Decimal,
        account: &'static str,
    ) -> Result<RetirementProjection, RetirementError> {
        if plan.payout_years == 0 {
            return Err(RetirementError::ZeroPayoutYears);
        }
        if plan.monthly_salary < Decimal::ZERO {
            return Err(RetirementError::NegativeSalary(plan.monthly_salary));
        }

        let requested = plan
            .contribution
            .saturating_mul(Decimal::from(plan.contribution_frequency.periods_per_year()));
        let contribution_capped = requested > annual_limit;
        let annual_contribution = if contribution_capped {
            warn!(
                account,
                requested = %requested,
                limit = %annual_limit,
                "Yearly contribution exceeds the statutory limit; capping"
            );
            annual_limit
        } else {
            requested
        };

        let years = plan.payout_age.saturating_sub(plan.current_age);
        let growth = CompoundGrowthProjector::new().project(&InvestmentParams {
            initial_amount: Decimal::ZERO,
            periodic_contribution: annual_contribution,
            contribution_frequency: Frequency::Annual,
            annual_return_rate: plan.annual_return_rate,
            compounding_frequency: Frequency::Annual,
            duration_years: years,
        })?;

        let profit = growth.total_interest;
        let profit_percentage = if growth.total_contributed > Decimal::ZERO {
            round_half_up(profit / growth.total_contributed * Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };
        let payout_months = Decimal::from(plan.payout_years) * Decimal::from(12);
        let monthly_pension = round_half_up(growth.final_balance / payout_months);

        Ok(RetirementProjection {
            years,
            annual_contribution,
            contribution_capped,
            monthly_pension,
            profit,
            profit_percentage,
            estimated_public_pension: round_half_up(
                plan.monthly_salary * self.config.public_pension_replacement_rate,
            ),
            growth,
        })
    }

    fn default_relief_rate(
        &self,
        monthly_salary: Decimal,
    ) -> Decimal {
        let annual_salary = monthly_salary.saturating_mul(Decimal::from(12));
        ProgressiveTaxEngine::new(&self.config.payroll_brackets)
            .marginal_rate(annual_salary)
            .max(self.lowest_positive_payroll_rate())
    }

    fn lowest_positive_payroll_rate(&self) -> Decimal {
        self.config
            .payroll_brackets
            .brackets()
            .iter()
            .map(|b| b.rate)
            .find(|rate| *rate > Decimal::ZERO)
            .unwrap_or(Decimal::ZERO)
    }
}
