//! Self-employed (B2B) income under the three taxation regimes.
//!
//! | Regime      | Tax base        | Tax                           | Health contribution       |
//! |-------------|-----------------|-------------------------------|---------------------------|
//! | Scale       | revenue − costs | brackets on profit × 12, / 12 | 9% of revenue, floored    |
//! | Linear      | revenue − costs | 19% of profit                 | 4.9% of revenue, floored  |
//! | Lump sum    | revenue         | revenue × lump-sum rate       | tier by annual revenue    |
//!
//! Costs are never deducted under the lump-sum regime. The regime with the
//! highest monthly net wins; ties go to the earlier regime in
//! [`TaxRegime::ALL`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use calc_core::calculations::{BusinessTaxComparator, BusinessTaxInput};
//! use calc_core::{ContributorCategory, RevenueFrequency, TaxRegime, TaxYearConfig};
//!
//! let config = TaxYearConfig::year_2025();
//! let comparator = BusinessTaxComparator::new(&config);
//! let input = BusinessTaxInput {
//!     revenue: dec!(15000),
//!     revenue_frequency: RevenueFrequency::Monthly,
//!     monthly_costs: dec!(2000),
//!     lump_sum_rate: dec!(12),
//!     category: ContributorCategory::StandardRate,
//!     voluntary_sickness: false,
//! };
//!
//! let comparison = comparator.compare_regimes(&input).unwrap();
//!
//! assert_eq!(comparison.scale.result.net_amount, dec!(8371.52));
//! assert_eq!(comparison.best, TaxRegime::LumpSumOnRevenue);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::{non_negative, percent_to_rate, round_half_up};
use crate::calculations::contributions::{ContributionResult, ContributionSchedule};
use crate::calculations::progressive_tax::ProgressiveTaxEngine;
use crate::{
    CalculationResult, ContributorCategory, RevenueFrequency, TaxRegime, TaxYearConfig,
    TaxYearConfigError,
};

/// Errors that can occur while comparing regimes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusinessTaxError {
    #[error("invalid tax year configuration: {0}")]
    InvalidConfig(#[from] TaxYearConfigError),

    #[error("lump-sum rate must be between 0 and 100 percent, got {0}")]
    InvalidLumpSumRate(Decimal),
}

/// What the contractor earns and how they are insured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessTaxInput {
    /// Revenue quoted per `revenue_frequency`.
    pub revenue: Decimal,
    pub revenue_frequency: RevenueFrequency,
    pub monthly_costs: Decimal,
    /// Lump-sum rate in percent, e.g. `12` for 12%.
    pub lump_sum_rate: Decimal,
    pub category: ContributorCategory,
    pub voluntary_sickness: bool,
}

/// Monthly outcome of one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeOutcome {
    pub regime: TaxRegime,
    /// `gross_amount` is monthly revenue; `taxable_base` is profit (or revenue
    /// for the lump-sum regime).
    pub result: CalculationResult,
    pub contributions: ContributionResult,
}

/// All three regimes side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeComparison {
    pub scale: RegimeOutcome,
    pub linear: RegimeOutcome,
    pub lump_sum: RegimeOutcome,
    pub best: TaxRegime,
}

impl RegimeComparison {
    pub fn outcome(
        &self,
        regime: TaxRegime,
    ) -> &RegimeOutcome {
        match regime {
            TaxRegime::ProgressiveScale => &self.scale,
            TaxRegime::FlatLinear => &self.linear,
            TaxRegime::LumpSumOnRevenue => &self.lump_sum,
        }
    }

    pub fn best_outcome(&self) -> &RegimeOutcome {
        self.outcome(self.best)
    }
}

/// Compares net income across taxation regimes for one [`TaxYearConfig`].
#[derive(Debug, Clone, Copy)]
pub struct BusinessTaxComparator<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> BusinessTaxComparator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Computes every regime and picks the one with the highest net.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessTaxError::InvalidConfig`] for an invalid
    /// configuration and [`BusinessTaxError::InvalidLumpSumRate`] when the
    /// lump-sum rate is outside 0–100%.
    pub fn compare_regimes(
        &self,
        input: &BusinessTaxInput,
    ) -> Result<RegimeComparison, BusinessTaxError> {
        self.config.validate()?;
        if input.lump_sum_rate < Decimal::ZERO || input.lump_sum_rate > Decimal::ONE_HUNDRED {
            return Err(BusinessTaxError::InvalidLumpSumRate(input.lump_sum_rate));
        }

        let revenue = self.monthly_revenue(input);
        let costs = clamp_amount("monthly_costs", input.monthly_costs);
        let profit = round_half_up(revenue - costs);

        let scale = self.scale(revenue, profit, input);
        let linear = self.linear(revenue, profit, input);
        let lump_sum = self.lump_sum(revenue, input);

        let best = best_regime([
            (scale.regime, scale.result.net_amount),
            (linear.regime, linear.result.net_amount),
            (lump_sum.regime, lump_sum.result.net_amount),
        ]);

        Ok(RegimeComparison {
            scale,
            linear,
            lump_sum,
            best,
        })
    }

    fn monthly_revenue(
        &self,
        input: &BusinessTaxInput,
    ) -> Decimal {
        let revenue = clamp_amount("revenue", input.revenue);
        round_half_up(input.revenue_frequency.to_monthly(
            revenue,
            self.config.working_days_per_month,
            self.config.working_hours_per_day,
        ))
    }

    fn contributions(
        &self,
        revenue: Decimal,
        regime: TaxRegime,
        input: &BusinessTaxInput,
    ) -> ContributionResult {
        ContributionSchedule::new(self.config).compute(
            revenue,
            input.category,
            regime,
            input.voluntary_sickness,
        )
    }

    fn scale(
        &self,
        revenue: Decimal,
        profit: Decimal,
        input: &BusinessTaxInput,
    ) -> RegimeOutcome {
        let contributions = self.contributions(revenue, TaxRegime::ProgressiveScale, input);
        let annual_profit = non_negative(profit) * Decimal::from(12);
        let annual_tax =
            ProgressiveTaxEngine::new(&self.config.business_scale_brackets).apply(annual_profit);
        let tax = round_half_up(annual_tax / Decimal::from(12));

        outcome(TaxRegime::ProgressiveScale, revenue, profit, tax, contributions)
    }

    fn linear(
        &self,
        revenue: Decimal,
        profit: Decimal,
        input: &BusinessTaxInput,
    ) -> RegimeOutcome {
        let contributions = self.contributions(revenue, TaxRegime::FlatLinear, input);
        let tax = round_half_up(non_negative(profit) * self.config.flat_linear_rate);

        outcome(TaxRegime::FlatLinear, revenue, profit, tax, contributions)
    }

    fn lump_sum(
        &self,
        revenue: Decimal,
        input: &BusinessTaxInput,
    ) -> RegimeOutcome {
        let contributions = self.contributions(revenue, TaxRegime::LumpSumOnRevenue, input);
        let tax = round_half_up(revenue * percent_to_rate(input.lump_sum_rate));

        outcome(TaxRegime::LumpSumOnRevenue, revenue, revenue, tax, contributions)
    }
}

fn outcome(
    regime: TaxRegime,
    revenue: Decimal,
    income: Decimal,
    tax: Decimal,
    contributions: ContributionResult,
) -> RegimeOutcome {
    let total_contributions = contributions.total();

    RegimeOutcome {
        regime,
        result: CalculationResult {
            gross_amount: revenue,
            total_contributions,
            taxable_base: non_negative(income),
            tax_amount: tax,
            net_amount: income - tax - total_contributions,
        },
        contributions,
    }
}

/// First regime with the strictly highest net, in the order given.
fn best_regime(nets: [(TaxRegime, Decimal); 3]) -> TaxRegime {
    let mut best = nets[0];
    for candidate in &nets[1..] {
        if candidate.1 > best.1 {
            best = *candidate;
        }
    }
    best.0
}

fn clamp_amount(
    field: &'static str,
    value: Decimal,
) -> Decimal {
    if value < Decimal::ZERO {
        warn!(field, value = %value, "Negative business amount; using zero");
        return Decimal::ZERO;
    }
    value
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;

    /// Initializes tracing subscriber for tests that exercise warning paths.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn input(
        revenue: Decimal,
        costs: Decimal,
        lump_sum_rate: Decimal,
        category: ContributorCategory,
    ) -> BusinessTaxInput {
        BusinessTaxInput {
            revenue,
            revenue_frequency: RevenueFrequency::Monthly,
            monthly_costs: costs,
            lump_sum_rate,
            category,
            voluntary_sickness: false,
        }
    }

    // =========================================================================
    // compare_regimes tests
    // =========================================================================

    #[test]
    fn compare_regimes_standard_rate_all_regimes() {
        let config = TaxYearConfig::year_2025();
        let comparator = BusinessTaxComparator::new(&config);

        let comparison = comparator
            .compare_regimes(&input(dec!(15000), dec!(2000), dec!(12), ContributorCategory::StandardRate))
            .unwrap();

        // Scale: 156 000 annual profit → 22 320 tax → 1 860 per month
        assert_eq!(comparison.scale.contributions.health_contribution, dec!(1350.00));
        assert_eq!(comparison.scale.result.tax_amount, dec!(1860.00));
        assert_eq!(comparison.scale.result.total_contributions, dec!(2768.48));
        assert_eq!(comparison.scale.result.net_amount, dec!(8371.52));

        assert_eq!(comparison.linear.contributions.health_contribution, dec!(735.00));
        assert_eq!(comparison.linear.result.tax_amount, dec!(2470.00));
        assert_eq!(comparison.linear.result.net_amount, dec!(8376.52));

        // 180 000 annual revenue falls in the middle health tier
        assert_eq!(comparison.lump_sum.contributions.health_contribution, dec!(636.51));
        assert_eq!(comparison.lump_sum.result.tax_amount, dec!(1800.00));
        assert_eq!(comparison.lump_sum.result.taxable_base, dec!(15000));
        assert_eq!(comparison.lump_sum.result.net_amount, dec!(11145.01));

        assert_eq!(comparison.best, TaxRegime::LumpSumOnRevenue);
    }

    #[test]
    fn compare_regimes_net_starts_from_profit_except_lump_sum() {
        let config = TaxYearConfig::year_2025();
        let comparator = BusinessTaxComparator::new(&config);
        let costs = dec!(2000);

        let comparison = comparator
            .compare_regimes(&input(dec!(15000), costs, dec!(12), ContributorCategory::StandardRate))
            .unwrap();

        for outcome in [&comparison.scale, &comparison.linear] {
            let result = &outcome.result;
            assert_eq!(result.gross_amount, dec!(15000));
            assert_eq!(
                result.net_amount,
                result.gross_amount - costs - result.total_contributions - result.tax_amount
            );
        }
        let lump_sum = &comparison.lump_sum.result;
        assert_eq!(
            lump_sum.net_amount,
            lump_sum.gross_amount - lump_sum.total_contributions - lump_sum.tax_amount
        );
    }

    #[test]
    fn compare_regimes_high_lump_sum_rate_favours_linear() {
        let config = TaxYearConfig::year_2025();
        let comparator = BusinessTaxComparator::new(&config);

        let comparison = comparator
            .compare_regimes(&input(dec!(15000), dec!(2000), dec!(50), ContributorCategory::StandardRate))
            .unwrap();

        assert_eq!(comparison.lump_sum.result.net_amount, dec!(5445.01));
        assert_eq!(comparison.best, TaxRegime::FlatLinear);
        assert_eq!(comparison.best_outcome().result.net_amount, dec!(8376.52));
    }

    #[test]
    fn compare_regimes_low_income_favours_scale() {
        let config = TaxYearConfig::year_2025();
        let comparator = BusinessTaxComparator::new(&config);

        let comparison = comparator
            .compare_regimes(&input(dec!(5000), dec!(0), dec!(15), ContributorCategory::PreferentialRate))
            .unwrap();

        assert_eq!(comparison.scale.result.tax_amount, dec!(300.00));
        assert_eq!(comparison.scale.result.net_amount, dec!(3918.74));
        // 5 000 × 4.9% is below the minimum
        assert_eq!(comparison.linear.contributions.health_contribution, dec!(381.78));
        assert_eq!(comparison.linear.result.net_amount, dec!(3336.96));
        // Exactly 60 000 a year stays in the lowest tier
        assert_eq!(comparison.lump_sum.contributions.health_contribution, dec!(381.78));
        assert_eq!(comparison.lump_sum.result.net_amount, dec!(3536.96));
        assert_eq!(comparison.best, TaxRegime::ProgressiveScale);
    }

    #[test]
    fn compare_regimes_adds_voluntary_sickness_to_every_regime() {
        let config = TaxYearConfig::year_2025();
        let comparator = BusinessTaxComparator::new(&config);
        let mut with_sickness =
            input(dec!(15000), dec!(2000), dec!(12), ContributorCategory::StandardRate);
        with_sickness.voluntary_sickness = true;

        let comparison = comparator.compare_regimes(&with_sickness).unwrap();

        for regime in TaxRegime::ALL {
            assert_eq!(
                comparison.outcome(regime).contributions.voluntary_sickness_contribution,
                dec!(105.35)
            );
        }
        assert_eq!(comparison.scale.result.net_amount, dec!(8266.17));
    }

    #[test]
    fn compare_regimes_health_only_has_no_social() {
        let config = TaxYearConfig::year_2025();
        let comparator = BusinessTaxComparator::new(&config);

        let comparison = comparator
            .compare_regimes(&input(dec!(15000), dec!(2000), dec!(12), ContributorCategory::HealthOnly))
            .unwrap();

        assert_eq!(comparison.linear.contributions.social_contribution, dec!(0));
        assert_eq!(comparison.linear.result.total_contributions, dec!(735.00));
    }

    #[test]
    fn compare_regimes_converts_hourly_revenue() {
        let config = TaxYearConfig::year_2025();
        let comparator = BusinessTaxComparator::new(&config);
        let mut hourly = input(dec!(100), dec!(0), dec!(12), ContributorCategory::StandardRate);
        hourly.revenue_frequency = RevenueFrequency::Hourly;

        let comparison = comparator.compare_regimes(&hourly).unwrap();

        assert_eq!(comparison.scale.result.gross_amount, dec!(17600));
        assert_eq!(comparison.lump_sum.result.tax_amount, dec!(2112.00));
    }

    #[test]
    fn compare_regimes_costs_above_revenue_clamp_tax() {
        let _guard = init_test_tracing();

        let config = TaxYearConfig::year_2025();
        let comparator = BusinessTaxComparator::new(&config);

        let comparison = comparator
            .compare_regimes(&input(dec!(3000), dec!(5000), dec!(12), ContributorCategory::HealthOnly))
            .unwrap();

        assert_eq!(comparison.scale.result.taxable_base, dec!(0));
        assert_eq!(comparison.scale.result.tax_amount, dec!(0));
        assert_eq!(comparison.linear.result.tax_amount, dec!(0));
        // Loss is carried into net: −2 000 − 381.78
        assert_eq!(comparison.linear.result.net_amount, dec!(-2381.78));
    }

    #[test]
    fn compare_regimes_rejects_lump_sum_rate_above_hundred() {
        let config = TaxYearConfig::year_2025();
        let comparator = BusinessTaxComparator::new(&config);

        let result = comparator.compare_regimes(&input(
            dec!(15000),
            dec!(0),
            dec!(120),
            ContributorCategory::StandardRate,
        ));

        assert_eq!(result, Err(BusinessTaxError::InvalidLumpSumRate(dec!(120))));
    }

    // =========================================================================
    // best_regime tests
    // =========================================================================

    #[test]
    fn best_regime_picks_strict_maximum() {
        let best = best_regime([
            (TaxRegime::ProgressiveScale, dec!(100)),
            (TaxRegime::FlatLinear, dec!(99)),
            (TaxRegime::LumpSumOnRevenue, dec!(101)),
        ]);

        assert_eq!(best, TaxRegime::LumpSumOnRevenue);
    }

    #[test]
    fn best_regime_tie_prefers_scale_over_linear() {
        let best = best_regime([
            (TaxRegime::ProgressiveScale, dec!(100)),
            (TaxRegime::FlatLinear, dec!(100)),
            (TaxRegime::LumpSumOnRevenue, dec!(50)),
        ]);

        assert_eq!(best, TaxRegime::ProgressiveScale);
    }

    #[test]
    fn best_regime_tie_prefers_linear_over_lump_sum() {
        let best = best_regime([
            (TaxRegime::ProgressiveScale, dec!(10)),
            (TaxRegime::FlatLinear, dec!(100)),
            (TaxRegime::LumpSumOnRevenue, dec!(100)),
        ]);

        assert_eq!(best, TaxRegime::FlatLinear);
    }
}
