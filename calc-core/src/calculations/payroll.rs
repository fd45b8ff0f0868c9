//! Payroll calculations: gross to net salary and back.
//!
//! # Gross to net
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Social contribution for the contributor category |
//! | 2    | Taxable base: gross − social (rounded) |
//! | 3    | Health contribution: 9% of taxable base, floored at the minimum |
//! | 4    | Cost-of-income allowance (remote or commuting) |
//! | 5    | Annualised base × rate table, divided back to a month |
//! | 6    | Tax credits (300 per credit), floored at zero |
//! | 7    | Employee PPK contribution (2% of gross) if opted in |
//! | 8    | Net: gross − social − health − tax − PPK |
//!
//! Taxpayers under 26 pay no income tax.
//!
//! # Net to gross
//!
//! There is no closed form, so [`PayrollConverter::net_to_gross`] iterates
//! `gross ← gross × net / net(gross)` from `net × 1.4`, stopping when the
//! computed net is within one grosz of the target or after 100 iterations.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use calc_core::calculations::{PayrollConverter, PayrollOptions};
//! use calc_core::{ContributorCategory, TaxYearConfig};
//!
//! let config = TaxYearConfig::year_2025();
//! let converter = PayrollConverter::new(&config);
//! let options = PayrollOptions {
//!     category: ContributorCategory::PreferentialRate,
//!     over_26: true,
//!     remote_work_cost_allowance: true,
//!     tax_credit_count: 1,
//!     ppk_opt_in: false,
//! };
//!
//! let result = converter.gross_to_net(dec!(11000), &options).unwrap();
//!
//! assert_eq!(result.result.taxable_base, dec!(10668.74));
//! assert_eq!(result.health_contribution, dec!(960.19));
//! assert_eq!(result.result.tax_amount, dec!(734.00));
//! assert_eq!(result.result.net_amount, dec!(8974.55));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{non_negative, round_half_up};
use crate::calculations::contributions::{ContributionSchedule, SocialContributionBreakdown};
use crate::calculations::progressive_tax::ProgressiveTaxEngine;
use crate::{CalculationResult, ContributorCategory, TaxRegime, TaxYearConfig, TaxYearConfigError};

const MAX_ITERATIONS: u32 = 100;
const TOLERANCE: Decimal = dec!(0.01);
const GROSZ: Decimal = dec!(0.01);
const INITIAL_GROSS_FACTOR: Decimal = dec!(1.4);
const MONTHS_PER_YEAR: u32 = 12;
const UNSTABLE_SALARY_MONTHLY_DECAY: Decimal = dec!(0.005);

/// Errors that can occur during payroll calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollError {
    #[error("invalid tax year configuration: {0}")]
    InvalidConfig(#[from] TaxYearConfigError),
}

/// Employee-side switches that change the payroll outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollOptions {
    pub category: ContributorCategory,
    /// Under-26 employees are exempt from income tax.
    pub over_26: bool,
    /// Lower (remote/local) cost-of-income allowance instead of the commuting one.
    pub remote_work_cost_allowance: bool,
    pub tax_credit_count: u32,
    pub ppk_opt_in: bool,
}

impl Default for PayrollOptions {
    fn default() -> Self {
        Self {
            category: ContributorCategory::Employee,
            over_26: true,
            remote_work_cost_allowance: true,
            tax_credit_count: 1,
            ppk_opt_in: false,
        }
    }
}

/// Result of a gross to net conversion with every intermediate amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossToNetResult {
    /// Summary; `total_contributions` is social + health + PPK.
    pub result: CalculationResult,
    pub social: SocialContributionBreakdown,
    pub health_contribution: Decimal,
    /// Allowance deducted before tax; zero when tax-exempt.
    pub cost_of_income: Decimal,
    pub annual_tax_base: Decimal,
    pub tax_before_credits: Decimal,
    pub tax_credit: Decimal,
    pub ppk_contribution: Decimal,
}

/// Result of a net to gross search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetToGrossResult {
    pub gross: Decimal,
    /// Net salary actually produced by `gross`.
    pub achieved_net: Decimal,
    pub iterations: u32,
    /// False when the iteration cap was hit; `gross` is then the best guess.
    pub converged: bool,
}

/// Employer-side options for [`PayrollConverter::employer_cost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerCostOptions {
    /// Accident insurance rate as a fraction; `None` uses the configured default.
    pub accident_rate: Option<Decimal>,
    pub guaranteed_benefits_fund: bool,
    pub ppk_opt_in: bool,
}

impl Default for EmployerCostOptions {
    fn default() -> Self {
        Self {
            accident_rate: None,
            guaranteed_benefits_fund: true,
            ppk_opt_in: false,
        }
    }
}

/// Contributions the employer pays on top of gross salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerCost {
    pub gross: Decimal,
    pub retirement: Decimal,
    pub disability: Decimal,
    pub accident: Decimal,
    pub labour_fund: Decimal,
    pub guaranteed_benefits_fund: Decimal,
    pub ppk: Decimal,
    pub total_contributions: Decimal,
    pub total_cost: Decimal,
}

/// One month of a year-to-date payroll schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBreakdownRow {
    pub month: u32,
    pub gross: Decimal,
    pub social: Decimal,
    pub health: Decimal,
    pub taxable_base: Decimal,
    pub tax: Decimal,
    pub ppk: Decimal,
    pub net: Decimal,
}

/// Twelve monthly rows with yearly totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualBreakdown {
    pub months: Vec<MonthlyBreakdownRow>,
    pub total_gross: Decimal,
    pub total_social: Decimal,
    pub total_health: Decimal,
    pub total_tax: Decimal,
    pub total_ppk: Decimal,
    pub total_net: Decimal,
}

/// Converts between gross and net salary for one [`TaxYearConfig`].
#[derive(Debug, Clone, Copy)]
pub struct PayrollConverter<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> PayrollConverter<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Converts a monthly gross salary into net pay.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::InvalidConfig`] if the configuration is invalid.
    pub fn gross_to_net(
        &self,
        gross: Decimal,
        options: &PayrollOptions,
    ) -> Result<GrossToNetResult, PayrollError> {
        self.config.validate()?;
        Ok(self.calculate_net(gross, options))
    }

    /// Finds the monthly gross salary that yields `net`.
    ///
    /// The gross is rounded to whole grosze and `converged` reports whether
    /// the net of that rounded gross lies within 0.01 of `net`. Non-convergence
    /// is not an error: the closest gross found is returned with `converged`
    /// set to `false`.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::InvalidConfig`] if the configuration is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use calc_core::calculations::{PayrollConverter, PayrollOptions};
    /// use calc_core::TaxYearConfig;
    ///
    /// let config = TaxYearConfig::year_2025();
    /// let converter = PayrollConverter::new(&config);
    /// let options = PayrollOptions::default();
    ///
    /// let net = converter.gross_to_net(dec!(8000), &options).unwrap().result.net_amount;
    /// let found = converter.net_to_gross(net, &options).unwrap();
    ///
    /// assert!((found.gross - dec!(8000)).abs() < dec!(1));
    /// ```
    pub fn net_to_gross(
        &self,
        net: Decimal,
        options: &PayrollOptions,
    ) -> Result<NetToGrossResult, PayrollError> {
        self.config.validate()?;

        if net <= Decimal::ZERO {
            warn!(net = %net, "Target net salary is not positive; returning zero gross");
            return Ok(NetToGrossResult {
                gross: Decimal::ZERO,
                achieved_net: self.net_amount(Decimal::ZERO, options),
                iterations: 0,
                converged: false,
            });
        }

        let mut guess = net * INITIAL_GROSS_FACTOR;
        let mut calculated = self.net_amount(guess, options);
        let mut best = (guess, (calculated - net).abs());
        let mut iterations = 0;

        while (calculated - net).abs() >= TOLERANCE && iterations < MAX_ITERATIONS {
            guess = if calculated > Decimal::ZERO {
                guess * (net / calculated)
            } else {
                // Fixed minimums swallow the whole salary; move out of that region first.
                guess * Decimal::TWO
            };
            calculated = self.net_amount(guess, options);
            iterations += 1;

            let distance = (calculated - net).abs();
            if distance < best.1 {
                best = (guess, distance);
            }
            debug!(iteration = iterations, guess = %guess, calculated = %calculated, "net to gross step");
        }

        let gross = self.closest_rounded_gross(best.0, net, options);
        let achieved_net = self.net_amount(gross, options);
        let converged = (achieved_net - net).abs() < TOLERANCE;
        if !converged {
            warn!(
                target_net = %net,
                best_gross = %gross,
                achieved_net = %achieved_net,
                iterations,
                "Net to gross search did not converge; returning best guess"
            );
        }

        Ok(NetToGrossResult {
            gross,
            achieved_net,
            iterations,
            converged,
        })
    }

    /// Rounds `gross` to grosze, moving one grosz either way when that lands
    /// closer to `net`.
    fn closest_rounded_gross(
        &self,
        gross: Decimal,
        net: Decimal,
        options: &PayrollOptions,
    ) -> Decimal {
        let rounded = round_half_up(gross);
        [rounded, rounded - GROSZ, rounded + GROSZ]
            .into_iter()
            .filter(|candidate| *candidate >= Decimal::ZERO)
            .min_by_key(|candidate| (self.net_amount(*candidate, options) - net).abs())
            .unwrap_or(rounded)
    }

    /// Calculates what the employer pays for a monthly gross salary.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::InvalidConfig`] if the configuration is invalid.
    pub fn employer_cost(
        &self,
        gross: Decimal,
        options: &EmployerCostOptions,
    ) -> Result<EmployerCost, PayrollError> {
        self.config.validate()?;

        let gross = non_negative(gross);
        let accident_rate = options
            .accident_rate
            .unwrap_or(self.config.default_accident_rate);

        let retirement = round_half_up(gross * self.config.employer_retirement_rate);
        let disability = round_half_up(gross * self.config.employer_disability_rate);
        let accident = round_half_up(gross * accident_rate);
        let labour_fund = round_half_up(gross * self.config.labour_fund_rate);
        let guaranteed_benefits_fund = if options.guaranteed_benefits_fund {
            round_half_up(gross * self.config.guaranteed_benefits_fund_rate)
        } else {
            Decimal::ZERO
        };
        let ppk = if options.ppk_opt_in {
            round_half_up(gross * self.config.ppk_employer_rate)
        } else {
            Decimal::ZERO
        };

        let total_contributions =
            retirement + disability + accident + labour_fund + guaranteed_benefits_fund + ppk;

        Ok(EmployerCost {
            gross,
            retirement,
            disability,
            accident,
            labour_fund,
            guaranteed_benefits_fund,
            ppk,
            total_contributions,
            total_cost: gross + total_contributions,
        })
    }

    /// Builds a January to December schedule with year-to-date tax thresholds.
    ///
    /// Each month taxes only the slice of the cumulative base it adds, so the
    /// month that crosses a bracket boundary is split between two rates. With
    /// `stable_salary` off, month `i` (0-based) is paid `gross × (1 − 0.005·i)`.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::InvalidConfig`] if the configuration is invalid.
    pub fn annual_breakdown(
        &self,
        gross: Decimal,
        options: &PayrollOptions,
        stable_salary: bool,
    ) -> Result<AnnualBreakdown, PayrollError> {
        self.config.validate()?;

        let schedule = ContributionSchedule::new(self.config);
        let engine = ProgressiveTaxEngine::new(&self.config.payroll_brackets);
        let gross = non_negative(gross);

        let mut cumulative_base = Decimal::ZERO;
        let mut months = Vec::with_capacity(MONTHS_PER_YEAR as usize);

        for index in 0..MONTHS_PER_YEAR {
            let factor = if stable_salary {
                Decimal::ONE
            } else {
                Decimal::ONE - UNSTABLE_SALARY_MONTHLY_DECAY * Decimal::from(index)
            };
            let month_gross = round_half_up(gross * factor);

            let social = schedule.social(month_gross, options.category).total;
            let taxable_base = self.taxable_base(month_gross, social);
            let health = schedule.health(taxable_base, TaxRegime::ProgressiveScale);

            let tax = if options.over_26 {
                let base_after_costs = non_negative(taxable_base - self.cost_of_income(options));
                let slice_tax = engine.apply_increment(cumulative_base, base_after_costs);
                cumulative_base += base_after_costs;
                self.apply_credits(slice_tax, options.tax_credit_count)
            } else {
                Decimal::ZERO
            };

            let ppk = self.ppk(month_gross, options);

            months.push(MonthlyBreakdownRow {
                month: index + 1,
                gross: month_gross,
                social,
                health,
                taxable_base,
                tax,
                ppk,
                net: round_half_up(month_gross - social - health - tax - ppk),
            });
        }

        Ok(AnnualBreakdown {
            total_gross: months.iter().map(|m| m.gross).sum(),
            total_social: months.iter().map(|m| m.social).sum(),
            total_health: months.iter().map(|m| m.health).sum(),
            total_tax: months.iter().map(|m| m.tax).sum(),
            total_ppk: months.iter().map(|m| m.ppk).sum(),
            total_net: months.iter().map(|m| m.net).sum(),
            months,
        })
    }

    fn net_amount(
        &self,
        gross: Decimal,
        options: &PayrollOptions,
    ) -> Decimal {
        self.calculate_net(gross, options).result.net_amount
    }

    fn calculate_net(
        &self,
        gross: Decimal,
        options: &PayrollOptions,
    ) -> GrossToNetResult {
        let gross = non_negative(gross);
        let schedule = ContributionSchedule::new(self.config);

        let social = schedule.social(gross, options.category);
        let taxable_base = self.taxable_base(gross, social.total);
        let health_contribution = schedule.health(taxable_base, TaxRegime::ProgressiveScale);

        let (cost_of_income, annual_tax_base, tax_before_credits, tax_amount) = if options.over_26 {
            let cost = self.cost_of_income(options);
            let annual_base = non_negative(taxable_base - cost) * Decimal::from(MONTHS_PER_YEAR);
            let annual_tax =
                ProgressiveTaxEngine::new(&self.config.payroll_brackets).apply(annual_base);
            let monthly_tax = annual_tax / Decimal::from(MONTHS_PER_YEAR);

            (
                cost,
                annual_base,
                round_half_up(monthly_tax),
                self.apply_credits(monthly_tax, options.tax_credit_count),
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        };

        let ppk_contribution = self.ppk(gross, options);
        let total_contributions = social.total + health_contribution + ppk_contribution;

        GrossToNetResult {
            result: CalculationResult {
                gross_amount: gross,
                total_contributions,
                taxable_base,
                tax_amount,
                net_amount: round_half_up(gross - total_contributions - tax_amount),
            },
            social,
            health_contribution,
            cost_of_income,
            annual_tax_base,
            tax_before_credits,
            tax_credit: self.tax_credit(options.tax_credit_count),
            ppk_contribution,
        }
    }

    fn taxable_base(
        &self,
        gross: Decimal,
        social: Decimal,
    ) -> Decimal {
        non_negative(round_half_up(gross - social))
    }

    fn cost_of_income(
        &self,
        options: &PayrollOptions,
    ) -> Decimal {
        if options.remote_work_cost_allowance {
            self.config.cost_of_income_remote
        } else {
            self.config.cost_of_income_commuting
        }
    }

    fn tax_credit(
        &self,
        count: u32,
    ) -> Decimal {
        Decimal::from(count) * self.config.tax_credit_amount
    }

    fn apply_credits(
        &self,
        tax: Decimal,
        count: u32,
    ) -> Decimal {
        round_half_up(non_negative(tax - self.tax_credit(count)))
    }

    fn ppk(
        &self,
        gross: Decimal,
        options: &PayrollOptions,
    ) -> Decimal {
        if options.ppk_opt_in {
            round_half_up(gross * self.config.ppk_employee_rate)
        } else {
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
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

    fn scenario_options() -> PayrollOptions {
        PayrollOptions {
            category: ContributorCategory::PreferentialRate,
            over_26: true,
            remote_work_cost_allowance: true,
            tax_credit_count: 1,
            ppk_opt_in: false,
        }
    }

    // =========================================================================
    // gross_to_net tests
    // =========================================================================

    #[test]
    fn gross_to_net_preferential_scenario() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        let result = converter
            .gross_to_net(dec!(11000), &scenario_options())
            .unwrap();

        assert_eq!(result.social.total, dec!(331.26));
        assert_eq!(result.result.taxable_base, dec!(10668.74));
        assert_eq!(result.health_contribution, dec!(960.19));
        assert_eq!(result.cost_of_income, dec!(250));
        assert_eq!(result.annual_tax_base, dec!(125024.88));
        assert_eq!(result.tax_before_credits, dec!(1034.00));
        assert_eq!(result.tax_credit, dec!(300));
        assert_eq!(result.result.tax_amount, dec!(734.00));
        assert_eq!(result.result.net_amount, dec!(8974.55));
    }

    #[test]
    fn gross_to_net_net_identity_holds() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);
        let options = PayrollOptions {
            ppk_opt_in: true,
            ..PayrollOptions::default()
        };

        let result = converter.gross_to_net(dec!(7345.67), &options).unwrap().result;

        assert_eq!(
            result.net_amount,
            result.gross_amount - result.total_contributions - result.tax_amount
        );
    }

    #[test]
    fn gross_to_net_employee_contract() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        let result = converter
            .gross_to_net(dec!(5000), &PayrollOptions::default())
            .unwrap();

        // Social: 488.00 + 75.00 + 122.50
        assert_eq!(result.social.total, dec!(685.50));
        assert_eq!(result.result.taxable_base, dec!(4314.50));
        // 4 314.50 × 9% = 388.305
        assert_eq!(result.health_contribution, dec!(388.31));
        // (4 314.50 − 250) × 12 = 48 774; (48 774 − 30 000) × 12% = 2 252.88 per year
        assert_eq!(result.annual_tax_base, dec!(48774.00));
        assert_eq!(result.tax_before_credits, dec!(187.74));
        assert_eq!(result.result.tax_amount, dec!(0.00));
        assert_eq!(result.result.net_amount, dec!(3926.19));
    }

    #[test]
    fn gross_to_net_under_26_pays_no_tax() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);
        let options = PayrollOptions {
            over_26: false,
            ..scenario_options()
        };

        let result = converter.gross_to_net(dec!(11000), &options).unwrap();

        assert_eq!(result.result.tax_amount, dec!(0));
        assert_eq!(result.cost_of_income, dec!(0));
        assert_eq!(result.result.net_amount, dec!(9708.55));
    }

    #[test]
    fn gross_to_net_commuting_allowance_is_higher() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);
        let options = PayrollOptions {
            remote_work_cost_allowance: false,
            ..scenario_options()
        };

        let result = converter.gross_to_net(dec!(11000), &options).unwrap();

        assert_eq!(result.cost_of_income, dec!(300));
        // (10 668.74 − 300) × 12 = 124 424.88 → 10 800 + 4 424.88 × 32% = 12 215.9616
        assert_eq!(result.annual_tax_base, dec!(124424.88));
        assert_eq!(result.result.tax_amount, dec!(718.00));
    }

    #[test]
    fn gross_to_net_ppk_reduces_net() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);
        let options = PayrollOptions {
            ppk_opt_in: true,
            ..scenario_options()
        };

        let result = converter.gross_to_net(dec!(11000), &options).unwrap();

        assert_eq!(result.ppk_contribution, dec!(220.00));
        assert_eq!(result.result.net_amount, dec!(8754.55));
    }

    #[test]
    fn gross_to_net_tax_credits_never_make_tax_negative() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);
        let options = PayrollOptions {
            tax_credit_count: 10,
            ..scenario_options()
        };

        let result = converter.gross_to_net(dec!(11000), &options).unwrap();

        assert_eq!(result.result.tax_amount, dec!(0));
    }

    #[test]
    fn gross_to_net_zero_gross_keeps_health_minimum() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        let result = converter
            .gross_to_net(Decimal::ZERO, &PayrollOptions::default())
            .unwrap();

        assert_eq!(result.result.taxable_base, dec!(0));
        assert_eq!(result.health_contribution, dec!(381.78));
        assert_eq!(result.result.tax_amount, dec!(0));
        assert_eq!(result.result.net_amount, dec!(-381.78));
    }

    #[test]
    fn gross_to_net_is_monotonic_in_gross() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);
        let options = PayrollOptions::default();

        let mut previous = Decimal::MIN;
        let mut gross = dec!(3000);
        while gross <= dec!(50000) {
            let net = converter.gross_to_net(gross, &options).unwrap().result.net_amount;
            assert!(net >= previous, "net dropped at gross {gross}: {net} < {previous}");
            previous = net;
            gross += dec!(250);
        }
    }

    #[test]
    fn gross_to_net_rejects_invalid_config() {
        let config = TaxYearConfig {
            ppk_employee_rate: dec!(2),
            ..TaxYearConfig::year_2025()
        };
        let converter = PayrollConverter::new(&config);

        let result = converter.gross_to_net(dec!(5000), &PayrollOptions::default());

        assert_eq!(
            result,
            Err(PayrollError::InvalidConfig(
                TaxYearConfigError::RateOutOfRange {
                    name: "ppk_employee_rate",
                    value: dec!(2),
                }
            ))
        );
    }

    // =========================================================================
    // net_to_gross tests
    // =========================================================================

    #[test]
    fn net_to_gross_round_trips_realistic_salaries() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        for options in [PayrollOptions::default(), scenario_options()] {
            for gross in [dec!(3000), dec!(4666), dec!(8000), dec!(11000), dec!(23456.78), dec!(50000)] {
                let net = converter.gross_to_net(gross, &options).unwrap().result.net_amount;

                let found = converter.net_to_gross(net, &options).unwrap();

                assert!(
                    (found.gross - gross).abs() < dec!(1),
                    "gross {gross} came back as {}",
                    found.gross
                );
            }
        }
    }

    #[test]
    fn net_to_gross_reports_achieved_net() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);
        let options = PayrollOptions::default();

        let found = converter.net_to_gross(dec!(6000), &options).unwrap();

        assert!(found.iterations <= MAX_ITERATIONS);
        assert!((found.achieved_net - dec!(6000)).abs() <= dec!(0.05));
    }

    #[test]
    fn net_to_gross_converged_matches_achieved_net() {
        let _guard = init_test_tracing();

        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        for options in [PayrollOptions::default(), scenario_options()] {
            for net in [dec!(2500), dec!(3926.19), dec!(6000), dec!(8974.55), dec!(12345.67), dec!(31000)] {
                let found = converter.net_to_gross(net, &options).unwrap();

                assert_eq!(found.gross, round_half_up(found.gross));
                assert_eq!(
                    found.achieved_net,
                    converter.gross_to_net(found.gross, &options).unwrap().result.net_amount
                );
                assert_eq!(
                    found.converged,
                    (found.achieved_net - net).abs() < TOLERANCE,
                    "net {net}: gross {} gives {}",
                    found.gross,
                    found.achieved_net
                );
            }
        }
    }

    #[test]
    fn net_to_gross_non_positive_net_returns_zero() {
        let _guard = init_test_tracing();

        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        let found = converter
            .net_to_gross(Decimal::ZERO, &PayrollOptions::default())
            .unwrap();

        assert_eq!(found.gross, dec!(0));
        assert_eq!(found.iterations, 0);
        assert!(!found.converged);
    }

    #[test]
    fn net_to_gross_small_net_escapes_health_minimum() {
        let _guard = init_test_tracing();

        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        let found = converter
            .net_to_gross(dec!(100), &PayrollOptions::default())
            .unwrap();

        assert!(found.gross > dec!(100));
        assert!(found.iterations <= MAX_ITERATIONS);
    }

    // =========================================================================
    // employer_cost tests
    // =========================================================================

    #[test]
    fn employer_cost_default_options() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        let cost = converter
            .employer_cost(dec!(5000), &EmployerCostOptions::default())
            .unwrap();

        assert_eq!(cost.retirement, dec!(488.00));
        assert_eq!(cost.disability, dec!(325.00));
        assert_eq!(cost.accident, dec!(83.50));
        assert_eq!(cost.labour_fund, dec!(122.50));
        assert_eq!(cost.guaranteed_benefits_fund, dec!(5.00));
        assert_eq!(cost.ppk, dec!(0));
        assert_eq!(cost.total_contributions, dec!(1024.00));
        assert_eq!(cost.total_cost, dec!(6024.00));
    }

    #[test]
    fn employer_cost_with_ppk_and_custom_accident_rate() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);
        let options = EmployerCostOptions {
            accident_rate: Some(dec!(0.02)),
            guaranteed_benefits_fund: false,
            ppk_opt_in: true,
        };

        let cost = converter.employer_cost(dec!(10000), &options).unwrap();

        assert_eq!(cost.accident, dec!(200.00));
        assert_eq!(cost.guaranteed_benefits_fund, dec!(0));
        assert_eq!(cost.ppk, dec!(150.00));
        assert_eq!(cost.total_contributions, dec!(2221.00));
        assert_eq!(cost.total_cost, dec!(12221.00));
    }

    // =========================================================================
    // annual_breakdown tests
    // =========================================================================

    #[test]
    fn annual_breakdown_has_twelve_months() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        let breakdown = converter
            .annual_breakdown(dec!(8000), &PayrollOptions::default(), true)
            .unwrap();

        assert_eq!(breakdown.months.len(), 12);
        assert_eq!(breakdown.months[0].month, 1);
        assert_eq!(breakdown.months[11].month, 12);
        assert_eq!(breakdown.total_gross, dec!(96000));
    }

    #[test]
    fn annual_breakdown_first_months_fall_in_tax_free_band() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        let breakdown = converter
            .annual_breakdown(dec!(8000), &PayrollOptions::default(), true)
            .unwrap();

        // Base after costs per month: 8 000 − 1 096.80 − 250 = 6 653.20;
        // four months stay under 30 000.
        assert_eq!(breakdown.months[0].tax, dec!(0));
        assert_eq!(breakdown.months[3].tax, dec!(0));
        assert!(breakdown.months[4].tax > dec!(0));
    }

    #[test]
    fn annual_breakdown_splits_month_crossing_top_threshold() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);
        let options = PayrollOptions {
            tax_credit_count: 0,
            ..scenario_options()
        };

        let breakdown = converter.annual_breakdown(dec!(11000), &options, true).unwrap();

        // Monthly base after costs: 10 418.74. Cumulative passes 120 000 in month 12.
        let november = &breakdown.months[10];
        let december = &breakdown.months[11];
        assert_eq!(november.tax, dec!(1250.25));
        // 5 393.86 × 12% + 5 024.88 × 32%
        assert_eq!(december.tax, dec!(2255.22));
    }

    #[test]
    fn annual_breakdown_unstable_salary_decays() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        let breakdown = converter
            .annual_breakdown(dec!(10000), &PayrollOptions::default(), false)
            .unwrap();

        assert_eq!(breakdown.months[0].gross, dec!(10000.00));
        assert_eq!(breakdown.months[1].gross, dec!(9950.00));
        assert_eq!(breakdown.months[11].gross, dec!(9450.00));
    }

    #[test]
    fn annual_breakdown_totals_sum_rows() {
        let config = TaxYearConfig::year_2025();
        let converter = PayrollConverter::new(&config);

        let breakdown = converter
            .annual_breakdown(dec!(9000), &PayrollOptions::default(), false)
            .unwrap();

        let net: Decimal = breakdown.months.iter().map(|m| m.net).sum();
        assert_eq!(breakdown.total_net, net);
        assert_eq!(
            breakdown.total_net,
            breakdown.total_gross
                - breakdown.total_social
                - breakdown.total_health
                - breakdown.total_tax
                - breakdown.total_ppk
        );
    }
}
