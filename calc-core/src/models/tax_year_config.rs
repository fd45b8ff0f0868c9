use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tax_bracket::{RateTable, TaxBracket};

/// Errors raised by [`TaxYearConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxYearConfigError {
    #[error("{name} must be between 0 and 1, got {value}")]
    RateOutOfRange { name: &'static str, value: Decimal },

    #[error("{name} must be non-negative, got {value}")]
    NegativeAmount { name: &'static str, value: Decimal },

    #[error("{name} must be positive, got {value}")]
    NonPositiveAmount { name: &'static str, value: Decimal },

    #[error("lump-sum health tiers must be non-empty, ascending and end unbounded")]
    InvalidHealthTiers,
}

/// Flat monthly health contribution for lump-sum taxpayers whose annual
/// revenue is at most `annual_revenue_up_to` (`None` for the top tier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LumpSumHealthTier {
    pub annual_revenue_up_to: Option<Decimal>,
    pub amount: Decimal,
}

/// Statutory constants for one tax year.
///
/// Every rate, threshold and fixed amount used by the calculators comes from
/// here, so a new tax year is a new value of this struct rather than a code
/// change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,

    // Income tax
    pub payroll_brackets: RateTable,
    pub business_scale_brackets: RateTable,
    pub flat_linear_rate: Decimal,
    pub tax_credit_amount: Decimal,
    pub cost_of_income_remote: Decimal,
    pub cost_of_income_commuting: Decimal,

    // Employee social insurance
    pub employee_retirement_rate: Decimal,
    pub employee_disability_rate: Decimal,
    pub employee_sickness_rate: Decimal,

    // Self-employed social insurance
    pub standard_social_contribution: Decimal,
    pub standard_sickness_basis: Decimal,
    pub preferential_social_contribution: Decimal,
    pub preferential_sickness_basis: Decimal,
    pub voluntary_sickness_rate: Decimal,

    // Health insurance
    pub health_rate_scale: Decimal,
    pub health_rate_linear: Decimal,
    pub health_minimum: Decimal,
    pub lump_sum_health_tiers: Vec<LumpSumHealthTier>,

    // Employee capital plan (PPK)
    pub ppk_employee_rate: Decimal,
    pub ppk_employer_rate: Decimal,

    // Employer contributions
    pub employer_retirement_rate: Decimal,
    pub employer_disability_rate: Decimal,
    pub labour_fund_rate: Decimal,
    pub guaranteed_benefits_fund_rate: Decimal,
    pub default_accident_rate: Decimal,

    // Contractor revenue conversion
    pub working_days_per_month: Decimal,
    pub working_hours_per_day: Decimal,

    // Retirement accounts
    pub ike_annual_limit: Decimal,
    pub ikze_annual_limit: Decimal,
    pub capital_gains_rate: Decimal,
    pub public_pension_replacement_rate: Decimal,
    pub ike_min_payout_age: u32,
}

impl TaxYearConfig {
    /// Built-in constants for the 2025 tax year.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use calc_core::TaxYearConfig;
    ///
    /// let config = TaxYearConfig::year_2025();
    ///
    /// assert_eq!(config.tax_year, 2025);
    /// assert_eq!(config.health_minimum, dec!(381.78));
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn year_2025() -> Self {
        Self {
            tax_year: 2025,
            payroll_brackets: RateTable::from_ordered(vec![
                TaxBracket::bounded(dec!(30000), dec!(0)),
                TaxBracket::bounded(dec!(120000), dec!(0.12)),
                TaxBracket::unbounded(dec!(0.32)),
            ]),
            business_scale_brackets: RateTable::from_ordered(vec![
                TaxBracket::bounded(dec!(30000), dec!(0)),
                TaxBracket::bounded(dec!(120000), dec!(0.12)),
                TaxBracket::unbounded(dec!(0.32)),
            ]),
            flat_linear_rate: dec!(0.19),
            tax_credit_amount: dec!(300),
            cost_of_income_remote: dec!(250),
            cost_of_income_commuting: dec!(300),
            employee_retirement_rate: dec!(0.0976),
            employee_disability_rate: dec!(0.015),
            employee_sickness_rate: dec!(0.0245),
            standard_social_contribution: dec!(1418.48),
            standard_sickness_basis: dec!(4300),
            preferential_social_contribution: dec!(331.26),
            preferential_sickness_basis: dec!(1047.50),
            voluntary_sickness_rate: dec!(0.0245),
            health_rate_scale: dec!(0.09),
            health_rate_linear: dec!(0.049),
            health_minimum: dec!(381.78),
            lump_sum_health_tiers: vec![
                LumpSumHealthTier {
                    annual_revenue_up_to: Some(dec!(60000)),
                    amount: dec!(381.78),
                },
                LumpSumHealthTier {
                    annual_revenue_up_to: Some(dec!(300000)),
                    amount: dec!(636.51),
                },
                LumpSumHealthTier {
                    annual_revenue_up_to: None,
                    amount: dec!(1145.67),
                },
            ],
            ppk_employee_rate: dec!(0.02),
            ppk_employer_rate: dec!(0.015),
            employer_retirement_rate: dec!(0.0976),
            employer_disability_rate: dec!(0.065),
            labour_fund_rate: dec!(0.0245),
            guaranteed_benefits_fund_rate: dec!(0.001),
            default_accident_rate: dec!(0.0167),
            working_days_per_month: dec!(22),
            working_hours_per_day: dec!(8),
            ike_annual_limit: dec!(26019.00),
            ikze_annual_limit: dec!(10407.60),
            capital_gains_rate: dec!(0.19),
            public_pension_replacement_rate: dec!(0.30),
            ike_min_payout_age: 55,
        }
    }

    /// Checks that every rate is a fraction and every amount is non-negative.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaxYearConfigError`] found.
    pub fn validate(&self) -> Result<(), TaxYearConfigError> {
        let rates = [
            ("flat_linear_rate", self.flat_linear_rate),
            ("employee_retirement_rate", self.employee_retirement_rate),
            ("employee_disability_rate", self.employee_disability_rate),
            ("employee_sickness_rate", self.employee_sickness_rate),
            ("voluntary_sickness_rate", self.voluntary_sickness_rate),
            ("health_rate_scale", self.health_rate_scale),
            ("health_rate_linear", self.health_rate_linear),
            ("ppk_employee_rate", self.ppk_employee_rate),
            ("ppk_employer_rate", self.ppk_employer_rate),
            ("employer_retirement_rate", self.employer_retirement_rate),
            ("employer_disability_rate", self.employer_disability_rate),
            ("labour_fund_rate", self.labour_fund_rate),
            ("guaranteed_benefits_fund_rate", self.guaranteed_benefits_fund_rate),
            ("default_accident_rate", self.default_accident_rate),
            ("capital_gains_rate", self.capital_gains_rate),
            ("public_pension_replacement_rate", self.public_pension_replacement_rate),
        ];
        for (name, value) in rates {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(TaxYearConfigError::RateOutOfRange { name, value });
            }
        }

        let amounts = [
            ("tax_credit_amount", self.tax_credit_amount),
            ("cost_of_income_remote", self.cost_of_income_remote),
            ("cost_of_income_commuting", self.cost_of_income_commuting),
            ("standard_social_contribution", self.standard_social_contribution),
            ("standard_sickness_basis", self.standard_sickness_basis),
            ("preferential_social_contribution", self.preferential_social_contribution),
            ("preferential_sickness_basis", self.preferential_sickness_basis),
            ("health_minimum", self.health_minimum),
            ("ike_annual_limit", self.ike_annual_limit),
            ("ikze_annual_limit", self.ikze_annual_limit),
        ];
        for (name, value) in amounts {
            if value < Decimal::ZERO {
                return Err(TaxYearConfigError::NegativeAmount { name, value });
            }
        }

        let positive = [
            ("working_days_per_month", self.working_days_per_month),
            ("working_hours_per_day", self.working_hours_per_day),
        ];
        for (name, value) in positive {
            if value <= Decimal::ZERO {
                return Err(TaxYearConfigError::NonPositiveAmount { name, value });
            }
        }

        self.validate_health_tiers()
    }

    fn validate_health_tiers(&self) -> Result<(), TaxYearConfigError> {
        let Some((last, rest)) = self.lump_sum_health_tiers.split_last() else {
            return Err(TaxYearConfigError::InvalidHealthTiers);
        };
        if last.annual_revenue_up_to.is_some() {
            return Err(TaxYearConfigError::InvalidHealthTiers);
        }

        let mut previous = Decimal::ZERO;
        for tier in rest {
            match tier.annual_revenue_up_to {
                Some(bound) if bound > previous => previous = bound,
                _ => return Err(TaxYearConfigError::InvalidHealthTiers),
            }
        }

        if self
            .lump_sum_health_tiers
            .iter()
            .any(|tier| tier.amount < Decimal::ZERO)
        {
            return Err(TaxYearConfigError::InvalidHealthTiers);
        }
        Ok(())
    }
}

impl Default for TaxYearConfig {
    fn default() -> Self {
        Self::year_2025()
    }
}
