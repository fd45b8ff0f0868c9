//! Mandatory social and health insurance contributions.
//!
//! # Components
//!
//! | Component          | Employee                 | Self-employed                          |
//! |--------------------|--------------------------|----------------------------------------|
//! | Social             | % of gross (3 parts)     | Fixed monthly amount by category       |
//! | Health             | % of base, floored       | By regime: 9%, 4.9% or revenue tier    |
//! | Voluntary sickness | not applicable           | Sickness basis × 2.45% when opted in   |
//!
//! The health contribution never drops below the statutory minimum.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use calc_core::calculations::ContributionSchedule;
//! use calc_core::{ContributorCategory, TaxRegime, TaxYearConfig};
//!
//! let config = TaxYearConfig::year_2025();
//! let schedule = ContributionSchedule::new(&config);
//!
//! let result = schedule.compute(
//!     dec!(10668.74),
//!     ContributorCategory::PreferentialRate,
//!     TaxRegime::ProgressiveScale,
//!     false,
//! );
//!
//! assert_eq!(result.social_contribution, dec!(331.26));
//! assert_eq!(result.health_contribution, dec!(960.19));
//! assert_eq!(result.voluntary_sickness_contribution, dec!(0));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{max, round_half_up};
use crate::{ContributorCategory, TaxRegime, TaxYearConfig};

/// Contributions owed for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionResult {
    pub social_contribution: Decimal,
    pub health_contribution: Decimal,
    pub voluntary_sickness_contribution: Decimal,
}

impl ContributionResult {
    pub fn total(&self) -> Decimal {
        self.social_contribution + self.health_contribution + self.voluntary_sickness_contribution
    }
}

/// Social contribution split into its insurance components.
///
/// Employees pay the three percentage parts; self-employed categories pay a
/// single fixed `lump_sum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialContributionBreakdown {
    pub retirement: Decimal,
    pub disability: Decimal,
    pub sickness: Decimal,
    pub lump_sum: Decimal,
    pub total: Decimal,
}

impl SocialContributionBreakdown {
    fn lump_sum(amount: Decimal) -> Self {
        Self {
            retirement: Decimal::ZERO,
            disability: Decimal::ZERO,
            sickness: Decimal::ZERO,
            lump_sum: amount,
            total: amount,
        }
    }
}

/// Looks up and computes contributions from a [`TaxYearConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ContributionSchedule<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> ContributionSchedule<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Computes all contributions for one month.
    ///
    /// `base` feeds the health contribution (and the employee social
    /// percentages); a negative base is treated as zero.
    pub fn compute(
        &self,
        base: Decimal,
        category: ContributorCategory,
        regime: TaxRegime,
        voluntary_sickness: bool,
    ) -> ContributionResult {
        let base = self.clamp_base(base);

        ContributionResult {
            social_contribution: self.social(base, category).total,
            health_contribution: self.health(base, regime),
            voluntary_sickness_contribution: self.voluntary_sickness(category, voluntary_sickness),
        }
    }

    /// Social contribution for `category`.
    ///
    /// Only [`ContributorCategory::Employee`] depends on `gross`.
    pub fn social(
        &self,
        gross: Decimal,
        category: ContributorCategory,
    ) -> SocialContributionBreakdown {
        match category {
            ContributorCategory::StandardRate => {
                SocialContributionBreakdown::lump_sum(self.config.standard_social_contribution)
            }
            ContributorCategory::PreferentialRate => {
                SocialContributionBreakdown::lump_sum(self.config.preferential_social_contribution)
            }
            ContributorCategory::HealthOnly => SocialContributionBreakdown::lump_sum(Decimal::ZERO),
            ContributorCategory::Employee => {
                let gross = self.clamp_base(gross);
                let retirement = round_half_up(gross * self.config.employee_retirement_rate);
                let disability = round_half_up(gross * self.config.employee_disability_rate);
                let sickness = round_half_up(gross * self.config.employee_sickness_rate);

                SocialContributionBreakdown {
                    retirement,
                    disability,
                    sickness,
                    lump_sum: Decimal::ZERO,
                    total: retirement + disability + sickness,
                }
            }
        }
    }

    /// Health contribution under `regime`, floored at the statutory minimum.
    ///
    /// For the lump-sum regime `base` is monthly revenue; the tier is chosen by
    /// annualised revenue.
    pub fn health(
        &self,
        base: Decimal,
        regime: TaxRegime,
    ) -> Decimal {
        let base = self.clamp_base(base);

        let amount = match regime {
            TaxRegime::ProgressiveScale => round_half_up(base * self.config.health_rate_scale),
            TaxRegime::FlatLinear => round_half_up(base * self.config.health_rate_linear),
            TaxRegime::LumpSumOnRevenue => self.lump_sum_health(base * Decimal::from(12)),
        };

        max(amount, self.config.health_minimum)
    }

    /// Basis on which voluntary sickness insurance is computed.
    pub fn sickness_basis(
        &self,
        category: ContributorCategory,
    ) -> Decimal {
        match category {
            ContributorCategory::StandardRate => self.config.standard_sickness_basis,
            ContributorCategory::PreferentialRate => self.config.preferential_sickness_basis,
            ContributorCategory::HealthOnly | ContributorCategory::Employee => Decimal::ZERO,
        }
    }

    /// Voluntary sickness contribution, zero when not opted in or without a basis.
    pub fn voluntary_sickness(
        &self,
        category: ContributorCategory,
        opted_in: bool,
    ) -> Decimal {
        let basis = self.sickness_basis(category);
        if !opted_in || basis <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_half_up(basis * self.config.voluntary_sickness_rate)
    }

    fn lump_sum_health(
        &self,
        annual_revenue: Decimal,
    ) -> Decimal {
        self.config
            .lump_sum_health_tiers
            .iter()
            .find(|tier| {
                tier.annual_revenue_up_to
                    .is_none_or(|limit| annual_revenue <= limit)
            })
            .map(|tier| tier.amount)
            .unwrap_or(self.config.health_minimum)
    }

    fn clamp_base(
        &self,
        base: Decimal,
    ) -> Decimal {
        if base < Decimal::ZERO {
            warn!(base = %base, "Contribution base is negative; using zero");
            return Decimal::ZERO;
        }
        base
    }
}
