//! Calculation logic for the financial calculators.
//!
//! Each submodule is a self-contained calculator that takes an input struct
//! and a [`TaxYearConfig`](crate::TaxYearConfig) and returns a result struct.
//! Nothing here keeps state between calls.

pub mod business;
pub mod common;
pub mod compound_growth;
pub mod contributions;
pub mod payroll;
pub mod percentage;
pub mod progressive_tax;
pub mod retirement;

pub use business::{
    BusinessTaxComparator, BusinessTaxError, BusinessTaxInput, RegimeComparison, RegimeOutcome,
};
pub use compound_growth::{
    CompoundGrowthProjector, InvestmentParams, ProjectionError, ProjectionResult,
    YearlyProjectionRow,
};
pub use contributions::{ContributionResult, ContributionSchedule, SocialContributionBreakdown};
pub use payroll::{
    AnnualBreakdown, EmployerCost, EmployerCostOptions, GrossToNetResult, MonthlyBreakdownRow, NetToGrossResult,
    PayrollConverter, PayrollError, PayrollOptions,
};
pub use percentage::{PercentageError, PercentageOperation};
pub use progressive_tax::{ProgressiveTaxEngine, apply_brackets};
pub use retirement::{
    IkeInput, IkeResult, IkzeInput, IkzeResult, RetirementAccountCalculator, RetirementError,
    RetirementPlan, RetirementProjection,
};
