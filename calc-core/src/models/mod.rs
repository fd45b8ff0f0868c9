mod calculation_result;
mod contributor_category;
mod frequency;
mod tax_bracket;
mod tax_regime;
mod tax_year_config;

pub use calculation_result::CalculationResult;
pub use contributor_category::ContributorCategory;
pub use frequency::{Frequency, RevenueFrequency};
pub use tax_bracket::{RateTable, RateTableError, TaxBracket};
pub use tax_regime::TaxRegime;
pub use tax_year_config::{LumpSumHealthTier, TaxYearConfig, TaxYearConfigError};
