use std::collections::BTreeMap;
use std::io::Read;

use calc_core::{RateTable, RateTableError, TaxBracket, TaxYearConfig, TaxYearConfigError};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Built-in year that CSV overrides are layered on.
const BASE_TAX_YEAR: i32 = 2025;

/// Errors that can occur when loading tax year data.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown rate table '{0}' (expected 'payroll' or 'business_scale')")]
    UnknownTable(String),

    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("Invalid value {value} for parameter '{parameter}'")]
    InvalidValue { parameter: String, value: Decimal },

    #[error("Tax year {0} not found in the supplied files")]
    TaxYearNotFound(i32),

    #[error("Invalid rate table '{table}': {source}")]
    InvalidTable {
        table: String,
        #[source]
        source: RateTableError,
    },

    #[error("Loaded configuration is invalid: {0}")]
    InvalidConfig(#[from] TaxYearConfigError),
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the brackets CSV file.
///
/// - `tax_year`: The tax year (e.g., 2025)
/// - `table`: `payroll` or `business_scale`
/// - `upper_bound`: Inclusive upper bound of the bracket (empty for unbounded)
/// - `rate`: The marginal rate as a decimal (e.g., 0.12 for 12%)
///
/// Rows of one table must be listed in ascending order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub table: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

/// A single row of the parameters CSV file, e.g. `2026,health_minimum,432.54`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ParameterRecord {
    pub tax_year: i32,
    pub parameter: String,
    pub value: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for tax year data from CSV files.
///
/// Files only need to contain what changes: every value that is not listed
/// keeps its built-in 2025 default.
pub struct TaxYearLoader;

impl TaxYearLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse_brackets<R: Read>(reader: R) -> Result<Vec<BracketRecord>, LoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse parameter records from a CSV reader.
    pub fn parse_parameters<R: Read>(reader: R) -> Result<Vec<ParameterRecord>, LoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ParameterRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Builds the configuration for `tax_year`.
    ///
    /// Starts from the built-in 2025 values, then replaces every rate table
    /// that has rows for `tax_year` and applies every matching parameter.
    /// Rows for other years are ignored. A year other than the built-in one
    /// must appear in at least one of the record sets.
    pub fn load_tax_year(
        tax_year: i32,
        brackets: &[BracketRecord],
        parameters: &[ParameterRecord],
    ) -> Result<TaxYearConfig, LoaderError> {
        let has_rows = brackets.iter().any(|r| r.tax_year == tax_year)
            || parameters.iter().any(|r| r.tax_year == tax_year);
        if tax_year != BASE_TAX_YEAR && !has_rows {
            return Err(LoaderError::TaxYearNotFound(tax_year));
        }

        let mut config = TaxYearConfig::year_2025();
        config.tax_year = tax_year;

        let tables = Self::apply_brackets(&mut config, brackets)?;
        let applied = Self::apply_parameters(&mut config, parameters)?;
        config.validate()?;

        info!(tax_year, tables, parameters = applied, "Loaded tax year configuration");
        Ok(config)
    }

    /// Replaces rate tables with the rows for `config.tax_year`.
    ///
    /// Returns the number of tables replaced.
    pub fn apply_brackets(
        config: &mut TaxYearConfig,
        records: &[BracketRecord],
    ) -> Result<usize, LoaderError> {
        // Group rows by table, keeping file order within each table
        let mut groups: BTreeMap<&str, Vec<TaxBracket>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.tax_year == config.tax_year) {
            groups
                .entry(record.table.as_str())
                .or_default()
                .push(TaxBracket {
                    upper_bound: record.upper_bound,
                    rate: record.rate,
                });
        }

        let replaced = groups.len();
        for (table, brackets) in groups {
            let rate_table =
                RateTable::new(brackets).map_err(|source| LoaderError::InvalidTable {
                    table: table.to_string(),
                    source,
                })?;

            match table {
                "payroll" => config.payroll_brackets = rate_table,
                "business_scale" => config.business_scale_brackets = rate_table,
                other => return Err(LoaderError::UnknownTable(other.to_string())),
            }
            debug!(table, "Replaced rate table");
        }

        Ok(replaced)
    }

    /// Applies the parameters for `config.tax_year`.
    ///
    /// Returns the number of parameters applied.
    pub fn apply_parameters(
        config: &mut TaxYearConfig,
        records: &[ParameterRecord],
    ) -> Result<usize, LoaderError> {
        let year = config.tax_year;
        let mut applied = 0;
        for record in records.iter().filter(|r| r.tax_year == year) {
            apply_parameter(config, &record.parameter, record.value)?;
            applied += 1;
        }
        Ok(applied)
    }
}

fn apply_parameter(
    config: &mut TaxYearConfig,
    name: &str,
    value: Decimal,
) -> Result<(), LoaderError> {
    let field = match name {
        "flat_linear_rate" => &mut config.flat_linear_rate,
        "tax_credit_amount" => &mut config.tax_credit_amount,
        "cost_of_income_remote" => &mut config.cost_of_income_remote,
        "cost_of_income_commuting" => &mut config.cost_of_income_commuting,
        "employee_retirement_rate" => &mut config.employee_retirement_rate,
        "employee_disability_rate" => &mut config.employee_disability_rate,
        "employee_sickness_rate" => &mut config.employee_sickness_rate,
        "standard_social_contribution" => &mut config.standard_social_contribution,
        "standard_sickness_basis" => &mut config.standard_sickness_basis,
        "preferential_social_contribution" => &mut config.preferential_social_contribution,
        "preferential_sickness_basis" => &mut config.preferential_sickness_basis,
        "voluntary_sickness_rate" => &mut config.voluntary_sickness_rate,
        "health_rate_scale" => &mut config.health_rate_scale,
        "health_rate_linear" => &mut config.health_rate_linear,
        "health_minimum" => &mut config.health_minimum,
        "ppk_employee_rate" => &mut config.ppk_employee_rate,
        "ppk_employer_rate" => &mut config.ppk_employer_rate,
        "employer_retirement_rate" => &mut config.employer_retirement_rate,
        "employer_disability_rate" => &mut config.employer_disability_rate,
        "labour_fund_rate" => &mut config.labour_fund_rate,
        "guaranteed_benefits_fund_rate" => &mut config.guaranteed_benefits_fund_rate,
        "default_accident_rate" => &mut config.default_accident_rate,
        "working_days_per_month" => &mut config.working_days_per_month,
        "working_hours_per_day" => &mut config.working_hours_per_day,
        "ike_annual_limit" => &mut config.ike_annual_limit,
        "ikze_annual_limit" => &mut config.ikze_annual_limit,
        "capital_gains_rate" => &mut config.capital_gains_rate,
        "public_pension_replacement_rate" => &mut config.public_pension_replacement_rate,
        "ike_min_payout_age" => {
            config.ike_min_payout_age = whole_number(name, value)?;
            return Ok(());
        }
        _ => return apply_health_tier(config, name, value),
    };
    *field = value;
    Ok(())
}

/// Lump-sum health tiers are addressed as `lump_sum_health_tier_<n>_amount`
/// and `lump_sum_health_tier_<n>_limit`, counting from 1.
fn apply_health_tier(
    config: &mut TaxYearConfig,
    name: &str,
    value: Decimal,
) -> Result<(), LoaderError> {
    let unknown = || LoaderError::UnknownParameter(name.to_string());

    let rest = name.strip_prefix("lump_sum_health_tier_").ok_or_else(unknown)?;
    let (index, attribute) = rest.split_once('_').ok_or_else(unknown)?;
    let index: usize = index.parse().map_err(|_| unknown())?;
    let tier = index
        .checked_sub(1)
        .and_then(|i| config.lump_sum_health_tiers.get_mut(i))
        .ok_or_else(unknown)?;

    match attribute {
        "amount" => tier.amount = value,
        "limit" => tier.annual_revenue_up_to = Some(value),
        _ => return Err(unknown()),
    }
    Ok(())
}

fn whole_number(
    parameter: &str,
    value: Decimal,
) -> Result<u32, LoaderError> {
    let invalid = || LoaderError::InvalidValue {
        parameter: parameter.to_string(),
        value,
    };
    if !value.fract().is_zero() {
        return Err(invalid());
    }
    value.to_u32().ok_or_else(invalid)
}
