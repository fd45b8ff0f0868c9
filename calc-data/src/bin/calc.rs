use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calc_core::calculations::common::percent_to_rate;
use calc_core::calculations::{
    AnnualBreakdown, BusinessTaxComparator, BusinessTaxInput, CompoundGrowthProjector,
    EmployerCostOptions, InvestmentParams, IkzeInput, PayrollConverter, PayrollOptions,
    PercentageOperation, ProjectionResult, RetirementAccountCalculator, RetirementPlan,
    RetirementProjection,
};
use calc_core::{ContributorCategory, Frequency, RevenueFrequency, TaxRegime, TaxYearConfig};
use calc_data::input::parse_amount;
use calc_data::{TaxYearLoader, logging};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

/// Polish payroll, business tax and savings calculators.
///
/// Amounts accept a decimal comma and space grouping ("11 000,50"); input
/// that is not a number is treated as 0.
#[derive(Parser, Debug)]
#[command(name = "calc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// CSV file with rate tables (tax_year,table,upper_bound,rate)
    #[arg(long, global = true)]
    brackets: Option<PathBuf>,

    /// CSV file with parameter overrides (tax_year,parameter,value)
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// Tax year to calculate for
    #[arg(long, global = true, default_value_t = 2025)]
    year: i32,

    /// Log filter, e.g. "debug" or "calc_core=debug"
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append log output to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert monthly salary between gross and net
    Payroll(PayrollArgs),
    /// Employer cost of a monthly gross salary
    EmployerCost(EmployerCostArgs),
    /// Compare self-employed taxation regimes
    B2b(BusinessArgs),
    /// Compound interest projection
    Invest(InvestArgs),
    /// IKE retirement account projection
    Ike(RetirementArgs),
    /// IKZE retirement account projection
    Ikze(IkzeArgs),
    /// Elementary percentage formulas
    Percent(PercentArgs),
}

#[derive(Args, Debug)]
struct PayrollArgs {
    /// Monthly gross salary
    #[arg(long, value_parser = amount, conflicts_with = "net", required_unless_present = "net")]
    gross: Option<Decimal>,

    /// Target monthly net salary
    #[arg(long, value_parser = amount)]
    net: Option<Decimal>,

    /// standard, preferential, health-only or employee
    #[arg(long, value_parser = category, default_value = "employee")]
    category: ContributorCategory,

    /// Employee is under 26 (income tax exempt)
    #[arg(long)]
    under_26: bool,

    /// Use the higher commuting cost-of-income allowance
    #[arg(long)]
    commuting: bool,

    /// Number of tax credits
    #[arg(long, default_value_t = 1)]
    tax_credits: u32,

    /// Employee participates in PPK
    #[arg(long)]
    ppk: bool,

    /// Also print a January to December breakdown
    #[arg(long)]
    annual: bool,

    /// Salary decreases slightly every month in the breakdown
    #[arg(long)]
    unstable_salary: bool,
}

#[derive(Args, Debug)]
struct EmployerCostArgs {
    #[arg(long, value_parser = amount)]
    gross: Decimal,

    /// Accident insurance rate in percent (default from configuration)
    #[arg(long, value_parser = amount)]
    accident_rate: Option<Decimal>,

    /// Exclude the guaranteed employee benefits fund
    #[arg(long)]
    no_fgsp: bool,

    #[arg(long)]
    ppk: bool,
}

#[derive(Args, Debug)]
struct BusinessArgs {
    #[arg(long, value_parser = amount)]
    revenue: Decimal,

    /// monthly, daily or hourly
    #[arg(long, value_parser = revenue_frequency, default_value = "monthly")]
    frequency: RevenueFrequency,

    /// Monthly deductible costs
    #[arg(long, value_parser = amount, default_value = "0")]
    costs: Decimal,

    /// Lump-sum rate in percent
    #[arg(long, value_parser = amount, default_value = "12")]
    lump_sum_rate: Decimal,

    /// standard, preferential or health-only
    #[arg(long, value_parser = category, default_value = "standard")]
    category: ContributorCategory,

    #[arg(long)]
    voluntary_sickness: bool,
}

#[derive(Args, Debug)]
struct InvestArgs {
    #[arg(long, value_parser = amount, default_value = "0")]
    initial: Decimal,

    #[arg(long, value_parser = amount, default_value = "0")]
    contribution: Decimal,

    /// monthly, quarterly, semiannual or annual
    #[arg(long, value_parser = frequency, default_value = "monthly")]
    contribution_frequency: Frequency,

    /// Annual return in percent
    #[arg(long, value_parser = amount)]
    rate: Decimal,

    /// monthly, quarterly, semiannual, annual or daily
    #[arg(long, value_parser = frequency, default_value = "annual")]
    compounding: Frequency,

    #[arg(long)]
    years: u32,
}

#[derive(Args, Debug)]
struct RetirementArgs {
    #[arg(long)]
    age: u32,

    #[arg(long, default_value_t = 65)]
    payout_age: u32,

    #[arg(long, value_parser = amount)]
    contribution: Decimal,

    /// monthly or annual
    #[arg(long, value_parser = frequency, default_value = "monthly")]
    frequency: Frequency,

    /// Annual return in percent
    #[arg(long, value_parser = amount, default_value = "5")]
    rate: Decimal,

    #[arg(long, default_value_t = 10)]
    payout_years: u32,

    /// Gross monthly salary, for the public pension comparison
    #[arg(long, value_parser = amount, default_value = "0")]
    salary: Decimal,
}

#[derive(Args, Debug)]
struct IkzeArgs {
    #[command(flatten)]
    plan: RetirementArgs,

    /// Income tax rate in percent at which contributions are deducted
    #[arg(long, value_parser = amount)]
    marginal_rate: Option<Decimal>,
}

#[derive(Args, Debug)]
struct PercentArgs {
    /// part-of-whole, change, add, subtract, ratio or discount
    #[arg(value_parser = percentage_operation)]
    operation: PercentageOperation,

    #[arg(value_parser = amount, allow_negative_numbers = true)]
    a: Decimal,

    #[arg(value_parser = amount, allow_negative_numbers = true)]
    b: Decimal,
}

fn amount(s: &str) -> Result<Decimal, String> {
    Ok(parse_amount(s))
}

fn category(s: &str) -> Result<ContributorCategory, String> {
    ContributorCategory::parse(s).ok_or_else(|| format!("unknown category '{s}'"))
}

fn frequency(s: &str) -> Result<Frequency, String> {
    Frequency::parse(s).ok_or_else(|| format!("unknown frequency '{s}'"))
}

fn revenue_frequency(s: &str) -> Result<RevenueFrequency, String> {
    RevenueFrequency::parse(s).ok_or_else(|| format!("unknown revenue frequency '{s}'"))
}

fn percentage_operation(s: &str) -> Result<PercentageOperation, String> {
    PercentageOperation::parse(s).ok_or_else(|| format!("unknown operation '{s}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    let config = load_config(&cli)?;

    match &cli.command {
        Command::Payroll(args) => payroll(&config, args),
        Command::EmployerCost(args) => employer_cost(&config, args),
        Command::B2b(args) => business(&config, args),
        Command::Invest(args) => invest(args),
        Command::Ike(args) => ike(&config, args),
        Command::Ikze(args) => ikze(&config, args),
        Command::Percent(args) => percent(args),
    }
}

fn load_config(cli: &Cli) -> Result<TaxYearConfig> {
    let brackets = match &cli.brackets {
        Some(path) => TaxYearLoader::parse_brackets(open(path)?)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?,
        None => Vec::new(),
    };
    let parameters = match &cli.params {
        Some(path) => TaxYearLoader::parse_parameters(open(path)?)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?,
        None => Vec::new(),
    };

    info!(
        tax_year = cli.year,
        brackets = brackets.len(),
        parameters = parameters.len(),
        "Loading configuration"
    );

    TaxYearLoader::load_tax_year(cli.year, &brackets, &parameters)
        .with_context(|| format!("Failed to load tax year {}", cli.year))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open: {}", path.display()))
}

fn payroll(
    config: &TaxYearConfig,
    args: &PayrollArgs,
) -> Result<()> {
    let converter = PayrollConverter::new(config);
    let options = PayrollOptions {
        category: args.category,
        over_26: !args.under_26,
        remote_work_cost_allowance: !args.commuting,
        tax_credit_count: args.tax_credits,
        ppk_opt_in: args.ppk,
    };

    let gross = match (args.gross, args.net) {
        (Some(gross), _) => gross,
        (None, Some(net)) => {
            let found = converter
                .net_to_gross(net, &options)
                .context("Net to gross conversion failed")?;
            if !found.converged {
                println!("Note: search stopped after {} iterations", found.iterations);
            }
            found.gross
        }
        (None, None) => anyhow::bail!("either --gross or --net is required"),
    };

    let result = converter
        .gross_to_net(gross, &options)
        .context("Gross to net conversion failed")?;

    row("Gross", result.result.gross_amount);
    row("Social contributions", result.social.total);
    row("Taxable base", result.result.taxable_base);
    row("Health contribution", result.health_contribution);
    row("Cost of income", result.cost_of_income);
    row("Tax before credits", result.tax_before_credits);
    row("Income tax", result.result.tax_amount);
    row("PPK", result.ppk_contribution);
    row("Net", result.result.net_amount);

    if args.annual {
        let breakdown = converter
            .annual_breakdown(gross, &options, !args.unstable_salary)
            .context("Annual breakdown failed")?;
        println!();
        print_breakdown(&breakdown);
    }

    Ok(())
}

fn employer_cost(
    config: &TaxYearConfig,
    args: &EmployerCostArgs,
) -> Result<()> {
    let options = EmployerCostOptions {
        accident_rate: args.accident_rate.map(percent_to_rate),
        guaranteed_benefits_fund: !args.no_fgsp,
        ppk_opt_in: args.ppk,
    };
    let cost = PayrollConverter::new(config)
        .employer_cost(args.gross, &options)
        .context("Employer cost calculation failed")?;

    row("Gross", cost.gross);
    row("Retirement", cost.retirement);
    row("Disability", cost.disability);
    row("Accident", cost.accident);
    row("Labour Fund", cost.labour_fund);
    row("FGSP", cost.guaranteed_benefits_fund);
    row("PPK", cost.ppk);
    row("Total cost", cost.total_cost);

    Ok(())
}

fn business(
    config: &TaxYearConfig,
    args: &BusinessArgs,
) -> Result<()> {
    let input = BusinessTaxInput {
        revenue: args.revenue,
        revenue_frequency: args.frequency,
        monthly_costs: args.costs,
        lump_sum_rate: args.lump_sum_rate,
        category: args.category,
        voluntary_sickness: args.voluntary_sickness,
    };
    let comparison = BusinessTaxComparator::new(config)
        .compare_regimes(&input)
        .context("Regime comparison failed")?;

    println!(
        "{:<10} {:>12} {:>14} {:>12} {:>12}",
        "Regime", "Revenue", "Contributions", "Tax", "Net"
    );
    for regime in TaxRegime::ALL {
        let outcome = comparison.outcome(regime);
        let marker = if regime == comparison.best { " *" } else { "" };
        println!(
            "{:<10} {:>12} {:>14} {:>12} {:>12}{marker}",
            regime.as_str(),
            money(outcome.result.gross_amount),
            money(outcome.result.total_contributions),
            money(outcome.result.tax_amount),
            money(outcome.result.net_amount),
        );
    }

    Ok(())
}

fn invest(args: &InvestArgs) -> Result<()> {
    let params = InvestmentParams {
        initial_amount: args.initial,
        periodic_contribution: args.contribution,
        contribution_frequency: args.contribution_frequency,
        annual_return_rate: percent_to_rate(args.rate),
        compounding_frequency: args.compounding,
        duration_years: args.years,
    };
    let result = CompoundGrowthProjector::new()
        .project(&params)
        .context("Projection failed")?;

    print_projection(&result);
    Ok(())
}

fn retirement_plan(args: &RetirementArgs) -> RetirementPlan {
    RetirementPlan {
        current_age: args.age,
        payout_age: args.payout_age,
        contribution: args.contribution,
        contribution_frequency: args.frequency,
        annual_return_rate: percent_to_rate(args.rate),
        payout_years: args.payout_years,
        monthly_salary: args.salary,
    }
}

fn ike(
    config: &TaxYearConfig,
    args: &RetirementArgs,
) -> Result<()> {
    let result = RetirementAccountCalculator::new(config)
        .ike(&retirement_plan(args))
        .context("IKE projection failed")?;

    print_retirement(&result.projection);
    row("Capital gains tax avoided", result.capital_gains_tax_avoided);
    if result.early_payout_warning {
        println!(
            "Warning: payout before age {} loses the tax exemption",
            config.ike_min_payout_age
        );
    }
    Ok(())
}

fn ikze(
    config: &TaxYearConfig,
    args: &IkzeArgs,
) -> Result<()> {
    let input = IkzeInput {
        plan: retirement_plan(&args.plan),
        marginal_tax_rate: args.marginal_rate.map(percent_to_rate),
    };
    let result = RetirementAccountCalculator::new(config)
        .ikze(&input)
        .context("IKZE projection failed")?;

    print_retirement(&result.projection);
    row("Yearly tax relief", result.annual_tax_relief);
    row("Total tax relief", result.total_tax_relief);
    Ok(())
}

fn percent(args: &PercentArgs) -> Result<()> {
    let value = args
        .operation
        .apply(args.a, args.b)
        .with_context(|| format!("{} failed", args.operation.as_str()))?;
    println!("{}", value.normalize());
    Ok(())
}

fn print_breakdown(breakdown: &AnnualBreakdown) {
    println!(
        "{:>5} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Month", "Gross", "Social", "Health", "Tax", "Net"
    );
    for month in &breakdown.months {
        println!(
            "{:>5} {:>12} {:>12} {:>12} {:>12} {:>12}",
            month.month,
            money(month.gross),
            money(month.social),
            money(month.health),
            money(month.tax),
            money(month.net),
        );
    }
    println!(
        "{:>5} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Total",
        money(breakdown.total_gross),
        money(breakdown.total_social),
        money(breakdown.total_health),
        money(breakdown.total_tax),
        money(breakdown.total_net),
    );
}

fn print_projection(result: &ProjectionResult) {
    println!(
        "{:>4} {:>14} {:>14} {:>14}",
        "Year", "Principal", "Interest", "Balance"
    );
    for year in &result.yearly_data {
        println!(
            "{:>4} {:>14} {:>14} {:>14}",
            year.period,
            money(year.cumulative_principal),
            money(year.cumulative_interest),
            money(year.balance),
        );
    }
    println!();
    row("Total contributed", result.total_contributed);
    row("Total interest", result.total_interest);
    row("Final balance", result.final_balance);
}

fn print_retirement(projection: &RetirementProjection) {
    print_projection(&projection.growth);
    if projection.contribution_capped {
        println!("Note: yearly contribution capped at the statutory limit");
    }
    row("Yearly contribution", projection.annual_contribution);
    row("Profit", projection.profit);
    row("Profit %", projection.profit_percentage);
    row("Monthly pension", projection.monthly_pension);
    row("Estimated public pension", projection.estimated_public_pension);
}

fn row(
    label: &str,
    value: Decimal,
) {
    println!("{label:<28}{:>14}", money(value));
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}
