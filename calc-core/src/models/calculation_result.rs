use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a payroll or business calculation for one month.
///
/// `gross_amount` is gross pay for payroll and monthly revenue for business
/// regimes. For payroll and the lump-sum regime `net_amount` equals
/// `gross_amount - total_contributions - tax_amount`; the scale and linear
/// regimes start from profit (revenue minus costs) instead, so their net is
/// also lower by the monthly costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub gross_amount: Decimal,
    pub total_contributions: Decimal,
    pub taxable_base: Decimal,
    pub tax_amount: Decimal,
    pub net_amount: Decimal,
}
