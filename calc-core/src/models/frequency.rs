use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How often a contribution is made or interest is compounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
    Daily,
}

impl Frequency {
    /// Number of periods in one year.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Semiannual => 2,
            Self::Annual => 1,
            Self::Daily => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Semiannual => "semiannual",
            Self::Annual => "annual",
            Self::Daily => "daily",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "semiannual" => Some(Self::Semiannual),
            "annual" => Some(Self::Annual),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

/// Unit in which a contractor quotes revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevenueFrequency {
    Monthly,
    Daily,
    Hourly,
}

impl RevenueFrequency {
    /// Converts a quoted rate into monthly revenue.
    pub fn to_monthly(
        &self,
        amount: Decimal,
        working_days_per_month: Decimal,
        working_hours_per_day: Decimal,
    ) -> Decimal {
        match self {
            Self::Monthly => amount,
            Self::Daily => amount * working_days_per_month,
            Self::Hourly => amount * working_hours_per_day * working_days_per_month,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "daily" => Some(Self::Daily),
            "hourly" => Some(Self::Hourly),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn periods_per_year_matches_calendar() {
        assert_eq!(Frequency::Monthly.periods_per_year(), 12);
        assert_eq!(Frequency::Quarterly.periods_per_year(), 4);
        assert_eq!(Frequency::Semiannual.periods_per_year(), 2);
        assert_eq!(Frequency::Annual.periods_per_year(), 1);
        assert_eq!(Frequency::Daily.periods_per_year(), 365);
    }

    #[test]
    fn daily_revenue_uses_working_days() {
        let monthly = RevenueFrequency::Daily.to_monthly(dec!(500), dec!(22), dec!(8));

        assert_eq!(monthly, dec!(11000));
    }

    #[test]
    fn hourly_revenue_uses_working_hours_and_days() {
        let monthly = RevenueFrequency::Hourly.to_monthly(dec!(100), dec!(22), dec!(8));

        assert_eq!(monthly, dec!(17600));
    }

    #[test]
    fn monthly_revenue_is_unchanged() {
        let monthly = RevenueFrequency::Monthly.to_monthly(dec!(11000), dec!(22), dec!(8));

        assert_eq!(monthly, dec!(11000));
    }
}
