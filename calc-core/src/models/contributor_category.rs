use serde::{Deserialize, Serialize};

/// Selects which social-insurance contribution applies to a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContributorCategory {
    /// Full self-employed contribution ("duży ZUS").
    StandardRate,
    /// Reduced contribution for the first years of business ("mały ZUS").
    PreferentialRate,
    /// No social contribution, health insurance only.
    HealthOnly,
    /// Employment contract: contributions are a percentage of gross pay.
    Employee,
}

impl ContributorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandardRate => "standard",
            Self::PreferentialRate => "preferential",
            Self::HealthOnly => "health-only",
            Self::Employee => "employee",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(Self::StandardRate),
            "preferential" => Some(Self::PreferentialRate),
            "health-only" => Some(Self::HealthOnly),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }
}
