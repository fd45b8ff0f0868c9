use serde::{Deserialize, Serialize};

/// Taxation regime of a self-employed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxRegime {
    ProgressiveScale,
    FlatLinear,
    LumpSumOnRevenue,
}

impl TaxRegime {
    /// Fixed preference order used to break ties between regimes.
    pub const ALL: [TaxRegime; 3] = [
        TaxRegime::ProgressiveScale,
        TaxRegime::FlatLinear,
        TaxRegime::LumpSumOnRevenue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProgressiveScale => "scale",
            Self::FlatLinear => "linear",
            Self::LumpSumOnRevenue => "lump-sum",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scale" => Some(Self::ProgressiveScale),
            "linear" => Some(Self::FlatLinear),
            "lump-sum" => Some(Self::LumpSumOnRevenue),
            _ => None,
        }
    }
}
