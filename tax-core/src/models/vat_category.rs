use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// VAT rate category. The percentage for each category comes from the
/// active year's [`VatRates`](crate::models::VatRates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatCategory {
    Standard,
    ReducedTier1,
    ReducedTier2,
    ReducedTier3,
    Zero,
}

impl VatCategory {
    pub const ALL: [VatCategory; 5] = [
        Self::Standard,
        Self::ReducedTier1,
        Self::ReducedTier2,
        Self::ReducedTier3,
        Self::Zero,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::ReducedTier1 => "reduced_tier_1",
            Self::ReducedTier2 => "reduced_tier_2",
            Self::ReducedTier3 => "reduced_tier_3",
            Self::Zero => "zero",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Standard => "Standard rate for most goods and services",
            Self::ReducedTier1 => "Reduced rate for certain goods",
            Self::ReducedTier2 => "Reduced rate for accommodation and restaurants",
            Self::ReducedTier3 => "Reduced rate for specific items",
            Self::Zero => "Zero rate for exports and certain supplies",
        }
    }
}

impl fmt::Display for VatCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VatCategory {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == code)
            .ok_or_else(|| {
                TaxError::validation("vat_category", format!("unknown VAT category '{code}'"))
            })
    }
}
