use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// Social security contributor class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionClass {
    /// Class 1: employed persons, contributions shared with the employer.
    Employee,
    /// Class 2: self-employed and self-occupied persons.
    SelfEmployed,
}

impl ContributionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::SelfEmployed => "self_employed",
        }
    }
}

impl fmt::Display for ContributionClass {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContributionClass {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" | "class_1" => Ok(Self::Employee),
            "self_employed" | "class_2" => Ok(Self::SelfEmployed),
            other => Err(TaxError::validation(
                "employment_type",
                format!("unknown contribution class '{other}', expected employee or self_employed"),
            )),
        }
    }
}

/// Class 1 weekly contribution category, selected from the wage bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Class1Category {
    /// Under 18, wage at or below the low-wage ceiling: reduced flat rate.
    A,
    /// 18 or over, wage at or below the low-wage ceiling: flat rate.
    B,
    /// Wage above the low-wage ceiling: percentage of wage.
    C,
    /// Percentage would exceed the cohort cap: capped flat rate.
    D,
}
