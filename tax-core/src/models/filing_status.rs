use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// Income tax computation basis. Each status has its own rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    Married,
    Parental,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 3] = [Self::Single, Self::Married, Self::Parental];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Married => "married",
            Self::Parental => "parental",
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown codes are rejected; there is no fallback to `Single`.
impl FromStr for FilingStatus {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "married" => Ok(Self::Married),
            "parental" => Ok(Self::Parental),
            other => Err(TaxError::validation(
                "filing_status",
                format!("unknown filing status '{other}', expected single, married or parental"),
            )),
        }
    }
}
