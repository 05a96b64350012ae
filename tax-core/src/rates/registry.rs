use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::{TaxError, TaxResult};
use crate::models::{FilingStatus, RateTable, TaxYearRates};
use crate::rates::malta::{malta_2024, malta_2025};

/// Immutable set of validated per-year schedules.
///
/// Built once at startup and shared read-only between calculations. Every
/// year is validated during construction so an inconsistent schedule stops
/// the engine from starting rather than failing on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRegistry {
    years: BTreeMap<i32, TaxYearRates>,
}

impl RateRegistry {
    /// Builds a registry from explicit schedules.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] if no schedules are given, a year
    /// appears twice, or a schedule fails [`TaxYearRates::validate`].
    pub fn new(schedules: Vec<TaxYearRates>) -> TaxResult<Self> {
        if schedules.is_empty() {
            return Err(TaxError::configuration("no tax years configured"));
        }

        let mut years = BTreeMap::new();
        for rates in schedules {
            rates.validate()?;
            let year = rates.tax_year;
            if years.insert(year, rates).is_some() {
                return Err(TaxError::configuration(format!(
                    "tax year {year} configured more than once"
                )));
            }
        }

        info!(years = ?years.keys().collect::<Vec<_>>(), "rate registry ready");
        Ok(Self { years })
    }

    /// Registry with the built-in Maltese schedules.
    pub fn malta() -> TaxResult<Self> {
        Self::new(vec![malta_2024()?, malta_2025()?])
    }

    /// Schedules for `tax_year`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::UnsupportedYear`] when the year is not configured.
    pub fn get(
        &self,
        tax_year: i32,
    ) -> TaxResult<&TaxYearRates> {
        self.years
            .get(&tax_year)
            .ok_or(TaxError::UnsupportedYear(tax_year))
    }

    /// Configured years, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    pub fn latest_year(&self) -> i32 {
        // Construction guarantees at least one year.
        self.years.keys().next_back().copied().unwrap_or_default()
    }

    /// Returns a registry with one income tax table replaced.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::UnsupportedYear`] when `tax_year` is not configured.
    pub fn with_income_table(
        mut self,
        tax_year: i32,
        status: FilingStatus,
        table: RateTable,
    ) -> TaxResult<Self> {
        let rates = self
            .years
            .get_mut(&tax_year)
            .ok_or(TaxError::UnsupportedYear(tax_year))?;
        debug!(tax_year, %status, bands = table.brackets().len(), "replacing income tax table");
        rates.income_tax.replace(status, table);
        Ok(self)
    }

    /// Returns a registry with `rates` added, replacing any schedule already
    /// configured for the same year.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] if `rates` fails validation.
    pub fn with_tax_year(
        mut self,
        rates: TaxYearRates,
    ) -> TaxResult<Self> {
        rates.validate()?;
        let year = rates.tax_year;
        if self.years.insert(year, rates).is_some() {
            debug!(tax_year = year, "replaced tax year schedule");
        } else {
            info!(tax_year = year, "added tax year schedule");
        }
        Ok(self)
    }
}
