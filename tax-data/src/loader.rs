use std::collections::BTreeMap;
use std::io::Read;

use malta_tax_core::{FilingStatus, RateRegistry, RateTable, TaxBracket, TaxError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading rate table data.
#[derive(Debug, Error)]
pub enum RateTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid filing status '{0}' (expected single, married or parental)")]
    InvalidFilingStatus(String),

    #[error("Invalid {filing_status} table for {tax_year}: {source}")]
    InvalidTable {
        tax_year: i32,
        filing_status: FilingStatus,
        source: TaxError,
    },

    #[error("Tax year {tax_year} is not built in and the file has no {filing_status} table for it")]
    IncompleteYear {
        tax_year: i32,
        filing_status: FilingStatus,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] TaxError),
}

impl From<csv::Error> for RateTableLoaderError {
    fn from(err: csv::Error) -> Self {
        RateTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the rate table CSV file.
///
/// - `tax_year`: the year the band applies to (e.g. 2025)
/// - `filing_status`: `single`, `married` or `parental`
/// - `lower_bound`: where the band starts
/// - `upper_bound`: where the band ends (empty for the open top band)
/// - `rate`: the band rate as a fraction (e.g. 0.15 for 15%)
/// - `deduct`: published deduct constant (optional, derived when empty)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RateTableRecord {
    pub tax_year: i32,
    pub filing_status: String,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub deduct: Option<Decimal>,
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

/// A validated income tax table read from CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub table: RateTable,
}

/// Loader for income tax rate tables stored as CSV.
///
/// Tables for a built-in year replace that year's schedule for the listed
/// filing statuses. Tables for any other year create a new year, which must
/// then list every filing status; its remaining rates are copied from the
/// closest earlier configured year.
pub struct RateTableLoader;

impl RateTableLoader {
    /// Parse rate table records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RateTableRecord>, RateTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: RateTableRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group records by year and filing status and validate each group as a
    /// [`RateTable`]. Rows within a group may appear in any order.
    pub fn build(records: &[RateTableRecord]) -> Result<Vec<LoadedTable>, RateTableLoaderError> {
        let mut groups: BTreeMap<(i32, FilingStatus), Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            let filing_status: FilingStatus = record.filing_status.parse().map_err(|_| {
                RateTableLoaderError::InvalidFilingStatus(record.filing_status.clone())
            })?;

            let mut bracket = TaxBracket::new(record.lower_bound, record.upper_bound, record.rate);
            if let Some(deduct) = record.deduct {
                bracket = bracket.with_deduct(deduct);
            }
            groups
                .entry((record.tax_year, filing_status))
                .or_default()
                .push(bracket);
        }

        groups
            .into_iter()
            .map(|((tax_year, filing_status), mut brackets)| {
                brackets.sort_by(|a, b| a.lower_bound.cmp(&b.lower_bound));
                let table = RateTable::new(brackets).map_err(|source| {
                    RateTableLoaderError::InvalidTable {
                        tax_year,
                        filing_status,
                        source,
                    }
                })?;
                debug!(tax_year, %filing_status, bands = table.brackets().len(), "built rate table");
                Ok(LoadedTable {
                    tax_year,
                    filing_status,
                    table,
                })
            })
            .collect()
    }

    /// Merge loaded tables into `registry`.
    pub fn apply(
        registry: RateRegistry,
        tables: Vec<LoadedTable>,
    ) -> Result<RateRegistry, RateTableLoaderError> {
        let mut by_year: BTreeMap<i32, Vec<LoadedTable>> = BTreeMap::new();
        for loaded in tables {
            by_year.entry(loaded.tax_year).or_default().push(loaded);
        }

        let mut registry = registry;
        for (tax_year, tables) in by_year {
            let count = tables.len();
            registry = if registry.get(tax_year).is_ok() {
                tables.into_iter().try_fold(registry, |registry, loaded| {
                    registry.with_income_table(tax_year, loaded.filing_status, loaded.table)
                })?
            } else {
                Self::add_year(registry, tax_year, tables)?
            };
            info!(tax_year, tables = count, "applied rate tables");
        }

        Ok(registry)
    }

    /// Parse, build and apply in one step.
    pub fn load<R: Read>(
        registry: RateRegistry,
        reader: R,
    ) -> Result<RateRegistry, RateTableLoaderError> {
        let records = Self::parse(reader)?;
        let tables = Self::build(&records)?;
        Self::apply(registry, tables)
    }

    fn add_year(
        registry: RateRegistry,
        tax_year: i32,
        mut tables: Vec<LoadedTable>,
    ) -> Result<RateRegistry, RateTableLoaderError> {
        let years = registry.years();
        let base_year = years
            .iter()
            .rev()
            .find(|year| **year < tax_year)
            .or(years.first())
            .copied()
            .unwrap_or(tax_year);

        let mut rates = registry.get(base_year)?.clone();
        rates.tax_year = tax_year;
        for filing_status in FilingStatus::ALL {
            let position = tables
                .iter()
                .position(|loaded| loaded.filing_status == filing_status)
                .ok_or(RateTableLoaderError::IncompleteYear {
                    tax_year,
                    filing_status,
                })?;
            let loaded = tables.swap_remove(position);
            rates.income_tax.replace(filing_status, loaded.table);
        }

        info!(tax_year, base_year, "adding tax year from rate tables");
        Ok(registry.with_tax_year(rates)?)
    }
}
