use chrono::NaiveDate;
use malta_tax_core::calculations::common::parse_date;
use malta_tax_core::TaxError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a command-line amount cannot be parsed.
#[derive(Debug, Error)]
pub enum ParseAmountError {
    #[error("amount must not be empty")]
    Empty,

    #[error("invalid amount '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Parses a euro amount, accepting commas as thousands separators
/// (`"1,234.56"`) and an optional leading `€`.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = s.trim().trim_start_matches('€').trim().replace(',', "");
    if normalized.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    normalized.parse().map_err(|source| {
        tracing::debug!(input = %s, "rejected amount argument");
        ParseAmountError::Invalid {
            input: s.to_string(),
            source,
        }
    })
}

/// Parses a `YYYY-MM-DD` date argument.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, TaxError> {
    parse_date("date", s)
}
