//! Flat-rate corporate income tax on chargeable profit.

use tracing::debug;

use crate::calculations::common::{
    as_percentage, percentage_of, require_non_negative, round_half_up,
};
use crate::error::TaxResult;
use crate::models::{Assessment, CalculationDetails, CorporateTaxInput, TaxYearRates};

#[derive(Debug, Clone)]
pub struct CorporateTaxCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> CorporateTaxCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// # Errors
    ///
    /// Returns a validation error when profit is negative.
    pub fn calculate(
        &self,
        input: &CorporateTaxInput,
    ) -> TaxResult<Assessment> {
        let profit = require_non_negative("annual_profit", input.annual_profit)?;
        let rate = self.rates.corporate_rate;
        let tax = profit * rate;
        let amount = round_half_up(tax);

        debug!(%profit, %amount, "corporate tax calculated");

        Ok(Assessment {
            amount,
            effective_rate: percentage_of("annual_profit", tax, profit)?,
            marginal_rate: None,
            breakdown: Vec::new(),
            details: CalculationDetails::CorporateTax {
                annual_profit: round_half_up(profit),
                rate: as_percentage(rate),
                net_profit: round_half_up(profit - tax),
            },
        })
    }
}
