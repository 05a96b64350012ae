//! Flat-rate VAT in both directions.
//!
//! Exclusive amounts: `vat = net × rate`, `gross = net + vat`.
//! Inclusive amounts: `net = gross ÷ (1 + rate)`, `vat = gross − net`.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{
    as_percentage, percentage_of, require_non_negative, round_half_up,
};
use crate::error::TaxResult;
use crate::models::{Assessment, CalculationDetails, TaxYearRates, VatInput};

#[derive(Debug, Clone)]
pub struct VatCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> VatCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// # Errors
    ///
    /// Returns a validation error when the amount is negative.
    pub fn calculate(
        &self,
        input: &VatInput,
    ) -> TaxResult<Assessment> {
        let amount = require_non_negative("amount", input.amount)?;
        let rate = self.rates.vat.rate(input.category);

        let (net, vat, gross) = if input.amount_includes_vat {
            let net = amount / (Decimal::ONE + rate);
            (net, amount - net, amount)
        } else {
            let vat = amount * rate;
            (amount, vat, amount + vat)
        };

        let net_amount = round_half_up(net);
        let vat_amount = round_half_up(vat);
        let gross_amount = round_half_up(gross);

        debug!(category = %input.category, %net_amount, %vat_amount, "vat calculated");

        Ok(Assessment {
            amount: vat_amount,
            effective_rate: percentage_of("amount", vat, net)?,
            marginal_rate: None,
            breakdown: Vec::new(),
            details: CalculationDetails::Vat {
                category: input.category,
                rate: as_percentage(rate),
                net_amount,
                vat_amount,
                gross_amount,
                amount_includes_vat: input.amount_includes_vat,
            },
        })
    }
}
