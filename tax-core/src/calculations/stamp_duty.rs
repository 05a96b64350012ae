//! Stamp duty on property transfers.
//!
//! Eligibility picks the structure before the value is looked at, in this
//! order:
//!
//! 1. First-time buyer of a primary residence worth up to the exemption
//!    threshold: exempt up to the threshold, standard rate on any excess.
//! 2. Any other primary residence: reduced rate on the first band, standard
//!    rate above it.
//! 3. Everything else: standard rate on the full value.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{
    as_percentage, non_negative, percentage_of, require_positive, round_half_up,
};
use crate::error::TaxResult;
use crate::models::{
    Assessment, BreakdownLine, CalculationDetails, StampDutyInput, StampDutyRates, StampDutyTier,
    TaxYearRates,
};

#[derive(Debug, Clone)]
pub struct StampDutyCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> StampDutyCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// # Errors
    ///
    /// Returns a validation error when the property value is not positive.
    pub fn calculate(
        &self,
        input: &StampDutyInput,
    ) -> TaxResult<Assessment> {
        let value = require_positive("property_value", input.property_value)?;
        let rates = &self.rates.stamp_duty;
        let tier = tier_for(rates, input, value);

        let lines = match tier {
            StampDutyTier::FirstTimeBuyerExemption => split(
                value,
                rates.first_time_buyer_threshold,
                Decimal::ZERO,
                rates.standard_rate,
            ),
            StampDutyTier::PrimaryResidence => split(
                value,
                rates.reduced_rate_band,
                rates.reduced_rate,
                rates.standard_rate,
            ),
            StampDutyTier::Standard => vec![line(Decimal::ZERO, None, rates.standard_rate, value)],
        };

        let duty: Decimal = lines.iter().map(|(_, tax)| *tax).sum();
        let amount = round_half_up(duty);

        debug!(?tier, %value, %amount, "stamp duty calculated");

        Ok(Assessment {
            amount,
            effective_rate: percentage_of("property_value", duty, value)?,
            marginal_rate: None,
            breakdown: lines.into_iter().map(|(line, _)| line).collect(),
            details: CalculationDetails::StampDuty {
                tier,
                property_value: round_half_up(value),
            },
        })
    }
}

fn tier_for(
    rates: &StampDutyRates,
    input: &StampDutyInput,
    value: Decimal,
) -> StampDutyTier {
    if input.is_first_time_buyer
        && input.is_primary_residence
        && value <= rates.first_time_buyer_threshold
    {
        StampDutyTier::FirstTimeBuyerExemption
    } else if input.is_primary_residence {
        StampDutyTier::PrimaryResidence
    } else {
        StampDutyTier::Standard
    }
}

/// Charges `lower_rate` up to `band` and `upper_rate` above it. The upper line
/// is only present when the value exceeds the band.
fn split(
    value: Decimal,
    band: Decimal,
    lower_rate: Decimal,
    upper_rate: Decimal,
) -> Vec<(BreakdownLine, Decimal)> {
    let lower = value.min(band);
    let excess = non_negative(value - band);

    let mut lines = vec![line(Decimal::ZERO, Some(band), lower_rate, lower)];
    if excess > Decimal::ZERO {
        lines.push(line(band, None, upper_rate, excess));
    }
    lines
}

/// One breakdown line plus its unrounded duty.
fn line(
    lower_bound: Decimal,
    upper_bound: Option<Decimal>,
    rate: Decimal,
    taxable: Decimal,
) -> (BreakdownLine, Decimal) {
    let tax = taxable * rate;
    let label = match upper_bound {
        Some(upper) => format!("{lower_bound} to {upper}"),
        None if lower_bound.is_zero() => "full value".to_string(),
        None => format!("over {lower_bound}"),
    };
    let line = BreakdownLine {
        label,
        lower_bound,
        upper_bound,
        rate: as_percentage(rate),
        taxable_amount: round_half_up(taxable),
        tax: round_half_up(tax),
    };
    (line, tax)
}
