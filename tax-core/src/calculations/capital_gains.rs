//! Capital gains on disposal of an asset.
//!
//! `gain = max(0, sale − purchase − improvements − selling costs)`, taxed at
//! the rate of the holding-period band reached by whole years of ownership.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{
    as_percentage, non_negative, optional_amount, percentage_of, require_non_negative,
    round_half_up, whole_years_between,
};
use crate::error::{TaxError, TaxResult};
use crate::models::{
    Assessment, BreakdownLine, CalculationDetails, CapitalGainsInput, TaxYearRates,
};

#[derive(Debug, Clone)]
pub struct CapitalGainsCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> CapitalGainsCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// # Errors
    ///
    /// Returns a validation error when a price or cost is negative, or when
    /// the sale date is not after the purchase date.
    pub fn calculate(
        &self,
        input: &CapitalGainsInput,
    ) -> TaxResult<Assessment> {
        let purchase_price = require_non_negative("purchase_price", input.purchase_price)?;
        let sale_price = require_non_negative("sale_price", input.sale_price)?;
        let improvement_costs = optional_amount("improvement_costs", input.improvement_costs)?;
        let selling_costs = optional_amount("selling_costs", input.selling_costs)?;

        if input.sale_date <= input.purchase_date {
            return Err(TaxError::validation(
                "sale_date",
                format!(
                    "{} must be after the purchase date {}",
                    input.sale_date, input.purchase_date
                ),
            ));
        }

        let adjusted_cost_base = purchase_price + improvement_costs + selling_costs;
        let gain = non_negative(sale_price - adjusted_cost_base);
        let holding_years = whole_years_between(input.purchase_date, input.sale_date);
        let band = self.rates.capital_gains.band_for(holding_years).ok_or_else(|| {
            TaxError::configuration(format!("{}: no holding period bands", self.rates.tax_year))
        })?;
        let tax = gain * band.rate;
        let amount = round_half_up(tax);

        if gain.is_zero() {
            debug!(%sale_price, %adjusted_cost_base, "disposal at a loss or break-even");
        }
        debug!(holding_years, rate = %band.rate, %gain, %amount, "capital gains calculated");

        let breakdown = if gain.is_zero() {
            Vec::new()
        } else {
            vec![BreakdownLine {
                label: band.exemption.clone().unwrap_or_else(|| {
                    format!("held {holding_years} year(s)")
                }),
                lower_bound: Decimal::ZERO,
                upper_bound: None,
                rate: as_percentage(band.rate),
                taxable_amount: round_half_up(gain),
                tax: amount,
            }]
        };

        Ok(Assessment {
            amount,
            effective_rate: percentage_of("sale_price", tax, gain)?,
            marginal_rate: None,
            breakdown,
            details: CalculationDetails::CapitalGains {
                adjusted_cost_base: round_half_up(adjusted_cost_base),
                capital_gain: round_half_up(gain),
                holding_period_years: holding_years,
                rate: as_percentage(band.rate),
                exemption: band.exemption.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::rates::malta_2025;

    fn date(
        year: i32,
        month: u32,
        day: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn calculate(input: CapitalGainsInput) -> TaxResult<Assessment> {
        let rates = malta_2025().unwrap();
        CapitalGainsCalculator::new(&rates).calculate(&input)
    }

    fn gain_and_years(result: &Assessment) -> (Decimal, u32, Option<String>) {
        match &result.details {
            CalculationDetails::CapitalGains {
                capital_gain,
                holding_period_years,
                exemption,
                ..
            } => (*capital_gain, *holding_period_years, exemption.clone()),
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn long_holding_is_exempt() {
        let result = calculate(CapitalGainsInput::new(
            dec!(100000),
            dec!(150000),
            date(2010, 1, 15),
            date(2025, 6, 1),
        ))
        .unwrap();

        let (gain, years, exemption) = gain_and_years(&result);
        assert_eq!(gain, dec!(50000.00));
        assert_eq!(years, 15);
        assert_eq!(result.amount, dec!(0));
        assert_eq!(exemption.as_deref(), Some("long-term holding (3 years or more)"));
    }

    #[test]
    fn short_holding_is_taxed_at_full_rate() {
        let result = calculate(CapitalGainsInput::new(
            dec!(100000),
            dec!(150000),
            date(2023, 6, 1),
            date(2025, 6, 1),
        ))
        .unwrap();

        let (gain, years, exemption) = gain_and_years(&result);
        assert_eq!(gain, dec!(50000.00));
        assert_eq!(years, 2);
        assert_eq!(result.amount, dec!(17500.00));
        assert_eq!(result.effective_rate, dec!(35.00));
        assert_eq!(exemption, None);
    }

    #[test]
    fn holding_period_counts_completed_years_only() {
        let day_before = calculate(CapitalGainsInput::new(
            dec!(1000),
            dec!(2000),
            date(2022, 6, 2),
            date(2025, 6, 1),
        ))
        .unwrap();
        let anniversary = calculate(CapitalGainsInput::new(
            dec!(1000),
            dec!(2000),
            date(2022, 6, 1),
            date(2025, 6, 1),
        ))
        .unwrap();

        assert_eq!(gain_and_years(&day_before).1, 2);
        assert_eq!(day_before.amount, dec!(350.00));
        assert_eq!(gain_and_years(&anniversary).1, 3);
        assert_eq!(anniversary.amount, dec!(0));
    }

    #[test]
    fn costs_reduce_the_gain() {
        let result = calculate(
            CapitalGainsInput::new(dec!(100000), dec!(150000), date(2024, 1, 1), date(2025, 1, 1))
                .improvement_costs(dec!(20000))
                .selling_costs(dec!(5000)),
        )
        .unwrap();

        assert_eq!(gain_and_years(&result).0, dec!(25000.00));
        assert_eq!(result.amount, dec!(8750.00));
    }

    #[test]
    fn loss_owes_nothing() {
        let result = calculate(CapitalGainsInput::new(
            dec!(150000),
            dec!(100000),
            date(2024, 1, 1),
            date(2025, 1, 1),
        ))
        .unwrap();

        assert_eq!(gain_and_years(&result).0, dec!(0));
        assert_eq!(result.amount, dec!(0));
        assert_eq!(result.effective_rate, dec!(0));
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn rejects_sale_on_or_before_purchase() {
        for sale_date in [date(2025, 1, 1), date(2024, 12, 31)] {
            let err = calculate(CapitalGainsInput::new(
                dec!(1000),
                dec!(2000),
                date(2025, 1, 1),
                sale_date,
            ))
            .unwrap_err();

            assert_eq!(err.field(), Some("sale_date"));
        }
    }

    #[test]
    fn rejects_negative_costs() {
        let err = calculate(
            CapitalGainsInput::new(dec!(1000), dec!(2000), date(2024, 1, 1), date(2025, 1, 1))
                .selling_costs(dec!(-1)),
        )
        .unwrap_err();

        assert_eq!(err.field(), Some("selling_costs"));
    }
}
