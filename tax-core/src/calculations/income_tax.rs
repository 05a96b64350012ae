//! Progressive personal income tax.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Taxable income = annual income − allowable deductions (minimum 0) |
//! | 2    | Gross tax from the filing status' rate table |
//! | 3    | Net tax = gross tax − tax credits (minimum 0) |
//! | 4    | Effective rate = net tax ÷ annual income |

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::brackets::resolve;
use crate::calculations::common::{
    as_percentage, non_negative, optional_amount, percentage_of, require_non_negative,
    round_half_up,
};
use crate::error::TaxResult;
use crate::models::{Assessment, CalculationDetails, IncomeTaxInput, TaxYearRates};

/// Income tax calculator bound to one year's schedules.
#[derive(Debug, Clone)]
pub struct IncomeTaxCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> IncomeTaxCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    /// # Errors
    ///
    /// Returns a validation error when income, deductions or credits are
    /// negative.
    pub fn calculate(
        &self,
        input: &IncomeTaxInput,
    ) -> TaxResult<Assessment> {
        let annual_income = require_non_negative("annual_income", input.annual_income)?;
        let deductions = optional_amount("deductions", input.deductions)?;
        let credits = optional_amount("credits", input.credits)?;

        let taxable_income = self.taxable_income(annual_income, deductions);
        let table = self.rates.income_tax.table(input.filing_status);
        let resolution = resolve(table, taxable_income);

        let net_tax = non_negative(resolution.total_tax - credits);
        let credits_applied = credits.min(resolution.total_tax);
        let amount = round_half_up(net_tax);

        debug!(
            tax_year = self.rates.tax_year,
            status = %input.filing_status,
            %taxable_income,
            %amount,
            "income tax calculated"
        );

        Ok(Assessment {
            amount,
            effective_rate: percentage_of("annual_income", amount, annual_income)?,
            marginal_rate: Some(as_percentage(resolution.marginal_rate)),
            breakdown: resolution
                .portions
                .iter()
                .map(|portion| portion.to_breakdown_line())
                .collect(),
            details: CalculationDetails::IncomeTax {
                filing_status: input.filing_status,
                taxable_income: round_half_up(taxable_income),
                gross_tax: round_half_up(resolution.total_tax),
                credits_applied: round_half_up(credits_applied),
                net_income: round_half_up(annual_income - net_tax),
            },
        })
    }

    fn taxable_income(
        &self,
        annual_income: Decimal,
        deductions: Decimal,
    ) -> Decimal {
        if deductions > annual_income {
            debug!(%annual_income, %deductions, "deductions exceed income, taxable income is zero");
        }
        non_negative(annual_income - deductions)
    }
}
