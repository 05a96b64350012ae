//! Combined income tax and social security position for one person.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{percentage_of, require_non_negative, round_half_up};
use crate::error::{TaxError, TaxResult};
use crate::models::{
    CalculationDetails, CalculationResult, Class1Input, Class2Input, ContributionClass,
    FilingStatus, IncomeTaxInput, TaxLiabilitySummary,
};

const WEEKS_PER_YEAR: Decimal = dec!(52);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiabilityInput {
    pub annual_income: Decimal,
    pub filing_status: FilingStatus,
    pub employment: ContributionClass,
    pub birth_year: i32,
    /// Employees only. Defaults to annual income spread over 52 weeks.
    #[serde(default)]
    pub weekly_wage: Option<Decimal>,
    #[serde(default)]
    pub deductions: Option<Decimal>,
    #[serde(default)]
    pub credits: Option<Decimal>,
    #[serde(default)]
    pub tax_year: Option<i32>,
}

impl LiabilityInput {
    pub fn new(
        annual_income: Decimal,
        filing_status: FilingStatus,
        employment: ContributionClass,
        birth_year: i32,
    ) -> Self {
        Self {
            annual_income,
            filing_status,
            employment,
            birth_year,
            weekly_wage: None,
            deductions: None,
            credits: None,
            tax_year: None,
        }
    }

    pub fn weekly_wage(
        mut self,
        wage: Decimal,
    ) -> Self {
        self.weekly_wage = Some(wage);
        self
    }

    pub fn deductions(
        mut self,
        deductions: Decimal,
    ) -> Self {
        self.deductions = Some(deductions);
        self
    }

    pub fn credits(
        mut self,
        credits: Decimal,
    ) -> Self {
        self.credits = Some(credits);
        self
    }

    pub fn tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = Some(tax_year);
        self
    }

    pub fn income_tax_input(&self) -> IncomeTaxInput {
        IncomeTaxInput {
            annual_income: self.annual_income,
            filing_status: self.filing_status,
            tax_year: self.tax_year,
            deductions: self.deductions,
            credits: self.credits,
        }
    }

    /// # Errors
    ///
    /// Returns a validation error when neither a weekly wage nor a positive
    /// income is available to derive one from.
    pub fn class1_input(&self) -> TaxResult<Class1Input> {
        let weekly_wage = match self.weekly_wage {
            Some(wage) => wage,
            None => {
                let income = require_non_negative("annual_income", self.annual_income)?;
                if income.is_zero() {
                    return Err(TaxError::validation(
                        "annual_income",
                        "an employee needs a positive income or an explicit weekly wage",
                    ));
                }
                income / WEEKS_PER_YEAR
            }
        };
        Ok(Class1Input {
            weekly_wage,
            birth_year: self.birth_year,
            weeks_worked: None,
            tax_year: self.tax_year,
        })
    }

    pub fn class2_input(&self) -> Class2Input {
        Class2Input {
            annual_income: self.annual_income,
            birth_year: self.birth_year,
            tax_year: self.tax_year,
        }
    }
}

/// Folds an income tax result and a contribution result into one summary.
///
/// Only the employee or self-employed share of contributions counts towards
/// the person's liability. `net_income` is not floored, so it is negative
/// when flat-rate contributions exceed a very low income and
/// `net_income + total_liability` always equals the income.
///
/// # Errors
///
/// Returns a validation error when the overall rate does not fit in a
/// `Decimal`, which only happens for a vanishingly small income.
pub fn summarize(
    input: &LiabilityInput,
    income_tax: CalculationResult,
    social_security: CalculationResult,
) -> TaxResult<TaxLiabilitySummary> {
    let total_income_tax = income_tax.computed_amount;
    let total_social_security = match &social_security.details {
        CalculationDetails::SocialSecurity(details) => details.employee_contribution,
        _ => social_security.computed_amount,
    };
    let total_liability = total_income_tax + total_social_security;

    let overall_effective_rate =
        percentage_of("annual_income", total_liability, input.annual_income)?;

    Ok(TaxLiabilitySummary {
        annual_income: round_half_up(input.annual_income),
        employment: input.employment,
        income_tax,
        social_security,
        total_income_tax,
        total_social_security,
        total_liability,
        net_income: round_half_up(input.annual_income) - total_liability,
        overall_effective_rate,
    })
}
