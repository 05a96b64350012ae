//! Social security contributions.
//!
//! # Class 1 (employees)
//!
//! | Category | Weekly wage | Weekly contribution, each of employee and employer |
//! |----------|-------------|-----------------------------------------------------|
//! | A        | ≤ low-wage ceiling, under 18 | reduced flat amount |
//! | B        | ≤ low-wage ceiling, 18 or over | flat amount |
//! | C        | above the ceiling | wage × rate |
//! | D        | wage × rate above the cohort cap | cohort cap |
//!
//! Weekly amounts are annualised by the weeks worked.
//!
//! # Class 2 (self-employed)
//!
//! `annual income × rate`, capped at the cohort's weekly cap × 52, and zero at
//! or below the minimum income.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{
    as_percentage, percentage_of, require_non_negative, require_positive, round_half_up,
};
use crate::error::{TaxError, TaxResult};
use crate::models::{
    Assessment, CalculationDetails, Class1Category, Class1Input, Class2Input, ContributionClass,
    ContributionDetails, TaxYearRates, cohort_for,
};

const MAX_WEEKS: u32 = 52;
const MAX_AGE: i32 = 130;

/// Age reached during the assessment year.
fn age_in_year(
    birth_year: i32,
    tax_year: i32,
) -> TaxResult<i32> {
    let age = tax_year - birth_year;
    if age < 0 {
        return Err(TaxError::validation(
            "birth_year",
            format!("{birth_year} is after the assessment year {tax_year}"),
        ));
    }
    if age > MAX_AGE {
        return Err(TaxError::validation(
            "birth_year",
            format!("{birth_year} is implausibly early for assessment year {tax_year}"),
        ));
    }
    Ok(age)
}

#[derive(Debug, Clone)]
pub struct SocialSecurityCalculator<'a> {
    rates: &'a TaxYearRates,
}

impl<'a> SocialSecurityCalculator<'a> {
    pub fn new(rates: &'a TaxYearRates) -> Self {
        Self { rates }
    }

    fn missing_cohorts(&self) -> TaxError {
        TaxError::configuration(format!("{}: no contribution cohorts", self.rates.tax_year))
    }

    /// Class 1 contributions for an employee.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the weekly wage is not positive, the
    /// weeks worked are outside 1 to 52, or the birth year is after the
    /// assessment year.
    pub fn class1(
        &self,
        input: &Class1Input,
    ) -> TaxResult<Assessment> {
        let rates = &self.rates.class1;
        let weekly_wage = require_positive("weekly_wage", input.weekly_wage)?;
        let weeks = input.weeks_worked.unwrap_or(MAX_WEEKS);
        if !(1..=MAX_WEEKS).contains(&weeks) {
            return Err(TaxError::validation(
                "weeks_worked",
                format!("must be between 1 and {MAX_WEEKS}, got {weeks}"),
            ));
        }
        let age = age_in_year(input.birth_year, self.rates.tax_year)?;
        let cohort = cohort_for(&rates.cohorts, input.birth_year)
            .ok_or_else(|| self.missing_cohorts())?;
        let is_minor = age < rates.adult_age;

        let (category, weekly) = if weekly_wage <= rates.low_wage_ceiling {
            if is_minor {
                (Class1Category::A, rates.minor_flat_weekly)
            } else {
                (Class1Category::B, rates.adult_flat_weekly)
            }
        } else {
            let percentage = weekly_wage * rates.rate;
            if percentage > cohort.max_weekly_contribution {
                (Class1Category::D, cohort.max_weekly_contribution)
            } else {
                (Class1Category::C, percentage)
            }
        };

        let weeks_factor = Decimal::from(weeks);
        let employee_annual = weekly * weeks_factor;
        let employer_annual = weekly * weeks_factor;
        let total = employee_annual + employer_annual;
        let amount = round_half_up(total);

        let age_band = if is_minor {
            format!("under {}", rates.adult_age)
        } else {
            cohort.label.clone()
        };

        debug!(?category, %weekly_wage, weeks, %amount, "class 1 contribution calculated");

        Ok(Assessment {
            amount,
            effective_rate: percentage_of("weekly_wage", total, weekly_wage * weeks_factor)?,
            marginal_rate: None,
            breakdown: Vec::new(),
            details: CalculationDetails::SocialSecurity(ContributionDetails {
                class: ContributionClass::Employee,
                category: Some(category),
                age_band,
                weeks,
                employee_weekly: Some(round_half_up(weekly)),
                employer_weekly: Some(round_half_up(weekly)),
                employee_contribution: round_half_up(employee_annual),
                employer_contribution: Some(round_half_up(employer_annual)),
                total_contribution: amount,
                contribution_rate: percentage_of("weekly_wage", weekly, weekly_wage)?,
                capped: category == Class1Category::D,
                below_threshold: false,
            }),
        })
    }

    /// Class 2 contributions for a self-employed person.
    ///
    /// # Errors
    ///
    /// Returns a validation error when income is negative or the birth year
    /// is after the assessment year.
    pub fn class2(
        &self,
        input: &Class2Input,
    ) -> TaxResult<Assessment> {
        let rates = &self.rates.class2;
        let annual_income = require_non_negative("annual_income", input.annual_income)?;
        age_in_year(input.birth_year, self.rates.tax_year)?;
        let cohort = cohort_for(&rates.cohorts, input.birth_year)
            .ok_or_else(|| self.missing_cohorts())?;
        let weeks = Decimal::from(rates.weeks_per_year);

        let below_threshold = annual_income <= rates.minimum_income;
        let (contribution, capped) = if below_threshold {
            (Decimal::ZERO, false)
        } else {
            let calculated = annual_income * rates.rate;
            let cap = cohort.max_weekly_contribution * weeks;
            (calculated.min(cap), calculated > cap)
        };
        let amount = round_half_up(contribution);

        debug!(%annual_income, below_threshold, capped, %amount, "class 2 contribution calculated");

        Ok(Assessment {
            amount,
            effective_rate: percentage_of("annual_income", contribution, annual_income)?,
            marginal_rate: None,
            breakdown: Vec::new(),
            details: CalculationDetails::SocialSecurity(ContributionDetails {
                class: ContributionClass::SelfEmployed,
                category: None,
                age_band: cohort.label.clone(),
                weeks: rates.weeks_per_year,
                employee_weekly: Some(round_half_up(contribution / weeks)),
                employer_weekly: None,
                employee_contribution: amount,
                employer_contribution: None,
                total_contribution: amount,
                contribution_rate: if below_threshold {
                    Decimal::ZERO
                } else {
                    as_percentage(rates.rate)
                },
                capped,
                below_threshold,
            }),
        })
    }
}
