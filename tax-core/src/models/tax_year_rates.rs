use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{TaxError, TaxResult};
use crate::models::{FilingStatus, RateTable, VatCategory};

/// Income tax schedules for one year, one per filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeTaxSchedules {
    pub single: RateTable,
    pub married: RateTable,
    pub parental: RateTable,
}

impl IncomeTaxSchedules {
    pub fn table(
        &self,
        status: FilingStatus,
    ) -> &RateTable {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::Married => &self.married,
            FilingStatus::Parental => &self.parental,
        }
    }

    pub fn replace(
        &mut self,
        status: FilingStatus,
        table: RateTable,
    ) {
        match status {
            FilingStatus::Single => self.single = table,
            FilingStatus::Married => self.married = table,
            FilingStatus::Parental => self.parental = table,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VatRates {
    pub standard: Decimal,
    pub reduced_tier_1: Decimal,
    pub reduced_tier_2: Decimal,
    pub reduced_tier_3: Decimal,
    pub zero: Decimal,
}

impl VatRates {
    pub fn rate(
        &self,
        category: VatCategory,
    ) -> Decimal {
        match category {
            VatCategory::Standard => self.standard,
            VatCategory::ReducedTier1 => self.reduced_tier_1,
            VatCategory::ReducedTier2 => self.reduced_tier_2,
            VatCategory::ReducedTier3 => self.reduced_tier_3,
            VatCategory::Zero => self.zero,
        }
    }
}

/// Contribution cap applying to people born up to a given year.
///
/// Cohorts are ordered oldest first; the last one has
/// `born_on_or_before = None` and catches everyone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionCohort {
    pub label: String,
    pub born_on_or_before: Option<i32>,
    pub max_weekly_contribution: Decimal,
}

/// Class 1 (employee) weekly contribution bands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Class1Rates {
    /// Weekly wages at or below this pay a flat amount (categories A and B).
    pub low_wage_ceiling: Decimal,
    /// Age, reached during the assessment year, below which category A applies.
    pub adult_age: i32,
    pub minor_flat_weekly: Decimal,
    pub adult_flat_weekly: Decimal,
    /// Percentage of wage paid by each of employee and employer above the
    /// low-wage ceiling.
    pub rate: Decimal,
    pub cohorts: Vec<ContributionCohort>,
}

/// Class 2 (self-employed) annual contribution parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Class2Rates {
    pub rate: Decimal,
    /// Income at or below this owes no contribution.
    pub minimum_income: Decimal,
    pub weeks_per_year: u32,
    pub cohorts: Vec<ContributionCohort>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StampDutyRates {
    pub standard_rate: Decimal,
    pub reduced_rate: Decimal,
    /// Portion of a primary residence's value charged at `reduced_rate`.
    pub reduced_rate_band: Decimal,
    /// Value up to which a first-time buyer's primary residence is exempt.
    pub first_time_buyer_threshold: Decimal,
}

/// Capital gains rate selected by whole years of ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldingPeriodBand {
    pub min_years: u32,
    pub rate: Decimal,
    pub exemption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapitalGainsRates {
    /// Ordered by `min_years`, the first band starting at zero.
    pub holding_bands: Vec<HoldingPeriodBand>,
}

impl CapitalGainsRates {
    /// `None` only when there are no bands at all.
    pub fn band_for(
        &self,
        holding_years: u32,
    ) -> Option<&HoldingPeriodBand> {
        self.holding_bands
            .iter()
            .rev()
            .find(|band| band.min_years <= holding_years)
            .or_else(|| self.holding_bands.first())
    }
}

/// Every rate the engine needs for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxYearRates {
    pub tax_year: i32,
    pub income_tax: IncomeTaxSchedules,
    pub vat: VatRates,
    pub class1: Class1Rates,
    pub class2: Class2Rates,
    pub stamp_duty: StampDutyRates,
    pub capital_gains: CapitalGainsRates,
    pub corporate_rate: Decimal,
}

impl TaxYearRates {
    /// Checks the non-bracket parameters. Bracket tables are validated when
    /// they are built.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] describing the first inconsistency.
    pub fn validate(&self) -> TaxResult<()> {
        let year = self.tax_year;

        for category in VatCategory::ALL {
            check_fraction(year, category.as_str(), self.vat.rate(category))?;
        }

        check_fraction(year, "class 1 rate", self.class1.rate)?;
        if self.class1.rate == Decimal::ZERO {
            return Err(TaxError::configuration(format!(
                "{year}: class 1 rate must be positive"
            )));
        }
        check_non_negative(year, "class 1 low wage ceiling", self.class1.low_wage_ceiling)?;
        check_non_negative(year, "class 1 minor flat amount", self.class1.minor_flat_weekly)?;
        check_non_negative(year, "class 1 adult flat amount", self.class1.adult_flat_weekly)?;
        check_cohorts(year, "class 1", &self.class1.cohorts)?;

        check_fraction(year, "class 2 rate", self.class2.rate)?;
        check_non_negative(year, "class 2 minimum income", self.class2.minimum_income)?;
        if self.class2.weeks_per_year == 0 {
            return Err(TaxError::configuration(format!(
                "{year}: class 2 weeks per year must be positive"
            )));
        }
        check_cohorts(year, "class 2", &self.class2.cohorts)?;

        let stamp = &self.stamp_duty;
        check_fraction(year, "stamp duty standard rate", stamp.standard_rate)?;
        check_fraction(year, "stamp duty reduced rate", stamp.reduced_rate)?;
        check_non_negative(year, "stamp duty reduced band", stamp.reduced_rate_band)?;
        check_non_negative(
            year,
            "first-time buyer threshold",
            stamp.first_time_buyer_threshold,
        )?;

        check_holding_bands(year, &self.capital_gains.holding_bands)?;
        check_fraction(year, "corporate rate", self.corporate_rate)
    }
}

/// Picks the cohort for `birth_year`, falling back to the last cohort.
/// `None` only when the list is empty.
pub fn cohort_for(
    cohorts: &[ContributionCohort],
    birth_year: i32,
) -> Option<&ContributionCohort> {
    cohorts
        .iter()
        .find(|cohort| cohort.born_on_or_before.is_none_or(|limit| birth_year <= limit))
        .or_else(|| cohorts.last())
}

fn check_fraction(
    year: i32,
    name: &str,
    value: Decimal,
) -> TaxResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(TaxError::configuration(format!(
            "{year}: {name} must be between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

fn check_non_negative(
    year: i32,
    name: &str,
    value: Decimal,
) -> TaxResult<()> {
    if value < Decimal::ZERO {
        return Err(TaxError::configuration(format!(
            "{year}: {name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

fn check_cohorts(
    year: i32,
    name: &str,
    cohorts: &[ContributionCohort],
) -> TaxResult<()> {
    let Some(last) = cohorts.last() else {
        return Err(TaxError::configuration(format!("{year}: {name} has no cohorts")));
    };
    if last.born_on_or_before.is_some() {
        return Err(TaxError::configuration(format!(
            "{year}: last {name} cohort must not have a birth-year limit"
        )));
    }

    let mut previous_limit: Option<i32> = None;
    for cohort in cohorts {
        check_non_negative(year, name, cohort.max_weekly_contribution)?;
        if let (Some(previous), Some(limit)) = (previous_limit, cohort.born_on_or_before) {
            if limit <= previous {
                return Err(TaxError::configuration(format!(
                    "{year}: {name} cohorts must be ordered by birth year"
                )));
            }
        }
        if cohort.born_on_or_before.is_none() && !std::ptr::eq(cohort, last) {
            return Err(TaxError::configuration(format!(
                "{year}: only the last {name} cohort may be open"
            )));
        }
        previous_limit = cohort.born_on_or_before;
    }
    Ok(())
}

fn check_holding_bands(
    year: i32,
    bands: &[HoldingPeriodBand],
) -> TaxResult<()> {
    match bands.first() {
        None => {
            return Err(TaxError::configuration(format!(
                "{year}: capital gains schedule has no holding bands"
            )));
        }
        Some(first) if first.min_years != 0 => {
            return Err(TaxError::configuration(format!(
                "{year}: first holding band must start at 0 years"
            )));
        }
        Some(_) => {}
    }

    for pair in bands.windows(2) {
        if pair[1].min_years <= pair[0].min_years {
            return Err(TaxError::configuration(format!(
                "{year}: holding bands must be strictly increasing, {} follows {}",
                pair[1].min_years, pair[0].min_years
            )));
        }
    }
    for band in bands {
        check_fraction(year, "capital gains rate", band.rate)?;
    }
    Ok(())
}
