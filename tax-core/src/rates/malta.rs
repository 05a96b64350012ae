//! Built-in Maltese schedules.
//!
//! 2025 uses the four-band income tax schedules with their published deduct
//! constants. 2024 uses the earlier five-band schedules, where two adjacent
//! 25% bands meet at 19,500 (single), 28,700 (married) and 21,200
//! (parental); their deduct constants are derived. Contribution, VAT, stamp
//! duty, capital gains and corporate parameters are the same for both years.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::TaxResult;
use crate::models::{
    CapitalGainsRates, Class1Rates, Class2Rates, ContributionCohort, HoldingPeriodBand,
    IncomeTaxSchedules, RateTable, StampDutyRates, TaxBracket, TaxYearRates, VatRates,
};

/// Years with built-in schedules.
pub const SUPPORTED_YEARS: [i32; 2] = [2024, 2025];

pub fn malta_2025() -> TaxResult<TaxYearRates> {
    let income_tax = IncomeTaxSchedules {
        single: RateTable::new(vec![
            TaxBracket::new(dec!(0), Some(dec!(12000)), dec!(0)),
            TaxBracket::new(dec!(12000), Some(dec!(16000)), dec!(0.15)).with_deduct(dec!(1800)),
            TaxBracket::new(dec!(16000), Some(dec!(60000)), dec!(0.25)).with_deduct(dec!(3400)),
            TaxBracket::new(dec!(60000), None, dec!(0.35)).with_deduct(dec!(9400)),
        ])?,
        married: RateTable::new(vec![
            TaxBracket::new(dec!(0), Some(dec!(15000)), dec!(0)),
            TaxBracket::new(dec!(15000), Some(dec!(23000)), dec!(0.15)).with_deduct(dec!(2250)),
            TaxBracket::new(dec!(23000), Some(dec!(60000)), dec!(0.25)).with_deduct(dec!(4550)),
            TaxBracket::new(dec!(60000), None, dec!(0.35)).with_deduct(dec!(10550)),
        ])?,
        parental: RateTable::new(vec![
            TaxBracket::new(dec!(0), Some(dec!(13000)), dec!(0)),
            TaxBracket::new(dec!(13000), Some(dec!(17500)), dec!(0.15)).with_deduct(dec!(1950)),
            TaxBracket::new(dec!(17500), Some(dec!(60000)), dec!(0.25)).with_deduct(dec!(3700)),
            TaxBracket::new(dec!(60000), None, dec!(0.35)).with_deduct(dec!(9700)),
        ])?,
    };

    Ok(with_common_rates(2025, income_tax))
}

pub fn malta_2024() -> TaxResult<TaxYearRates> {
    let income_tax = IncomeTaxSchedules {
        single: five_band_table(dec!(9100), dec!(14500), dec!(19500))?,
        married: five_band_table(dec!(12700), dec!(21200), dec!(28700))?,
        parental: five_band_table(dec!(10500), dec!(15800), dec!(21200))?,
    };

    Ok(with_common_rates(2024, income_tax))
}

/// 0% / 15% / 25% / 25% / 35% with the top band starting at 60,000.
fn five_band_table(
    exempt_to: Decimal,
    fifteen_to: Decimal,
    first_25_to: Decimal,
) -> TaxResult<RateTable> {
    RateTable::new(vec![
        TaxBracket::new(dec!(0), Some(exempt_to), dec!(0)),
        TaxBracket::new(exempt_to, Some(fifteen_to), dec!(0.15)),
        TaxBracket::new(fifteen_to, Some(first_25_to), dec!(0.25)),
        TaxBracket::new(first_25_to, Some(dec!(60000)), dec!(0.25)),
        TaxBracket::new(dec!(60000), None, dec!(0.35)),
    ])
}

fn contribution_cohorts() -> Vec<ContributionCohort> {
    vec![
        ContributionCohort {
            label: "born 1961 or earlier".to_string(),
            born_on_or_before: Some(1961),
            max_weekly_contribution: dec!(45.19),
        },
        ContributionCohort {
            label: "born 1962 or later".to_string(),
            born_on_or_before: None,
            max_weekly_contribution: dec!(54.43),
        },
    ]
}

fn with_common_rates(
    tax_year: i32,
    income_tax: IncomeTaxSchedules,
) -> TaxYearRates {
    TaxYearRates {
        tax_year,
        income_tax,
        vat: VatRates {
            standard: dec!(0.18),
            reduced_tier_1: dec!(0.12),
            reduced_tier_2: dec!(0.07),
            reduced_tier_3: dec!(0.05),
            zero: dec!(0),
        },
        class1: Class1Rates {
            low_wage_ceiling: dec!(221.78),
            adult_age: 18,
            minor_flat_weekly: dec!(6.62),
            adult_flat_weekly: dec!(22.18),
            rate: dec!(0.10),
            cohorts: contribution_cohorts(),
        },
        class2: Class2Rates {
            rate: dec!(0.15),
            minimum_income: dec!(910),
            weeks_per_year: 52,
            cohorts: contribution_cohorts(),
        },
        stamp_duty: StampDutyRates {
            standard_rate: dec!(0.05),
            reduced_rate: dec!(0.035),
            reduced_rate_band: dec!(150000),
            first_time_buyer_threshold: dec!(200000),
        },
        capital_gains: CapitalGainsRates {
            holding_bands: vec![
                HoldingPeriodBand {
                    min_years: 0,
                    rate: dec!(0.35),
                    exemption: None,
                },
                HoldingPeriodBand {
                    min_years: 3,
                    rate: dec!(0),
                    exemption: Some("long-term holding (3 years or more)".to_string()),
                },
            ],
        },
        corporate_rate: dec!(0.35),
    }
}
