use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use malta_tax_core::{
    CalculationInput, CapitalGainsInput, Class1Input, Class2Input, ContributionClass,
    CorporateTaxInput, FilingStatus, IncomeTaxInput, LiabilityInput, StampDutyInput, VatCategory,
    VatInput,
};
use rust_decimal::Decimal;

use crate::args::{parse_amount, parse_date_arg};

/// Maltese tax calculator.
///
/// Runs one calculation against the built-in 2024/2025 schedules, optionally
/// extended from a rate table CSV, and prints the result as JSON.
#[derive(Debug, Parser)]
#[command(name = "malta-tax", version)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Tax year to calculate for. Defaults to the configured year.
    #[arg(long, global = true)]
    pub year: Option<i32>,

    /// CSV file of income tax rate tables loaded over the built-in ones.
    #[arg(long, global = true)]
    pub brackets: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Progressive income tax.
    IncomeTax {
        #[arg(long, value_parser = parse_amount)]
        income: Decimal,
        /// single, married or parental.
        #[arg(long, default_value = "single")]
        status: FilingStatus,
        #[arg(long, value_parser = parse_amount)]
        deductions: Option<Decimal>,
        #[arg(long, value_parser = parse_amount)]
        credits: Option<Decimal>,
    },

    /// Value added tax on a net or gross amount.
    Vat {
        #[arg(long, value_parser = parse_amount)]
        amount: Decimal,
        /// standard, reduced_tier_1, reduced_tier_2, reduced_tier_3 or zero.
        #[arg(long, default_value = "standard")]
        category: VatCategory,
        /// Treat the amount as already including VAT.
        #[arg(long)]
        includes_vat: bool,
    },

    /// Class 1 social security for an employee.
    Class1 {
        #[arg(long, value_parser = parse_amount)]
        weekly_wage: Decimal,
        #[arg(long)]
        birth_year: i32,
        #[arg(long)]
        weeks: Option<u32>,
    },

    /// Class 2 social security for a self-employed person.
    Class2 {
        #[arg(long, value_parser = parse_amount)]
        income: Decimal,
        #[arg(long)]
        birth_year: i32,
    },

    /// Stamp duty on a property transfer.
    StampDuty {
        #[arg(long, value_parser = parse_amount)]
        value: Decimal,
        #[arg(long)]
        first_time_buyer: bool,
        #[arg(long)]
        primary_residence: bool,
    },

    /// Capital gains tax on a disposal.
    CapitalGains {
        #[arg(long, value_parser = parse_amount)]
        purchase_price: Decimal,
        #[arg(long, value_parser = parse_amount)]
        sale_price: Decimal,
        #[arg(long, value_parser = parse_date_arg)]
        purchase_date: NaiveDate,
        #[arg(long, value_parser = parse_date_arg)]
        sale_date: NaiveDate,
        #[arg(long, value_parser = parse_amount)]
        improvement_costs: Option<Decimal>,
        #[arg(long, value_parser = parse_amount)]
        selling_costs: Option<Decimal>,
    },

    /// Flat corporate income tax.
    CorporateTax {
        #[arg(long, value_parser = parse_amount)]
        profit: Decimal,
    },

    /// Income tax and social security together.
    Liability {
        #[arg(long, value_parser = parse_amount)]
        income: Decimal,
        #[arg(long, default_value = "single")]
        status: FilingStatus,
        /// employee or self_employed.
        #[arg(long, default_value = "employee")]
        employment: ContributionClass,
        #[arg(long)]
        birth_year: i32,
        #[arg(long, value_parser = parse_amount)]
        weekly_wage: Option<Decimal>,
        #[arg(long, value_parser = parse_amount)]
        deductions: Option<Decimal>,
        #[arg(long, value_parser = parse_amount)]
        credits: Option<Decimal>,
    },

    /// Print the rates in force for a year.
    Rates {
        /// Only print the income tax table for this filing status.
        #[arg(long)]
        status: Option<FilingStatus>,
    },

    /// List the supported tax years.
    Years,

    /// Run a JSON-encoded calculation request.
    Evaluate {
        /// Request file, or `-` for standard input.
        file: PathBuf,
    },
}

impl Command {
    /// The single calculation this command describes, if it is one.
    pub fn calculation_input(
        &self,
        tax_year: Option<i32>,
    ) -> Option<CalculationInput> {
        let input = match self {
            Self::IncomeTax {
                income,
                status,
                deductions,
                credits,
            } => CalculationInput::IncomeTax(IncomeTaxInput {
                annual_income: *income,
                filing_status: *status,
                tax_year,
                deductions: *deductions,
                credits: *credits,
            }),
            Self::Vat {
                amount,
                category,
                includes_vat,
            } => CalculationInput::Vat(VatInput {
                amount: *amount,
                category: *category,
                amount_includes_vat: *includes_vat,
                tax_year,
            }),
            Self::Class1 {
                weekly_wage,
                birth_year,
                weeks,
            } => CalculationInput::SocialSecurityClass1(Class1Input {
                weekly_wage: *weekly_wage,
                birth_year: *birth_year,
                weeks_worked: *weeks,
                tax_year,
            }),
            Self::Class2 { income, birth_year } => {
                CalculationInput::SocialSecurityClass2(Class2Input {
                    annual_income: *income,
                    birth_year: *birth_year,
                    tax_year,
                })
            }
            Self::StampDuty {
                value,
                first_time_buyer,
                primary_residence,
            } => CalculationInput::StampDuty(StampDutyInput {
                property_value: *value,
                is_first_time_buyer: *first_time_buyer,
                is_primary_residence: *primary_residence,
                tax_year,
            }),
            Self::CapitalGains {
                purchase_price,
                sale_price,
                purchase_date,
                sale_date,
                improvement_costs,
                selling_costs,
            } => CalculationInput::CapitalGains(CapitalGainsInput {
                purchase_price: *purchase_price,
                sale_price: *sale_price,
                purchase_date: *purchase_date,
                sale_date: *sale_date,
                improvement_costs: *improvement_costs,
                selling_costs: *selling_costs,
                tax_year,
            }),
            Self::CorporateTax { profit } => CalculationInput::CorporateTax(CorporateTaxInput {
                annual_profit: *profit,
                tax_year,
            }),
            Self::Liability { .. } | Self::Rates { .. } | Self::Years | Self::Evaluate { .. } => {
                return None;
            }
        };
        Some(input)
    }

    pub fn liability_input(
        &self,
        tax_year: Option<i32>,
    ) -> Option<LiabilityInput> {
        match self {
            Self::Liability {
                income,
                status,
                employment,
                birth_year,
                weekly_wage,
                deductions,
                credits,
            } => Some(LiabilityInput {
                annual_income: *income,
                filing_status: *status,
                employment: *employment,
                birth_year: *birth_year,
                weekly_wage: *weekly_wage,
                deductions: *deductions,
                credits: *credits,
                tax_year,
            }),
            _ => None,
        }
    }
}
