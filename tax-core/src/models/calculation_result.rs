use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CalculationInput, Class1Category, ContributionClass, FilingStatus, VatCategory};

/// Amount taxed within one band and the tax it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub label: String,
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    /// Percentage, e.g. `15` for 15%.
    pub rate: Decimal,
    pub taxable_amount: Decimal,
    pub tax: Decimal,
}

/// Which stamp duty structure applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampDutyTier {
    FirstTimeBuyerExemption,
    PrimaryResidence,
    Standard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDetails {
    pub class: ContributionClass,
    /// Class 1 only.
    pub category: Option<Class1Category>,
    pub age_band: String,
    pub weeks: u32,
    pub employee_weekly: Option<Decimal>,
    pub employer_weekly: Option<Decimal>,
    pub employee_contribution: Decimal,
    /// Class 1 only.
    pub employer_contribution: Option<Decimal>,
    pub total_contribution: Decimal,
    /// Employee contribution as a percentage of the contributory amount.
    pub contribution_rate: Decimal,
    pub capped: bool,
    pub below_threshold: bool,
}

/// Calculator-specific figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationDetails {
    IncomeTax {
        filing_status: FilingStatus,
        taxable_income: Decimal,
        gross_tax: Decimal,
        credits_applied: Decimal,
        net_income: Decimal,
    },
    Vat {
        category: VatCategory,
        rate: Decimal,
        net_amount: Decimal,
        vat_amount: Decimal,
        gross_amount: Decimal,
        amount_includes_vat: bool,
    },
    SocialSecurity(ContributionDetails),
    StampDuty {
        tier: StampDutyTier,
        property_value: Decimal,
    },
    CapitalGains {
        adjusted_cost_base: Decimal,
        capital_gain: Decimal,
        holding_period_years: u32,
        rate: Decimal,
        exemption: Option<String>,
    },
    CorporateTax {
        annual_profit: Decimal,
        rate: Decimal,
        net_profit: Decimal,
    },
}

/// Output of a calculator before it is stamped with its request and time.
///
/// Currency figures are rounded to cents and rates to two decimal places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub amount: Decimal,
    pub effective_rate: Decimal,
    pub marginal_rate: Option<Decimal>,
    pub breakdown: Vec<BreakdownLine>,
    pub details: CalculationDetails,
}

/// Result of one engine call. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub tax_year: i32,
    pub input: CalculationInput,
    /// The tax, duty or contribution owed, in euro cents precision.
    pub computed_amount: Decimal,
    /// `computed_amount` as a percentage of the taxed base.
    pub effective_rate: Decimal,
    /// Income tax only.
    pub marginal_rate: Option<Decimal>,
    pub breakdown: Vec<BreakdownLine>,
    pub details: CalculationDetails,
    pub calculated_at: DateTime<Utc>,
}

impl CalculationResult {
    pub fn new(
        tax_year: i32,
        input: CalculationInput,
        assessment: Assessment,
        calculated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tax_year,
            input,
            computed_amount: assessment.amount,
            effective_rate: assessment.effective_rate,
            marginal_rate: assessment.marginal_rate,
            breakdown: assessment.breakdown,
            details: assessment.details,
            calculated_at,
        }
    }
}

/// Combined income tax and social security position for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLiabilitySummary {
    pub annual_income: Decimal,
    pub employment: ContributionClass,
    pub income_tax: CalculationResult,
    pub social_security: CalculationResult,
    pub total_income_tax: Decimal,
    /// Employee (or self-employed) share only.
    pub total_social_security: Decimal,
    pub total_liability: Decimal,
    pub net_income: Decimal,
    pub overall_effective_rate: Decimal,
}
