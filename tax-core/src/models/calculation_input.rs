use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{FilingStatus, VatCategory};

/// Income tax request. Optional fields fall back to the engine defaults
/// (configured tax year, no deductions, no credits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxInput {
    pub annual_income: Decimal,
    pub filing_status: FilingStatus,
    #[serde(default)]
    pub tax_year: Option<i32>,
    /// Allowable deductions subtracted from income before the brackets apply.
    #[serde(default)]
    pub deductions: Option<Decimal>,
    /// Tax credits subtracted from the computed tax.
    #[serde(default)]
    pub credits: Option<Decimal>,
}

impl IncomeTaxInput {
    pub fn new(
        annual_income: Decimal,
        filing_status: FilingStatus,
    ) -> Self {
        Self {
            annual_income,
            filing_status,
            tax_year: None,
            deductions: None,
            credits: None,
        }
    }

    pub fn tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = Some(tax_year);
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
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatInput {
    /// Net amount, or the gross amount when `amount_includes_vat` is set.
    pub amount: Decimal,
    pub category: VatCategory,
    #[serde(default)]
    pub amount_includes_vat: bool,
    #[serde(default)]
    pub tax_year: Option<i32>,
}

impl VatInput {
    pub fn new(
        amount: Decimal,
        category: VatCategory,
    ) -> Self {
        Self {
            amount,
            category,
            amount_includes_vat: false,
            tax_year: None,
        }
    }

    pub fn including_vat(mut self) -> Self {
        self.amount_includes_vat = true;
        self
    }

    pub fn tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = Some(tax_year);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class1Input {
    pub weekly_wage: Decimal,
    pub birth_year: i32,
    /// Weeks of employment in the year, 1 to 52. Defaults to 52.
    #[serde(default)]
    pub weeks_worked: Option<u32>,
    #[serde(default)]
    pub tax_year: Option<i32>,
}

impl Class1Input {
    pub fn new(
        weekly_wage: Decimal,
        birth_year: i32,
    ) -> Self {
        Self {
            weekly_wage,
            birth_year,
            weeks_worked: None,
            tax_year: None,
        }
    }

    pub fn weeks_worked(
        mut self,
        weeks: u32,
    ) -> Self {
        self.weeks_worked = Some(weeks);
        self
    }

    pub fn tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = Some(tax_year);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class2Input {
    pub annual_income: Decimal,
    pub birth_year: i32,
    #[serde(default)]
    pub tax_year: Option<i32>,
}

impl Class2Input {
    pub fn new(
        annual_income: Decimal,
        birth_year: i32,
    ) -> Self {
        Self {
            annual_income,
            birth_year,
            tax_year: None,
        }
    }

    pub fn tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = Some(tax_year);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampDutyInput {
    pub property_value: Decimal,
    #[serde(default)]
    pub is_first_time_buyer: bool,
    #[serde(default)]
    pub is_primary_residence: bool,
    #[serde(default)]
    pub tax_year: Option<i32>,
}

impl StampDutyInput {
    pub fn new(property_value: Decimal) -> Self {
        Self {
            property_value,
            is_first_time_buyer: false,
            is_primary_residence: false,
            tax_year: None,
        }
    }

    pub fn first_time_buyer(
        mut self,
        value: bool,
    ) -> Self {
        self.is_first_time_buyer = value;
        self
    }

    pub fn primary_residence(
        mut self,
        value: bool,
    ) -> Self {
        self.is_primary_residence = value;
        self
    }

    pub fn tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = Some(tax_year);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsInput {
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub purchase_date: NaiveDate,
    pub sale_date: NaiveDate,
    #[serde(default)]
    pub improvement_costs: Option<Decimal>,
    #[serde(default)]
    pub selling_costs: Option<Decimal>,
    #[serde(default)]
    pub tax_year: Option<i32>,
}

impl CapitalGainsInput {
    pub fn new(
        purchase_price: Decimal,
        sale_price: Decimal,
        purchase_date: NaiveDate,
        sale_date: NaiveDate,
    ) -> Self {
        Self {
            purchase_price,
            sale_price,
            purchase_date,
            sale_date,
            improvement_costs: None,
            selling_costs: None,
            tax_year: None,
        }
    }

    pub fn improvement_costs(
        mut self,
        costs: Decimal,
    ) -> Self {
        self.improvement_costs = Some(costs);
        self
    }

    pub fn selling_costs(
        mut self,
        costs: Decimal,
    ) -> Self {
        self.selling_costs = Some(costs);
        self
    }

    pub fn tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = Some(tax_year);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateTaxInput {
    pub annual_profit: Decimal,
    #[serde(default)]
    pub tax_year: Option<i32>,
}

impl CorporateTaxInput {
    pub fn new(annual_profit: Decimal) -> Self {
        Self {
            annual_profit,
            tax_year: None,
        }
    }

    pub fn tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        self.tax_year = Some(tax_year);
        self
    }
}

/// Copy of the request a result was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationInput {
    IncomeTax(IncomeTaxInput),
    Vat(VatInput),
    SocialSecurityClass1(Class1Input),
    SocialSecurityClass2(Class2Input),
    StampDuty(StampDutyInput),
    CapitalGains(CapitalGainsInput),
    CorporateTax(CorporateTaxInput),
}

impl CalculationInput {
    /// Year requested by the caller, if any.
    pub fn requested_year(&self) -> Option<i32> {
        match self {
            Self::IncomeTax(input) => input.tax_year,
            Self::Vat(input) => input.tax_year,
            Self::SocialSecurityClass1(input) => input.tax_year,
            Self::SocialSecurityClass2(input) => input.tax_year,
            Self::StampDuty(input) => input.tax_year,
            Self::CapitalGains(input) => input.tax_year,
            Self::CorporateTax(input) => input.tax_year,
        }
    }

    /// Fills in `tax_year` when the request does not already name one.
    pub fn or_tax_year(
        mut self,
        tax_year: i32,
    ) -> Self {
        let slot = match &mut self {
            Self::IncomeTax(input) => &mut input.tax_year,
            Self::Vat(input) => &mut input.tax_year,
            Self::SocialSecurityClass1(input) => &mut input.tax_year,
            Self::SocialSecurityClass2(input) => &mut input.tax_year,
            Self::StampDuty(input) => &mut input.tax_year,
            Self::CapitalGains(input) => &mut input.tax_year,
            Self::CorporateTax(input) => &mut input.tax_year,
        };
        slot.get_or_insert(tax_year);
        self
    }
}
