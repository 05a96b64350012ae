mod calculation_input;
mod calculation_result;
mod contribution_class;
mod filing_status;
mod rate_table;
mod tax_bracket;
mod tax_year_rates;
mod vat_category;

pub use calculation_input::{
    CalculationInput, CapitalGainsInput, Class1Input, Class2Input, CorporateTaxInput,
    IncomeTaxInput, StampDutyInput, VatInput,
};
pub use calculation_result::{
    Assessment, BreakdownLine, CalculationDetails, CalculationResult, ContributionDetails,
    StampDutyTier, TaxLiabilitySummary,
};
pub use contribution_class::{Class1Category, ContributionClass};
pub use filing_status::FilingStatus;
pub use rate_table::RateTable;
pub use tax_bracket::TaxBracket;
pub use tax_year_rates::{
    CapitalGainsRates, Class1Rates, Class2Rates, ContributionCohort, HoldingPeriodBand,
    IncomeTaxSchedules, StampDutyRates, TaxYearRates, VatRates, cohort_for,
};
pub use vat_category::VatCategory;
