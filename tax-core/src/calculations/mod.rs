//! Calculators for each Maltese tax, duty and contribution.
//!
//! Every calculator borrows one year's [`TaxYearRates`](crate::models::TaxYearRates)
//! and turns a validated input into an [`Assessment`](crate::models::Assessment).
//! Year selection, timestamps and the input echo are added by
//! [`TaxEngine`](crate::engine::TaxEngine).

pub mod brackets;
pub mod capital_gains;
pub mod common;
pub mod corporate_tax;
pub mod income_tax;
pub mod liability;
pub mod social_security;
pub mod stamp_duty;
pub mod vat;

pub use brackets::{BandPortion, BracketResolution, resolve, tax_by_deduct_constant};
pub use capital_gains::CapitalGainsCalculator;
pub use corporate_tax::CorporateTaxCalculator;
pub use income_tax::IncomeTaxCalculator;
pub use liability::{LiabilityInput, summarize};
pub use social_security::SocialSecurityCalculator;
pub use stamp_duty::StampDutyCalculator;
pub use vat::VatCalculator;
