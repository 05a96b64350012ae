//! Entry point for callers: picks the year's rates, runs a calculator and
//! stamps the result with its request and time.
//!
//! The engine holds only immutable state behind [`Arc`], so one instance can
//! be cloned freely and shared between threads.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculations::{
    CapitalGainsCalculator, CorporateTaxCalculator, IncomeTaxCalculator, LiabilityInput,
    SocialSecurityCalculator, StampDutyCalculator, VatCalculator, summarize,
};
use crate::error::{TaxError, TaxResult};
use crate::models::{
    Assessment, CalculationInput, CalculationResult, CapitalGainsInput, Class1Input, Class2Input,
    ContributionClass, CorporateTaxInput, FilingStatus, IncomeTaxInput, RateTable,
    StampDutyInput, TaxLiabilitySummary, TaxYearRates, VatInput,
};
use crate::rates::RateRegistry;

/// Tax year used when a request does not name one.
pub const DEFAULT_TAX_YEAR: i32 = 2025;

/// Source of calculation timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Two identical requests then produce
/// equal results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_tax_year: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_tax_year: DEFAULT_TAX_YEAR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaxEngine {
    registry: Arc<RateRegistry>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl TaxEngine {
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] when the configured default year
    /// has no rates in `registry`.
    pub fn new(
        registry: RateRegistry,
        config: EngineConfig,
    ) -> TaxResult<Self> {
        if registry.get(config.default_tax_year).is_err() {
            return Err(TaxError::configuration(format!(
                "default tax year {} is not one of the configured years {:?}",
                config.default_tax_year,
                registry.years()
            )));
        }
        info!(default_tax_year = config.default_tax_year, "tax engine ready");
        Ok(Self {
            registry: Arc::new(registry),
            config,
            clock: Arc::new(SystemClock),
        })
    }

    /// Engine over the built-in Maltese schedules with default settings.
    pub fn malta() -> TaxResult<Self> {
        Self::new(RateRegistry::malta()?, EngineConfig::default())
    }

    pub fn with_clock(
        mut self,
        clock: impl Clock + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Supported tax years, ascending.
    pub fn tax_years(&self) -> Vec<i32> {
        self.registry.years()
    }

    /// Every rate in force for a year. `None` selects the default year.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::UnsupportedYear`] for an unknown year.
    pub fn get_tax_year_rates(
        &self,
        tax_year: Option<i32>,
    ) -> TaxResult<&TaxYearRates> {
        let year = tax_year.unwrap_or(self.config.default_tax_year);
        self.registry.get(year).inspect_err(|_| {
            warn!(
                tax_year = year,
                supported = ?self.registry.years(),
                "unsupported tax year requested"
            );
        })
    }

    /// Income tax brackets for a year and filing status.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::UnsupportedYear`] for an unknown year.
    pub fn get_rate_table(
        &self,
        tax_year: Option<i32>,
        filing_status: FilingStatus,
    ) -> TaxResult<&RateTable> {
        Ok(self.get_tax_year_rates(tax_year)?.income_tax.table(filing_status))
    }

    /// Runs whichever calculation `input` describes.
    ///
    /// # Errors
    ///
    /// Propagates the validation or year errors of the selected calculator.
    pub fn calculate(
        &self,
        input: &CalculationInput,
    ) -> TaxResult<CalculationResult> {
        match input {
            CalculationInput::IncomeTax(input) => self.calculate_income_tax(input),
            CalculationInput::Vat(input) => self.calculate_vat(input),
            CalculationInput::SocialSecurityClass1(input) => {
                self.calculate_social_security_class1(input)
            }
            CalculationInput::SocialSecurityClass2(input) => {
                self.calculate_social_security_class2(input)
            }
            CalculationInput::StampDuty(input) => self.calculate_stamp_duty(input),
            CalculationInput::CapitalGains(input) => self.calculate_capital_gains(input),
            CalculationInput::CorporateTax(input) => self.calculate_corporate_tax(input),
        }
    }

    /// # Errors
    ///
    /// Returns a validation error for negative amounts and
    /// [`TaxError::UnsupportedYear`] for an unknown year.
    pub fn calculate_income_tax(
        &self,
        input: &IncomeTaxInput,
    ) -> TaxResult<CalculationResult> {
        self.evaluate(CalculationInput::IncomeTax(input.clone()), |rates| {
            IncomeTaxCalculator::new(rates).calculate(input)
        })
    }

    /// # Errors
    ///
    /// Returns a validation error for a negative amount and
    /// [`TaxError::UnsupportedYear`] for an unknown year.
    pub fn calculate_vat(
        &self,
        input: &VatInput,
    ) -> TaxResult<CalculationResult> {
        self.evaluate(CalculationInput::Vat(input.clone()), |rates| {
            VatCalculator::new(rates).calculate(input)
        })
    }

    /// # Errors
    ///
    /// See [`SocialSecurityCalculator::class1`].
    pub fn calculate_social_security_class1(
        &self,
        input: &Class1Input,
    ) -> TaxResult<CalculationResult> {
        self.evaluate(CalculationInput::SocialSecurityClass1(input.clone()), |rates| {
            SocialSecurityCalculator::new(rates).class1(input)
        })
    }

    /// # Errors
    ///
    /// See [`SocialSecurityCalculator::class2`].
    pub fn calculate_social_security_class2(
        &self,
        input: &Class2Input,
    ) -> TaxResult<CalculationResult> {
        self.evaluate(CalculationInput::SocialSecurityClass2(input.clone()), |rates| {
            SocialSecurityCalculator::new(rates).class2(input)
        })
    }

    /// # Errors
    ///
    /// Returns a validation error when the property value is not positive.
    pub fn calculate_stamp_duty(
        &self,
        input: &StampDutyInput,
    ) -> TaxResult<CalculationResult> {
        self.evaluate(CalculationInput::StampDuty(input.clone()), |rates| {
            StampDutyCalculator::new(rates).calculate(input)
        })
    }

    /// # Errors
    ///
    /// Returns a validation error for negative amounts or a sale date that is
    /// not after the purchase date.
    pub fn calculate_capital_gains(
        &self,
        input: &CapitalGainsInput,
    ) -> TaxResult<CalculationResult> {
        self.evaluate(CalculationInput::CapitalGains(input.clone()), |rates| {
            CapitalGainsCalculator::new(rates).calculate(input)
        })
    }

    /// # Errors
    ///
    /// Returns a validation error for negative profit.
    pub fn calculate_corporate_tax(
        &self,
        input: &CorporateTaxInput,
    ) -> TaxResult<CalculationResult> {
        self.evaluate(CalculationInput::CorporateTax(input.clone()), |rates| {
            CorporateTaxCalculator::new(rates).calculate(input)
        })
    }

    /// Income tax plus Class 1 or Class 2 contributions, depending on
    /// `employment`.
    ///
    /// # Errors
    ///
    /// Propagates the errors of either underlying calculation.
    pub fn calculate_tax_liability(
        &self,
        input: &LiabilityInput,
    ) -> TaxResult<TaxLiabilitySummary> {
        let income_tax = self.calculate_income_tax(&input.income_tax_input())?;
        let social_security = match input.employment {
            ContributionClass::Employee => {
                self.calculate_social_security_class1(&input.class1_input()?)?
            }
            ContributionClass::SelfEmployed => {
                self.calculate_social_security_class2(&input.class2_input())?
            }
        };
        summarize(input, income_tax, social_security)
    }

    fn evaluate(
        &self,
        input: CalculationInput,
        calculate: impl FnOnce(&TaxYearRates) -> TaxResult<Assessment>,
    ) -> TaxResult<CalculationResult> {
        let rates = self.get_tax_year_rates(input.requested_year())?;
        let assessment = calculate(rates)?;
        Ok(CalculationResult::new(
            rates.tax_year,
            input,
            assessment,
            self.clock.now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;
    use crate::models::{CalculationDetails, VatCategory};

    fn fixed_engine() -> TaxEngine {
        let instant = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        TaxEngine::malta().unwrap().with_clock(FixedClock(instant))
    }

    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // construction
    // =========================================================================

    #[test]
    fn engine_is_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TaxEngine>();
    }

    #[test]
    fn default_config_uses_2025() {
        assert_eq!(EngineConfig::default().default_tax_year, 2025);
    }

    #[test]
    fn rejects_default_year_without_rates() {
        let err = TaxEngine::new(
            RateRegistry::malta().unwrap(),
            EngineConfig {
                default_tax_year: 2019,
            },
        )
        .unwrap_err();

        assert!(matches!(err, TaxError::Configuration(_)));
    }

    #[test]
    fn lists_supported_years() {
        assert_eq!(fixed_engine().tax_years(), vec![2024, 2025]);
    }

    // =========================================================================
    // year selection
    // =========================================================================

    #[test]
    fn request_without_year_uses_default() {
        let result = fixed_engine()
            .calculate_income_tax(&IncomeTaxInput::new(dec!(25000), FilingStatus::Single))
            .unwrap();

        assert_eq!(result.tax_year, 2025);
        assert_eq!(result.computed_amount, dec!(2850.00));
    }

    #[test]
    fn request_for_earlier_year_uses_its_rates() {
        let result = fixed_engine()
            .calculate_income_tax(
                &IncomeTaxInput::new(dec!(25000), FilingStatus::Single).tax_year(2024),
            )
            .unwrap();

        assert_eq!(result.tax_year, 2024);
        assert_eq!(result.computed_amount, dec!(3435.00));
    }

    #[test]
    fn unsupported_year_is_an_error() {
        let _guard = init_test_tracing();

        let err = fixed_engine()
            .calculate_vat(&VatInput::new(dec!(100), VatCategory::Standard).tax_year(1999))
            .unwrap_err();

        assert_eq!(err, TaxError::UnsupportedYear(1999));
    }

    #[test]
    fn rate_table_accessor_returns_status_schedule() {
        let engine = fixed_engine();
        let table = engine.get_rate_table(None, FilingStatus::Married).unwrap();

        assert_eq!(table.brackets()[0].upper_bound, Some(dec!(15000)));
        assert_eq!(table.top_rate(), dec!(0.35));
    }

    #[test]
    fn year_rates_accessor_exposes_every_schedule() {
        let engine = fixed_engine();
        let rates = engine.get_tax_year_rates(Some(2024)).unwrap();

        assert_eq!(rates.tax_year, 2024);
        assert_eq!(rates.vat.rate(VatCategory::Standard), dec!(0.18));
        assert_eq!(rates.stamp_duty.reduced_rate, dec!(0.035));
    }

    // =========================================================================
    // results
    // =========================================================================

    #[test]
    fn result_echoes_input_and_timestamp() {
        let input = StampDutyInput::new(dec!(250000));
        let result = fixed_engine().calculate_stamp_duty(&input).unwrap();

        assert_eq!(result.input, CalculationInput::StampDuty(input));
        assert_eq!(
            result.calculated_at,
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
        );
        assert_eq!(result.computed_amount, dec!(12500.00));
    }

    fn one_request_per_calculator() -> Vec<CalculationInput> {
        let date = |y, m, d| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();
        vec![
            CalculationInput::IncomeTax(
                IncomeTaxInput::new(dec!(48250.75), FilingStatus::Parental).credits(dec!(120)),
            ),
            CalculationInput::Vat(
                VatInput::new(dec!(99.99), VatCategory::ReducedTier1).including_vat(),
            ),
            CalculationInput::SocialSecurityClass1(
                Class1Input::new(dec!(350), 2008).weeks_worked(30),
            ),
            CalculationInput::SocialSecurityClass2(Class2Input::new(dec!(12000), 1960)),
            CalculationInput::StampDuty(
                StampDutyInput::new(dec!(320000)).first_time_buyer(true).primary_residence(true),
            ),
            CalculationInput::CapitalGains(
                CapitalGainsInput::new(
                    dec!(100000),
                    dec!(150000),
                    date(2023, 5, 1),
                    date(2025, 4, 30),
                )
                .selling_costs(dec!(2500)),
            ),
            CalculationInput::CorporateTax(CorporateTaxInput::new(dec!(87654.32))),
        ]
    }

    #[test]
    fn identical_requests_give_equal_results() {
        let engine = fixed_engine();

        for input in one_request_per_calculator() {
            assert_eq!(
                engine.calculate(&input).unwrap(),
                engine.calculate(&input).unwrap(),
                "{input:?}"
            );
        }
    }

    #[test]
    fn dispatch_matches_direct_call() {
        let engine = fixed_engine();
        let input = Class2Input::new(dec!(12000), 1985);

        assert_eq!(
            engine
                .calculate(&CalculationInput::SocialSecurityClass2(input.clone()))
                .unwrap(),
            engine.calculate_social_security_class2(&input).unwrap()
        );
    }

    #[test]
    fn concurrent_calculations_agree() {
        let engine = fixed_engine();
        let input = IncomeTaxInput::new(dec!(61234.56), FilingStatus::Single);
        let expected = engine.calculate_income_tax(&input).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| engine.calculate_income_tax(&input).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    // =========================================================================
    // liability
    // =========================================================================

    #[test]
    fn employee_liability_combines_income_tax_and_class1() {
        let summary = fixed_engine()
            .calculate_tax_liability(&LiabilityInput::new(
                dec!(26000),
                FilingStatus::Single,
                ContributionClass::Employee,
                1990,
            ))
            .unwrap();

        assert_eq!(summary.total_income_tax, dec!(3100.00));
        assert_eq!(summary.total_social_security, dec!(2600.00));
        assert_eq!(summary.total_liability, dec!(5700.00));
        assert_eq!(summary.net_income, dec!(20300.00));
        assert_eq!(summary.overall_effective_rate, dec!(21.92));
    }

    #[test]
    fn self_employed_liability_uses_capped_class2() {
        let summary = fixed_engine()
            .calculate_tax_liability(&LiabilityInput::new(
                dec!(26000),
                FilingStatus::Single,
                ContributionClass::SelfEmployed,
                1990,
            ))
            .unwrap();

        assert_eq!(summary.total_social_security, dec!(2830.36));
        assert_eq!(summary.total_liability, dec!(5930.36));
        assert_eq!(summary.net_income, dec!(20069.64));
        assert_eq!(summary.overall_effective_rate, dec!(22.81));
        assert!(matches!(
            summary.social_security.details,
            CalculationDetails::SocialSecurity(ref details) if details.capped
        ));
    }

    #[test]
    fn net_income_and_liability_add_up_to_income() {
        let summary = fixed_engine()
            .calculate_tax_liability(&LiabilityInput::new(
                dec!(1000),
                FilingStatus::Single,
                ContributionClass::Employee,
                1990,
            ))
            .unwrap();

        assert_eq!(summary.total_income_tax, dec!(0.00));
        assert_eq!(summary.total_social_security, dec!(1153.36));
        assert_eq!(summary.net_income, dec!(-153.36));
        assert_eq!(summary.net_income + summary.total_liability, summary.annual_income);
    }

    // =========================================================================
    // out-of-range amounts
    // =========================================================================

    #[test]
    fn vanishingly_small_wage_is_rejected() {
        let tiny = dec!(0.0000000000000000000000000001);
        let engine = fixed_engine();

        let err = engine
            .calculate_social_security_class1(&Class1Input::new(tiny, 1990))
            .unwrap_err();
        assert_eq!(err.field(), Some("weekly_wage"));

        let err = engine
            .calculate_tax_liability(
                &LiabilityInput::new(tiny, FilingStatus::Single, ContributionClass::Employee, 1990)
                    .weekly_wage(dec!(500)),
            )
            .unwrap_err();
        assert_eq!(err.field(), Some("annual_income"));
    }

    #[test]
    fn huge_amounts_are_rejected() {
        let engine = fixed_engine();
        let date = |y, m, d| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();

        let err = engine
            .calculate_vat(&VatInput::new(Decimal::MAX, VatCategory::Standard))
            .unwrap_err();
        assert_eq!(err.field(), Some("amount"));

        let err = engine
            .calculate_social_security_class1(&Class1Input::new(Decimal::MAX, 1990))
            .unwrap_err();
        assert_eq!(err.field(), Some("weekly_wage"));

        let err = engine
            .calculate_capital_gains(
                &CapitalGainsInput::new(
                    dec!(100000),
                    dec!(150000),
                    date(2010, 1, 15),
                    date(2025, 6, 1),
                )
                .selling_costs(Decimal::MAX),
            )
            .unwrap_err();
        assert_eq!(err.field(), Some("selling_costs"));
    }
}
