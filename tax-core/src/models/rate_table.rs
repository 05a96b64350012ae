use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{TaxError, TaxResult};
use crate::models::TaxBracket;

/// Largest accepted difference between a published deduct constant and the
/// one implied by the band boundaries.
const DEDUCT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Validated progressive schedule.
///
/// Construction through [`RateTable::new`] guarantees that the bands start at
/// zero, are contiguous, end with an open band, carry non-decreasing rates in
/// `[0, 1]`, and that any published deduct constants agree with the band
/// boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateTable {
    brackets: Vec<TaxBracket>,

    /// Tax accumulated on all bands below each band's lower bound.
    #[serde(skip)]
    base_taxes: Vec<Decimal>,
}

impl RateTable {
    /// Validates `brackets` and builds the table.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] when the bands are empty, do not
    /// start at zero, overlap or leave gaps, are not closed by an open top
    /// band, carry a rate outside `[0, 1]` or a decreasing rate, or when a
    /// published deduct constant disagrees with the boundaries.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use malta_tax_core::{RateTable, TaxBracket};
    ///
    /// let table = RateTable::new(vec![
    ///     TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0)),
    ///     TaxBracket::new(dec!(10000), None, dec!(0.20)),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(table.deduct_constant(1), dec!(2000));
    ///
    /// let overlapping = RateTable::new(vec![
    ///     TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0)),
    ///     TaxBracket::new(dec!(9000), None, dec!(0.20)),
    /// ]);
    /// assert!(overlapping.is_err());
    /// ```
    pub fn new(brackets: Vec<TaxBracket>) -> TaxResult<Self> {
        let Some(first) = brackets.first() else {
            return Err(TaxError::configuration("rate table has no brackets"));
        };
        if first.lower_bound != Decimal::ZERO {
            return Err(TaxError::configuration(format!(
                "first bracket must start at 0, starts at {}",
                first.lower_bound
            )));
        }

        let last = brackets.len() - 1;
        let mut base_taxes = Vec::with_capacity(brackets.len());
        let mut accumulated = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(TaxError::configuration(format!(
                    "bracket {index} rate must be between 0 and 1, got {}",
                    bracket.rate
                )));
            }

            match (bracket.upper_bound, index == last) {
                (None, false) => {
                    return Err(TaxError::configuration(format!(
                        "bracket {index} is open-ended but is not the last bracket"
                    )));
                }
                (Some(upper), true) => {
                    return Err(TaxError::configuration(format!(
                        "last bracket must be open-ended, ends at {upper}"
                    )));
                }
                (Some(upper), false) if upper <= bracket.lower_bound => {
                    return Err(TaxError::configuration(format!(
                        "bracket {index} upper bound {upper} must exceed lower bound {}",
                        bracket.lower_bound
                    )));
                }
                _ => {}
            }

            if index > 0 {
                let previous = &brackets[index - 1];
                if previous.upper_bound != Some(bracket.lower_bound) {
                    return Err(TaxError::configuration(format!(
                        "bracket {index} starts at {} but bracket {} ends at {:?}",
                        bracket.lower_bound,
                        index - 1,
                        previous.upper_bound
                    )));
                }
                if bracket.rate < previous.rate {
                    return Err(TaxError::configuration(format!(
                        "bracket {index} rate {} is lower than the previous rate {}",
                        bracket.rate, previous.rate
                    )));
                }
            }

            if let Some(published) = bracket.deduct {
                let derived = bracket.lower_bound * bracket.rate - accumulated;
                if (published - derived).abs() > DEDUCT_TOLERANCE {
                    return Err(TaxError::configuration(format!(
                        "bracket {index} deduct constant {published} disagrees with boundaries (expected {derived})"
                    )));
                }
            }

            base_taxes.push(accumulated);
            if let Some(width) = bracket.width() {
                accumulated += width * bracket.rate;
            }
        }

        Ok(Self {
            brackets,
            base_taxes,
        })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Tax due on the full width of every band below band `index`.
    pub fn base_tax(
        &self,
        index: usize,
    ) -> Decimal {
        self.base_taxes[index]
    }

    /// Subtractive constant for band `index`: the published value when the
    /// table carries one, otherwise `lower_bound * rate - base_tax`.
    pub fn deduct_constant(
        &self,
        index: usize,
    ) -> Decimal {
        let bracket = &self.brackets[index];
        bracket
            .deduct
            .unwrap_or_else(|| bracket.lower_bound * bracket.rate - self.base_taxes[index])
    }

    /// Index of the band an amount's last unit falls in. An amount equal to a
    /// band's upper bound belongs to that band.
    pub fn band_index_for(
        &self,
        amount: Decimal,
    ) -> usize {
        self.brackets
            .iter()
            .position(|b| b.upper_bound.is_none_or(|upper| amount <= upper))
            .unwrap_or(self.brackets.len() - 1)
    }

    pub fn first_rate(&self) -> Decimal {
        self.brackets[0].rate
    }

    pub fn top_rate(&self) -> Decimal {
        self.brackets[self.brackets.len() - 1].rate
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn malta_single_brackets() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(12000)), dec!(0)),
            TaxBracket::new(dec!(12000), Some(dec!(16000)), dec!(0.15)).with_deduct(dec!(1800)),
            TaxBracket::new(dec!(16000), Some(dec!(60000)), dec!(0.25)).with_deduct(dec!(3400)),
            TaxBracket::new(dec!(60000), None, dec!(0.35)).with_deduct(dec!(9400)),
        ]
    }

    fn expect_configuration_error(brackets: Vec<TaxBracket>) -> String {
        match RateTable::new(brackets) {
            Err(TaxError::Configuration(message)) => message,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    // =========================================================================
    // validation tests
    // =========================================================================

    #[test]
    fn accepts_consistent_table() {
        let table = RateTable::new(malta_single_brackets()).expect("valid table");

        assert_eq!(table.brackets().len(), 4);
        assert_eq!(table.top_rate(), dec!(0.35));
    }

    #[test]
    fn rejects_empty_table() {
        let message = expect_configuration_error(vec![]);

        assert!(message.contains("no brackets"));
    }

    #[test]
    fn rejects_table_not_starting_at_zero() {
        let mut brackets = malta_single_brackets();
        brackets[0].lower_bound = dec!(100);

        let message = expect_configuration_error(brackets);

        assert!(message.contains("start at 0"));
    }

    #[test]
    fn rejects_overlapping_brackets() {
        let mut brackets = malta_single_brackets();
        brackets[2].lower_bound = dec!(15000);
        brackets[2].deduct = None;

        let message = expect_configuration_error(brackets);

        assert!(message.contains("bracket 2 starts at 15000"));
    }

    #[test]
    fn rejects_gap_between_brackets() {
        let mut brackets = malta_single_brackets();
        brackets[1].upper_bound = Some(dec!(15000));

        assert!(RateTable::new(brackets).is_err());
    }

    #[test]
    fn rejects_decreasing_rates() {
        let mut brackets = malta_single_brackets();
        brackets[3].rate = dec!(0.20);
        brackets[3].deduct = None;

        let message = expect_configuration_error(brackets);

        assert!(message.contains("lower than the previous rate"));
    }

    #[test]
    fn rejects_rate_above_one() {
        let mut brackets = malta_single_brackets();
        brackets[3].rate = dec!(1.5);
        brackets[3].deduct = None;

        assert!(RateTable::new(brackets).is_err());
    }

    #[test]
    fn rejects_closed_top_bracket() {
        let mut brackets = malta_single_brackets();
        brackets[3].upper_bound = Some(dec!(1000000));

        let message = expect_configuration_error(brackets);

        assert!(message.contains("open-ended"));
    }

    #[test]
    fn rejects_open_bracket_before_the_end() {
        let mut brackets = malta_single_brackets();
        brackets[1].upper_bound = None;

        assert!(RateTable::new(brackets).is_err());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(0)), dec!(0)),
            TaxBracket::new(dec!(0), None, dec!(0.10)),
        ];

        assert!(RateTable::new(brackets).is_err());
    }

    #[test]
    fn rejects_inconsistent_deduct_constant() {
        let mut brackets = malta_single_brackets();
        brackets[2].deduct = Some(dec!(3500));

        let message = expect_configuration_error(brackets);

        assert!(message.contains("expected 3400"));
    }

    // =========================================================================
    // derived values
    // =========================================================================

    #[test]
    fn derives_base_tax_per_band() {
        let table = RateTable::new(malta_single_brackets()).unwrap();

        assert_eq!(table.base_tax(0), dec!(0));
        assert_eq!(table.base_tax(1), dec!(0));
        assert_eq!(table.base_tax(2), dec!(600));
        assert_eq!(table.base_tax(3), dec!(11600));
    }

    #[test]
    fn derived_deducts_match_published_ones() {
        let mut brackets = malta_single_brackets();
        for bracket in &mut brackets {
            bracket.deduct = None;
        }
        let table = RateTable::new(brackets).unwrap();

        assert_eq!(table.deduct_constant(0), dec!(0));
        assert_eq!(table.deduct_constant(1), dec!(1800));
        assert_eq!(table.deduct_constant(2), dec!(3400));
        assert_eq!(table.deduct_constant(3), dec!(9400));
    }

    #[test]
    fn band_index_puts_boundary_in_lower_band() {
        let table = RateTable::new(malta_single_brackets()).unwrap();

        assert_eq!(table.band_index_for(dec!(0)), 0);
        assert_eq!(table.band_index_for(dec!(12000)), 0);
        assert_eq!(table.band_index_for(dec!(12000.01)), 1);
        assert_eq!(table.band_index_for(dec!(60000)), 2);
        assert_eq!(table.band_index_for(dec!(1000000)), 3);
    }
}
