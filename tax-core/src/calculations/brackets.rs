//! Progressive bracket resolution shared by every banded calculation.
//!
//! An amount is split across the bands of a [`RateTable`] from the bottom up.
//! Each band takes at most its own width, so an amount equal to a band's
//! upper bound fills that band exactly and leaves nothing for the next one.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::common::{as_percentage, non_negative, round_half_up};
use crate::models::{BreakdownLine, RateTable};

/// Portion of an amount that fell in one band. Values are unrounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandPortion {
    pub index: usize,
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub taxable_amount: Decimal,
    pub tax: Decimal,
}

impl BandPortion {
    /// Rounded, percentage-rate view for a result breakdown.
    pub fn to_breakdown_line(&self) -> BreakdownLine {
        let label = match self.upper_bound {
            Some(upper) => format!("{} to {}", self.lower_bound, upper),
            None => format!("over {}", self.lower_bound),
        };
        BreakdownLine {
            label,
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            rate: as_percentage(self.rate),
            taxable_amount: round_half_up(self.taxable_amount),
            tax: round_half_up(self.tax),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketResolution {
    /// The amount actually resolved, after clamping at zero.
    pub taxable_amount: Decimal,
    pub total_tax: Decimal,
    /// Rate of the highest band reached, or of the first band for a zero amount.
    pub marginal_rate: Decimal,
    /// Only bands that received a non-zero portion, lowest first.
    pub portions: Vec<BandPortion>,
}

/// Walks `table` and splits `amount` across its bands.
///
/// Negative amounts are treated as zero: no tax and no portions.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use malta_tax_core::calculations::brackets::resolve;
/// use malta_tax_core::{RateTable, TaxBracket};
///
/// let table = RateTable::new(vec![
///     TaxBracket::new(dec!(0), Some(dec!(12000)), dec!(0)),
///     TaxBracket::new(dec!(12000), Some(dec!(16000)), dec!(0.15)),
///     TaxBracket::new(dec!(16000), Some(dec!(60000)), dec!(0.25)),
///     TaxBracket::new(dec!(60000), None, dec!(0.35)),
/// ])
/// .unwrap();
///
/// let resolution = resolve(&table, dec!(25000));
///
/// assert_eq!(resolution.total_tax, dec!(2850));
/// assert_eq!(resolution.marginal_rate, dec!(0.25));
/// assert_eq!(resolution.portions.len(), 3);
/// ```
pub fn resolve(
    table: &RateTable,
    amount: Decimal,
) -> BracketResolution {
    let taxable_amount = non_negative(amount);
    let mut remaining = taxable_amount;
    let mut total_tax = Decimal::ZERO;
    let mut portions = Vec::new();

    for (index, bracket) in table.brackets().iter().enumerate() {
        if remaining <= Decimal::ZERO {
            break;
        }

        let portion = match bracket.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        let tax = portion * bracket.rate;

        remaining -= portion;
        total_tax += tax;
        portions.push(BandPortion {
            index,
            lower_bound: bracket.lower_bound,
            upper_bound: bracket.upper_bound,
            rate: bracket.rate,
            taxable_amount: portion,
            tax,
        });
    }

    let marginal_rate = portions
        .last()
        .map_or_else(|| table.first_rate(), |portion| portion.rate);

    BracketResolution {
        taxable_amount,
        total_tax,
        marginal_rate,
        portions,
    }
}

/// Single-multiplication equivalent of [`resolve`]:
/// `amount * rate - deduct` for the band the amount ends in.
pub fn tax_by_deduct_constant(
    table: &RateTable,
    amount: Decimal,
) -> Decimal {
    if amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let index = table.band_index_for(amount);
    let rate = table.brackets()[index].rate;
    non_negative(amount * rate - table.deduct_constant(index))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{FilingStatus, TaxBracket};
    use crate::rates::{malta_2024, malta_2025};

    fn single_2025() -> RateTable {
        malta_2025().unwrap().income_tax.single
    }

    fn all_tables() -> Vec<RateTable> {
        let mut tables = Vec::new();
        for rates in [malta_2024().unwrap(), malta_2025().unwrap()] {
            for status in FilingStatus::ALL {
                tables.push(rates.income_tax.table(status).clone());
            }
        }
        tables
    }

    fn sample_amounts() -> Vec<Decimal> {
        let mut amounts: Vec<Decimal> = (0..=200).map(|step| Decimal::from(step * 750)).collect();
        amounts.extend([
            dec!(0.01),
            dec!(9100.01),
            dec!(12000.005),
            dec!(15999.99),
            dec!(59999.995),
            dec!(60000.01),
            dec!(1234567.89),
        ]);
        amounts
    }

    // =========================================================================
    // resolve tests
    // =========================================================================

    #[test]
    fn zero_amount_has_no_tax_and_first_band_marginal_rate() {
        let resolution = resolve(&single_2025(), dec!(0));

        assert_eq!(resolution.total_tax, dec!(0));
        assert_eq!(resolution.marginal_rate, dec!(0));
        assert!(resolution.portions.is_empty());
    }

    #[test]
    fn negative_amount_is_clamped_to_zero() {
        let resolution = resolve(&single_2025(), dec!(-5000));

        assert_eq!(resolution.taxable_amount, dec!(0));
        assert_eq!(resolution.total_tax, dec!(0));
        assert!(resolution.portions.is_empty());
    }

    #[test]
    fn splits_amount_across_bands() {
        let resolution = resolve(&single_2025(), dec!(25000));

        let taxed: Vec<_> = resolution
            .portions
            .iter()
            .map(|p| (p.taxable_amount, p.tax))
            .collect();
        assert_eq!(
            taxed,
            vec![
                (dec!(12000), dec!(0)),
                (dec!(4000), dec!(600)),
                (dec!(9000), dec!(2250)),
            ]
        );
    }

    #[test]
    fn boundary_amount_stays_in_lower_band() {
        let resolution = resolve(&single_2025(), dec!(16000));

        assert_eq!(resolution.portions.len(), 2);
        assert_eq!(resolution.total_tax, dec!(600));
        assert_eq!(resolution.marginal_rate, dec!(0.15));
    }

    #[test]
    fn amount_above_top_bound_is_taxed_at_top_rate() {
        let resolution = resolve(&single_2025(), dec!(100000));

        let top = resolution.portions.last().unwrap();
        assert_eq!(top.upper_bound, None);
        assert_eq!(top.taxable_amount, dec!(40000));
        assert_eq!(top.tax, dec!(14000));
        assert_eq!(resolution.total_tax, dec!(25600));
    }

    #[test]
    fn exempt_band_marginal_rate_is_zero() {
        let resolution = resolve(&single_2025(), dec!(8000));

        assert_eq!(resolution.total_tax, dec!(0));
        assert_eq!(resolution.marginal_rate, dec!(0));
        assert_eq!(resolution.portions.len(), 1);
    }

    #[test]
    fn single_open_band_is_flat() {
        let table = RateTable::new(vec![TaxBracket::new(dec!(0), None, dec!(0.35))]).unwrap();

        assert_eq!(resolve(&table, dec!(1000)).total_tax, dec!(350));
    }

    #[test]
    fn breakdown_line_is_rounded_with_percentage_rate() {
        let resolution = resolve(&single_2025(), dec!(16000.333));
        let line = resolution.portions[2].to_breakdown_line();

        assert_eq!(line.label, "16000 to 60000");
        assert_eq!(line.rate, dec!(25));
        assert_eq!(line.taxable_amount, dec!(0.33));
        assert_eq!(line.tax, dec!(0.08));
    }

    // =========================================================================
    // properties
    // =========================================================================

    #[test]
    fn deduct_shortcut_matches_bracket_walk() {
        for table in all_tables() {
            for amount in sample_amounts() {
                let walked = resolve(&table, amount).total_tax;
                let shortcut = tax_by_deduct_constant(&table, amount);

                assert!(
                    (walked - shortcut).abs() <= dec!(0.01),
                    "amount {amount}: walk {walked} vs shortcut {shortcut}"
                );
            }
        }
    }

    #[test]
    fn tax_never_decreases_with_amount() {
        let mut amounts = sample_amounts();
        amounts.sort();

        for table in all_tables() {
            let mut previous = Decimal::ZERO;
            for amount in &amounts {
                let tax = resolve(&table, *amount).total_tax;
                assert!(tax >= previous, "tax fell to {tax} at {amount}");
                previous = tax;
            }
        }
    }

    #[test]
    fn portions_sum_to_amount_and_tax() {
        for table in all_tables() {
            for amount in sample_amounts() {
                let resolution = resolve(&table, amount);
                let amount_sum: Decimal = resolution.portions.iter().map(|p| p.taxable_amount).sum();
                let tax_sum: Decimal = resolution.portions.iter().map(|p| p.tax).sum();

                assert_eq!(amount_sum, amount);
                assert_eq!(tax_sum, resolution.total_tax);
            }
        }
    }

    #[test]
    fn bands_cover_from_zero_without_gaps() {
        for table in all_tables() {
            let brackets = table.brackets();
            assert_eq!(brackets[0].lower_bound, dec!(0));
            for pair in brackets.windows(2) {
                assert_eq!(pair[0].upper_bound, Some(pair[1].lower_bound));
            }
            assert_eq!(brackets[brackets.len() - 1].upper_bound, None);
        }
    }
}
