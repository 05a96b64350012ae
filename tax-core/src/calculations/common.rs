//! Rounding and validation helpers shared by the calculators.
//!
//! Calculators keep full precision internally and only round when building
//! their output, so chained calculations do not accumulate cent drift.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::{TaxError, TaxResult};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest amount, in euro, accepted from a caller.
///
/// Keeps every product and sum the calculators form well inside the
/// `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

fn out_of_range(field: &'static str) -> TaxError {
    TaxError::validation(field, "amount out of range")
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use malta_tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `part` as a percentage of `whole`, rounded to two places. Zero when
/// `whole` is zero.
///
/// A ratio that does not fit in a `Decimal` (a vanishingly small `whole`)
/// is reported against `field`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use malta_tax_core::calculations::common::percentage_of;
///
/// assert_eq!(percentage_of("income", dec!(2850), dec!(25000)), Ok(dec!(11.40)));
/// assert_eq!(percentage_of("income", dec!(10), dec!(0)), Ok(dec!(0)));
/// ```
pub fn percentage_of(
    field: &'static str,
    part: Decimal,
    whole: Decimal,
) -> TaxResult<Decimal> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .map(round_half_up)
        .ok_or_else(|| out_of_range(field))
}

/// A fractional rate (`0.15`) expressed as a percentage (`15`).
pub fn as_percentage(rate: Decimal) -> Decimal {
    round_half_up(rate * HUNDRED)
}

/// Floors a derived amount at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Rejects a negative caller-supplied amount, or one above [`MAX_AMOUNT`].
pub fn require_non_negative(
    field: &'static str,
    value: Decimal,
) -> TaxResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(TaxError::validation(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    require_at_most_max(field, value)
}

/// Rejects a zero or negative caller-supplied amount, or one above
/// [`MAX_AMOUNT`].
pub fn require_positive(
    field: &'static str,
    value: Decimal,
) -> TaxResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(TaxError::validation(
            field,
            format!("must be greater than zero, got {value}"),
        ));
    }
    require_at_most_max(field, value)
}

fn require_at_most_max(
    field: &'static str,
    value: Decimal,
) -> TaxResult<Decimal> {
    if value > MAX_AMOUNT {
        return Err(TaxError::validation(
            field,
            format!("amount out of range, must not exceed {MAX_AMOUNT}"),
        ));
    }
    Ok(value)
}

/// Validates an optional non-negative amount, treating `None` as zero.
pub fn optional_amount(
    field: &'static str,
    value: Option<Decimal>,
) -> TaxResult<Decimal> {
    require_non_negative(field, value.unwrap_or(Decimal::ZERO))
}

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
///
/// ```
/// use malta_tax_core::calculations::common::parse_date;
///
/// assert!(parse_date("sale_date", "2025-03-31").is_ok());
/// assert_eq!(
///     parse_date("sale_date", "31/03/2025").unwrap_err().field(),
///     Some("sale_date"),
/// );
/// ```
pub fn parse_date(
    field: &'static str,
    value: &str,
) -> TaxResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        TaxError::validation(field, format!("'{value}' is not a YYYY-MM-DD date: {e}"))
    })
}

/// Whole years elapsed between two dates, counting only completed
/// anniversaries. Zero when `to` precedes `from`.
pub fn whole_years_between(
    from: NaiveDate,
    to: NaiveDate,
) -> u32 {
    use chrono::Datelike;

    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(0.125)), dec!(0.13));
    }

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(1180.004)), dec!(1180.00));
    }

    #[test]
    fn round_half_up_handles_repeating_division() {
        let net = dec!(100) / dec!(1.18);

        assert_eq!(round_half_up(net), dec!(84.75));
    }

    // =========================================================================
    // percentage tests
    // =========================================================================

    #[test]
    fn percentage_of_rounds_to_two_places() {
        assert_eq!(percentage_of("amount", dec!(1), dec!(3)), Ok(dec!(33.33)));
    }

    #[test]
    fn percentage_of_zero_whole_is_zero() {
        assert_eq!(percentage_of("amount", dec!(0), dec!(0)), Ok(dec!(0)));
    }

    #[test]
    fn percentage_of_tiny_whole_is_out_of_range() {
        let err = percentage_of("weekly_wage", dec!(22.18), dec!(0.0000000000000000000000000001))
            .unwrap_err();

        assert_eq!(err.field(), Some("weekly_wage"));
    }

    #[test]
    fn as_percentage_scales_fraction() {
        assert_eq!(as_percentage(dec!(0.035)), dec!(3.5));
    }

    // =========================================================================
    // validation helpers
    // =========================================================================

    #[test]
    fn non_negative_floors_at_zero() {
        assert_eq!(non_negative(dec!(-5)), dec!(0));
        assert_eq!(non_negative(dec!(5)), dec!(5));
    }

    #[test]
    fn require_non_negative_accepts_zero() {
        assert_eq!(require_non_negative("amount", dec!(0)), Ok(dec!(0)));
    }

    #[test]
    fn require_non_negative_rejects_negative() {
        let err = require_non_negative("amount", dec!(-0.01)).unwrap_err();

        assert_eq!(err.field(), Some("amount"));
    }

    #[test]
    fn require_positive_rejects_zero() {
        assert!(require_positive("property_value", dec!(0)).is_err());
    }

    #[test]
    fn amounts_above_the_maximum_are_rejected() {
        assert_eq!(require_non_negative("amount", MAX_AMOUNT), Ok(MAX_AMOUNT));
        assert_eq!(
            require_non_negative("amount", Decimal::MAX).unwrap_err().field(),
            Some("amount")
        );
        assert_eq!(
            require_positive("weekly_wage", MAX_AMOUNT + dec!(0.01)).unwrap_err().field(),
            Some("weekly_wage")
        );
        assert!(optional_amount("selling_costs", Some(Decimal::MAX)).is_err());
    }

    #[test]
    fn optional_amount_defaults_to_zero() {
        assert_eq!(optional_amount("credits", None), Ok(dec!(0)));
        assert!(optional_amount("credits", Some(dec!(-1))).is_err());
    }

    // =========================================================================
    // date helpers
    // =========================================================================

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(parse_date("purchase_date", "2014-06-01"), Ok(date(2014, 6, 1)));
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        let err = parse_date("purchase_date", "2025-02-30").unwrap_err();

        assert_eq!(err.field(), Some("purchase_date"));
    }

    #[test]
    fn whole_years_counts_completed_anniversaries() {
        assert_eq!(whole_years_between(date(2020, 6, 15), date(2023, 6, 14)), 2);
        assert_eq!(whole_years_between(date(2020, 6, 15), date(2023, 6, 15)), 3);
        assert_eq!(whole_years_between(date(2020, 2, 29), date(2021, 2, 28)), 0);
        assert_eq!(whole_years_between(date(2020, 2, 29), date(2021, 3, 1)), 1);
    }

    #[test]
    fn whole_years_is_zero_when_reversed() {
        assert_eq!(whole_years_between(date(2023, 1, 1), date(2020, 1, 1)), 0);
    }
}
