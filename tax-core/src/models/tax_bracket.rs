use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One band of a progressive schedule.
///
/// The band covers `[lower_bound, upper_bound)`; `upper_bound = None` is the
/// open-ended top band. `rate` is a fraction (`0.15` for 15%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,

    /// Published subtractive constant: tax for an amount inside this band is
    /// `amount * rate - deduct`. Derived from the lower bands when absent.
    #[serde(default)]
    pub deduct: Option<Decimal>,
}

impl TaxBracket {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
            deduct: None,
        }
    }

    pub fn with_deduct(
        mut self,
        deduct: Decimal,
    ) -> Self {
        self.deduct = Some(deduct);
        self
    }

    /// Width of the band, `None` for the open-ended top band.
    pub fn width(&self) -> Option<Decimal> {
        self.upper_bound.map(|upper| upper - self.lower_bound)
    }
}
