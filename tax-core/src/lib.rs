//! Maltese tax calculation engine.
//!
//! Income tax, VAT, Class 1 and Class 2 social security, stamp duty, capital
//! gains and corporate tax, computed in [`Decimal`](rust_decimal::Decimal)
//! from per-year rate schedules. Start from [`TaxEngine::malta`].

pub mod calculations;
pub mod engine;
pub mod error;
pub mod models;
pub mod rates;

pub use calculations::LiabilityInput;
pub use engine::{Clock, DEFAULT_TAX_YEAR, EngineConfig, FixedClock, SystemClock, TaxEngine};
pub use error::{TaxError, TaxResult};
pub use models::*;
pub use rates::RateRegistry;
