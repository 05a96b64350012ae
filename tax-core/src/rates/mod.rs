//! Rate schedules: the built-in Maltese years and the registry that serves
//! them to the engine.

mod malta;
mod registry;

pub use malta::{SUPPORTED_YEARS, malta_2024, malta_2025};
pub use registry::RateRegistry;
