//! Loading Maltese income tax rate tables from CSV.

mod loader;

pub use loader::{LoadedTable, RateTableLoader, RateTableLoaderError, RateTableRecord};
