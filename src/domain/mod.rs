pub mod error;

// Tabular exchange types
pub mod csv;

pub use csv::*;
pub use error::{ExchangeError, Result};
