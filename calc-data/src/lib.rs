pub mod input;
pub mod loader;
pub mod logging;

pub use loader::{BracketRecord, LoaderError, ParameterRecord, TaxYearLoader};
