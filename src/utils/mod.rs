pub mod errors;
pub mod table;

pub use errors::{extract_clean_error, PipelineError};
pub use table::Table;
