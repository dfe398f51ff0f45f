//! Pipeline entry points for template generation.
//!
//! - `generate_structure`: Obtain a normalized site record, falling back to
//!   pattern extraction
//! - `build_report`: Render the plain-text run report
//! - `run_pipeline`: Generate, render, validate and persist in one pass

pub mod generate;
pub mod report;
pub mod run;

pub use generate::generate_structure;
pub use report::{ReportInput, build_report, pretty_json_or_raw};
pub use run::{RunSummary, run_pipeline};
