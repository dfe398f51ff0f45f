//! Storage abstractions for run artifacts.
//!
//! Every run persists three files sharing one timestamp:
//!
//! ```text
//! {root}/
//! ├── generated-templates/
//! │   └── pnp_template_20260116_093000.xml
//! ├── llm-outputs/
//! │   └── llm_response_20260116_093000.json
//! └── validation-reports/
//!     └── comprehensive_report_20260116_093000.txt
//! ```
//!
//! Directory names and the template prefix come from `[output]` in the
//! configuration.

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;

/// Timestamp format shared by artifact file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Format a run timestamp for file names and reports.
pub fn run_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Trait for artifact storage backends.
#[async_trait]
pub trait OutputStorage: Send + Sync {
    /// Persist the provisioning document and return its path.
    async fn save_template(&self, timestamp: &str, xml: &str) -> Result<PathBuf>;

    /// Persist the generator output (already formatted) and return its path.
    async fn save_raw_output(&self, timestamp: &str, content: &str) -> Result<PathBuf>;

    /// Persist the run report and return its path.
    async fn save_report(&self, timestamp: &str, report: &str) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_run_timestamp_format() {
        let at = Local.with_ymd_and_hms(2026, 1, 16, 9, 30, 5).unwrap();
        assert_eq!(run_timestamp(at), "20260116_093005");
    }
}
