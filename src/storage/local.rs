//! Local filesystem storage implementation.
//!
//! Files are written atomically: content goes to a sibling `.tmp` file that
//! is renamed into place once flushed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::OutputConfig;
use crate::storage::OutputStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    output: OutputConfig,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, output: OutputConfig) -> Self {
        Self {
            root_dir: root_dir.into(),
            output,
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    fn template_key(&self, timestamp: &str) -> String {
        format!(
            "{}/{}_{}.xml",
            self.output.templates_dir, self.output.template_prefix, timestamp
        )
    }

    fn raw_output_key(&self, timestamp: &str) -> String {
        format!("{}/llm_response_{}.json", self.output.llm_outputs_dir, timestamp)
    }

    fn report_key(&self, timestamp: &str) -> String {
        format!(
            "{}/comprehensive_report_{}.txt",
            self.output.reports_dir, timestamp
        )
    }
}

#[async_trait]
impl OutputStorage for LocalStorage {
    async fn save_template(&self, timestamp: &str, xml: &str) -> Result<PathBuf> {
        self.write_bytes(&self.template_key(timestamp), xml.as_bytes())
            .await
    }

    async fn save_raw_output(&self, timestamp: &str, content: &str) -> Result<PathBuf> {
        self.write_bytes(&self.raw_output_key(timestamp), content.as_bytes())
            .await
    }

    async fn save_report(&self, timestamp: &str, report: &str) -> Result<PathBuf> {
        self.write_bytes(&self.report_key(timestamp), report.as_bytes())
            .await
    }
}
