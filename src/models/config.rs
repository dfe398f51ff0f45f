//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Language-model request settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Output locations and naming
    #[serde(default)]
    pub output: OutputConfig,

    /// Console reporting settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if !path.as_ref().exists() {
            log::debug!(
                "No config file at {:?}. Using defaults.",
                path.as_ref()
            );
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.generator.models.is_empty() {
            return Err(AppError::validation("generator.models is empty"));
        }
        if self.generator.models.iter().any(|m| m.trim().is_empty()) {
            return Err(AppError::validation("generator.models contains a blank entry"));
        }
        if self.generator.timeout_secs == 0 {
            return Err(AppError::validation("generator.timeout_secs must be > 0"));
        }
        if self.generator.max_tokens == 0 {
            return Err(AppError::validation("generator.max_tokens must be > 0"));
        }
        if !(0.0..=2.0).contains(&self.generator.temperature) {
            return Err(AppError::validation(
                "generator.temperature must be within 0.0..=2.0",
            ));
        }
        url::Url::parse(&self.generator.base_url)?;

        if self.output.template_prefix.trim().is_empty() {
            return Err(AppError::validation("output.template_prefix is empty"));
        }
        for (key, dir) in [
            ("output.templates_dir", &self.output.templates_dir),
            ("output.llm_outputs_dir", &self.output.llm_outputs_dir),
            ("output.reports_dir", &self.output.reports_dir),
        ] {
            if dir.trim().is_empty() {
                return Err(AppError::validation(format!("{key} is empty")));
            }
        }
        Ok(())
    }
}

/// Chat-completion request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Environment variable holding the API key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Models to try, in order, until one answers
    #[serde(default = "defaults::models")]
    pub models: Vec<String>,

    #[serde(default = "defaults::temperature")]
    pub temperature: f64,

    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key_env: defaults::api_key_env(),
            base_url: defaults::base_url(),
            models: defaults::models(),
            temperature: defaults::temperature(),
            max_tokens: defaults::max_tokens(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

impl GeneratorConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Output directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::templates_dir")]
    pub templates_dir: String,

    #[serde(default = "defaults::llm_outputs_dir")]
    pub llm_outputs_dir: String,

    #[serde(default = "defaults::reports_dir")]
    pub reports_dir: String,

    /// File name prefix for generated templates
    #[serde(default = "defaults::template_prefix")]
    pub template_prefix: String,

    /// XSD used to validate generated templates
    #[serde(default = "defaults::schema_file")]
    pub schema_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            templates_dir: defaults::templates_dir(),
            llm_outputs_dir: defaults::llm_outputs_dir(),
            reports_dir: defaults::reports_dir(),
            template_prefix: defaults::template_prefix(),
            schema_file: defaults::schema_file(),
        }
    }
}

/// Console reporting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Number of validation diagnostics echoed to the console
    #[serde(default = "defaults::max_console_errors")]
    pub max_console_errors: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            max_console_errors: defaults::max_console_errors(),
        }
    }
}

mod defaults {
    // Generator defaults
    pub fn api_key_env() -> String {
        "OPENAI_API_KEY".into()
    }
    pub fn base_url() -> String {
        "https://api.openai.com/v1".into()
    }
    pub fn models() -> Vec<String> {
        vec![
            "gpt-4-turbo-preview".into(),
            "gpt-4".into(),
            "gpt-3.5-turbo".into(),
        ]
    }
    pub fn temperature() -> f64 {
        0.1
    }
    pub fn max_tokens() -> u32 {
        3000
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn user_agent() -> String {
        concat!("pnpgen/", env!("CARGO_PKG_VERSION")).into()
    }

    // Output defaults
    pub fn templates_dir() -> String {
        "generated-templates".into()
    }
    pub fn llm_outputs_dir() -> String {
        "llm-outputs".into()
    }
    pub fn reports_dir() -> String {
        "validation-reports".into()
    }
    pub fn template_prefix() -> String {
        "pnp_template".into()
    }
    pub fn schema_file() -> String {
        "ProvisioningSchema-2022-09.xsd".into()
    }

    // Logging defaults
    pub fn max_console_errors() -> usize {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_models() {
        let mut config = Config::default();
        config.generator.models.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.generator.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.generator.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [generator]
            models = ["gpt-4o-mini"]

            [output]
            template_prefix = "intranet"
            "#,
        )
        .unwrap();

        assert_eq!(config.generator.models, vec!["gpt-4o-mini".to_string()]);
        assert_eq!(config.generator.max_tokens, 3000);
        assert_eq!(config.output.template_prefix, "intranet");
        assert_eq!(config.output.reports_dir, "validation-reports");
        assert_eq!(config.logging.max_console_errors, 5);
    }

    #[test]
    fn load_or_default_handles_missing_file() {
        let config = Config::load_or_default("/nonexistent/pnpgen.toml");
        assert_eq!(config.output.templates_dir, "generated-templates");
    }
}
