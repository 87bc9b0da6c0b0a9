pub mod cli;
pub mod toml_config;

use crate::core::classify::{DEFAULT_REQUEST_INTERVAL_MS, SCRYFALL_API};
use crate::core::ConfigProvider;
use crate::domain::model::Dialect;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty, validate_path, validate_url, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "jumpstart-etl")]
#[command(about = "Curate JumpStart deck lists from official announcement pages")]
pub struct CliConfig {
    /// HTML announcement pages to parse
    #[arg(required_unless_present = "config")]
    pub inputs: Vec<String>,

    /// HTML layout of the input pages
    #[arg(long, value_enum, default_value_t = Dialect::Tagged)]
    pub dialect: Dialect,

    /// Directory the per-deck text files are written to
    #[arg(long, default_value = "./decks")]
    pub output_path: String,

    /// Persistent card-type cache shared across runs
    #[arg(long, default_value = "card_type_cache.json")]
    pub cache_file: String,

    /// Exact-name card lookup endpoint
    #[arg(long, default_value = SCRYFALL_API)]
    pub api_endpoint: String,

    /// Minimum delay between external lookups, per the service's rate policy
    #[arg(long, default_value_t = DEFAULT_REQUEST_INTERVAL_MS)]
    pub request_interval_ms: u64,

    /// Release name for the set; defaults to the output directory name
    #[arg(long)]
    pub set_name: Option<String>,

    /// Never query the lookup service; uncached cards become Unknown
    #[arg(long)]
    pub offline: bool,

    /// Render everything but write no deck files and no cache
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    /// TOML batch configuration processing several sources in one run
    #[arg(long)]
    pub config: Option<String>,
}

impl ConfigProvider for CliConfig {
    fn input_files(&self) -> &[String] {
        &self.inputs
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn cache_file(&self) -> &str {
        &self.cache_file
    }

    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn request_interval_ms(&self) -> u64 {
        self.request_interval_ms
    }

    fn set_name(&self) -> Option<&str> {
        self.set_name.as_deref()
    }

    fn offline(&self) -> bool {
        self.offline
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.config.is_none() {
            validate_non_empty("inputs", &self.inputs)?;
        }
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_path("output_path", &self.output_path)?;
        validate_path("cache_file", &self.cache_file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig::parse_from(["jumpstart-etl", "page.html"])
    }

    #[test]
    fn defaults_are_valid() {
        let config = base_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.dialect, Dialect::Tagged);
        assert_eq!(config.request_interval_ms, 100);
        assert_eq!(config.api_endpoint, SCRYFALL_API);
    }

    #[test]
    fn rejects_bad_endpoint() {
        let mut config = base_config();
        config.api_endpoint = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn requires_inputs_without_batch_config() {
        let mut config = base_config();
        config.inputs.clear();
        assert!(config.validate().is_err());

        config.config = Some("batch.toml".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_dialect_values() {
        let config =
            CliConfig::parse_from(["jumpstart-etl", "page.html", "--dialect", "heading-list"]);
        assert_eq!(config.dialect, Dialect::HeadingList);
        let config =
            CliConfig::parse_from(["jumpstart-etl", "page.html", "--dialect", "tutorial-table"]);
        assert_eq!(config.dialect, Dialect::TutorialTable);
    }
}
