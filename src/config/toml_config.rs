use crate::core::classify::{DEFAULT_REQUEST_INTERVAL_MS, SCRYFALL_API};
use crate::core::ConfigProvider;
use crate::domain::model::Dialect;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_path, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TOML batch run: several announcement pages processed in one go, sharing
/// one card-type cache across all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub pipeline: PipelineMeta,
    pub cache: CacheConfig,
    pub lookup: Option<LookupConfig>,
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineMeta {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    pub endpoint: Option<String>,
    pub request_interval_ms: Option<u64>,
    pub offline: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input: String,
    pub dialect: Dialect,
    pub output_path: String,
    pub set_name: Option<String>,
}

impl BatchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// Substitute ${VAR_NAME} placeholders from the environment; unknown
    /// variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn endpoint(&self) -> &str {
        self.lookup
            .as_ref()
            .and_then(|l| l.endpoint.as_deref())
            .unwrap_or(SCRYFALL_API)
    }

    pub fn request_interval_ms(&self) -> u64 {
        self.lookup
            .as_ref()
            .and_then(|l| l.request_interval_ms)
            .unwrap_or(DEFAULT_REQUEST_INTERVAL_MS)
    }

    pub fn offline(&self) -> bool {
        self.lookup
            .as_ref()
            .and_then(|l| l.offline)
            .unwrap_or(false)
    }

    /// One runnable per-source config, sharing the batch-wide cache file and
    /// lookup settings.
    pub fn source_runs(&self, dry_run: bool) -> Vec<SourceRun> {
        self.sources
            .iter()
            .map(|source| SourceRun {
                inputs: vec![source.input.clone()],
                dialect: source.dialect,
                output_path: source.output_path.clone(),
                cache_file: self.cache.file.clone(),
                api_endpoint: self.endpoint().to_string(),
                request_interval_ms: self.request_interval_ms(),
                set_name: source.set_name.clone(),
                offline: self.offline(),
                dry_run,
            })
            .collect()
    }
}

impl Validate for BatchConfig {
    fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(EtlError::ValidationError {
                message: "sources: at least one entry is required".to_string(),
            });
        }
        validate_url("lookup.endpoint", self.endpoint())?;
        validate_path("cache.file", &self.cache.file)?;
        for (index, source) in self.sources.iter().enumerate() {
            validate_path(&format!("sources[{}].input", index), &source.input)?;
            validate_path(&format!("sources[{}].output_path", index), &source.output_path)?;
        }
        Ok(())
    }
}

/// Effective configuration for one batch source.
#[derive(Debug, Clone)]
pub struct SourceRun {
    inputs: Vec<String>,
    dialect: Dialect,
    output_path: String,
    cache_file: String,
    api_endpoint: String,
    request_interval_ms: u64,
    set_name: Option<String>,
    offline: bool,
    dry_run: bool,
}

impl ConfigProvider for SourceRun {
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
