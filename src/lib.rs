pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, toml_config::BatchConfig, CliConfig};
pub use core::cache::CardTypeCache;
pub use core::{etl::EtlEngine, pipeline::DeckPipeline};
pub use domain::model::{Category, Dialect};
pub use utils::error::{EtlError, Result};
