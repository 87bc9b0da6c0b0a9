use clap::Parser;
use jumpstart_etl::core::ConfigProvider;
use jumpstart_etl::utils::{logger, validation::Validate};
use jumpstart_etl::{BatchConfig, CardTypeCache, CliConfig, DeckPipeline, EtlEngine, LocalStorage};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting jumpstart-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let result = match config.config.clone() {
        Some(batch_path) => run_batch(&batch_path, config.dry_run).await,
        None => run_single(config).await,
    };

    if let Err(e) = result {
        tracing::error!("Run failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn load_cache(path: &str) -> CardTypeCache {
    let mut cache = CardTypeCache::new();
    match cache.load_file(Path::new(path)) {
        Ok(merged) => tracing::info!("loaded {} cached card types from {}", merged, path),
        // a missing or unreadable cache only costs extra lookups
        Err(e) => tracing::warn!("starting with an empty cache ({}: {})", path, e),
    }
    cache
}

async fn run_single(config: CliConfig) -> jumpstart_etl::Result<()> {
    let cache = load_cache(&config.cache_file);
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = DeckPipeline::new(storage, config, cache);

    let engine = EtlEngine::new(pipeline);
    engine.run().await?;
    Ok(())
}

async fn run_batch(batch_path: &str, dry_run: bool) -> jumpstart_etl::Result<()> {
    let batch = BatchConfig::from_file(batch_path)?;
    batch.validate()?;
    tracing::info!(
        "Batch {}: {} sources",
        batch.pipeline.name,
        batch.sources.len()
    );

    // one cache carried through every source, saved after each run
    let mut cache = load_cache(&batch.cache.file);
    for run in batch.source_runs(dry_run) {
        let storage = LocalStorage::new(run.output_path().to_string());
        let pipeline = DeckPipeline::new(storage, run, cache);
        let engine = EtlEngine::new(pipeline);
        engine.run().await?;
        cache = engine.into_pipeline().into_cache();
    }
    Ok(())
}
