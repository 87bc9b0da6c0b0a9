use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Hand the pipeline back after a run, so batch callers can recover
    /// state carried inside it (the card type cache).
    pub fn into_pipeline(self) -> P {
        self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Extracting deck lists...");
        let raw_decks = self.pipeline.extract().await?;
        tracing::info!("Extracted {} deck blocks", raw_decks.len());

        tracing::info!("Normalizing and classifying cards...");
        let theme_set = self.pipeline.transform(raw_decks).await?;
        tracing::info!("Classified {} decks for {}", theme_set.decks.len(), theme_set.name);

        tracing::info!("Writing deck files...");
        let output_path = self.pipeline.load(theme_set).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
