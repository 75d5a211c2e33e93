//! The `ingest` command: run the pipeline once for a single file.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use pantry_core::pipeline::Ingestor;
use pantry_core::{Config, IngestPipeline, S3ObjectStore, Store};

pub async fn run(config: &Config, file: &Path) -> Result<()> {
    let store = Store::connect(config)
        .await
        .context("Failed to connect to document store")?;
    let objects = S3ObjectStore::connect(config).await;

    let pipeline = IngestPipeline::new(Arc::new(store), Arc::new(objects), config);
    let outcome = pipeline
        .ingest(file)
        .await
        .with_context(|| format!("Failed to ingest {}", file.display()))?;

    println!("Ingested {} in {}ms", outcome.slug, outcome.duration_ms);
    println!("  url:      {}", outcome.url);
    println!("  size:     {}x{}", outcome.width, outcome.height);
    println!("  archived: {}", outcome.archived_path.display());

    Ok(())
}
