//! The `watch` command: poll the incoming folder until ctrl-c.

use std::sync::Arc;

use anyhow::{Context, Result};
use pantry_core::{Config, IngestPipeline, S3ObjectStore, Store, Watcher};

pub async fn run(config: &Config) -> Result<()> {
    let store = Store::connect(config)
        .await
        .context("Failed to connect to document store")?;
    let objects = S3ObjectStore::connect(config).await;

    tokio::fs::create_dir_all(&config.incoming_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.incoming_dir.display()))?;
    tokio::fs::create_dir_all(&config.processed_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.processed_dir.display()))?;

    let pipeline = Arc::new(IngestPipeline::new(
        Arc::new(store),
        Arc::new(objects),
        config,
    ));

    println!(
        "Watching {} (every {}s, ctrl-c to stop)",
        config.incoming_dir.display(),
        config.poll_interval.as_secs()
    );

    let summary = Watcher::new(
        config.incoming_dir.clone(),
        config.poll_interval,
        pipeline,
    )
    .run()
    .await;

    println!();
    println!("Watcher stopped.");
    println!("  dispatched: {}", summary.dispatched);
    println!("  succeeded:  {}", summary.succeeded);
    println!("  failed:     {}", summary.failed);

    Ok(())
}
