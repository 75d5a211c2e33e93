//! The image ingestion pipeline.
//!
//! One run takes a source file through five steps: resolve the target
//! record, normalize the image, upload it, patch the record, archive the
//! source. Each step must fully succeed before the next begins, and nothing
//! is rolled back on failure. A re-run after the archive step finds no
//! source file at all, which is what makes ingestion exactly-once.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{Config, IMAGE_CACHE_CONTROL, IMAGE_KEY_PREFIX};
use crate::error::IngestError;
use crate::image::normalize_image;
use crate::object_store::ObjectStore;
use crate::store::RecipeStore;
use crate::types::{preferred_text, ImageRef};

/// Result of one successful ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub slug: String,
    /// Public URL of the uploaded image.
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Where the original source file went.
    pub archived_path: PathBuf,
    pub duration_ms: u64,
}

/// Seam between the watcher and the pipeline, enabling fakes in tests.
#[async_trait]
pub trait Ingestor: Send + Sync {
    /// Ingest one source file.
    async fn ingest(&self, path: &Path) -> Result<IngestOutcome, IngestError>;
}

/// The association rule between a source file and its target record: the
/// filename stem is the recipe slug, so `example-soup.jpg` targets the
/// recipe `example-soup`.
pub fn slug_for_path(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

/// Production pipeline over the document and object stores.
pub struct IngestPipeline {
    store: Arc<dyn RecipeStore>,
    objects: Arc<dyn ObjectStore>,
    processed_dir: PathBuf,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn RecipeStore>,
        objects: Arc<dyn ObjectStore>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            objects,
            processed_dir: config.processed_dir.clone(),
        }
    }
}

#[async_trait]
impl Ingestor for IngestPipeline {
    async fn ingest(&self, path: &Path) -> Result<IngestOutcome, IngestError> {
        let started = Instant::now();

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| IngestError::InvalidSourcePath(path.to_path_buf()))?
            .to_string();
        let slug = slug_for_path(path)
            .ok_or_else(|| IngestError::InvalidSourcePath(path.to_path_buf()))?
            .to_string();

        // Resolve the target record; not-found is a hard error for this item.
        let recipe = self
            .store
            .find_by_slug(&slug)
            .await?
            .ok_or_else(|| IngestError::RecipeNotFound {
                slug: slug.clone(),
                file: file_name.clone(),
            })?;

        // Normalize off the event loop; decode and encode are CPU-bound.
        let source = path.to_path_buf();
        let normalized = tokio::task::spawn_blocking(move || normalize_image(&source))
            .await
            .map_err(|e| IngestError::ImageTask {
                path: path.to_path_buf(),
                source: e,
            })??;
        let (width, height) = (normalized.width, normalized.height);

        // Stage the compressed bytes, then upload them under the slug key.
        let temp_path = std::env::temp_dir().join(format!("pantry-{}.jpg", Uuid::new_v4()));
        tokio::fs::write(&temp_path, &normalized.bytes)
            .await
            .map_err(|e| IngestError::TempFile {
                path: temp_path.clone(),
                source: e,
            })?;

        let key = format!("{}/{}.jpg", IMAGE_KEY_PREFIX, slug);
        let url = self
            .objects
            .upload(&key, normalized.bytes, "image/jpeg", IMAGE_CACHE_CONTROL)
            .await?;

        // Patch the record's image reference and updated timestamp.
        let alt = preferred_text(&recipe.title)
            .map(str::to_string)
            .unwrap_or_else(|| slug.clone());
        let image = ImageRef {
            src: url.clone(),
            alt,
            width,
            height,
        };
        let matched = self.store.set_image(&slug, &image).await?;
        if !matched {
            // The record vanished between resolve and patch.
            return Err(IngestError::RecipeNotFound {
                slug: slug.clone(),
                file: file_name.clone(),
            });
        }

        // Archive the original and drop the temp file.
        tokio::fs::create_dir_all(&self.processed_dir)
            .await
            .map_err(|e| IngestError::Archive {
                from: path.to_path_buf(),
                to: self.processed_dir.clone(),
                source: e,
            })?;
        let archived_path = self.processed_dir.join(&file_name);
        tokio::fs::rename(path, &archived_path)
            .await
            .map_err(|e| IngestError::Archive {
                from: path.to_path_buf(),
                to: archived_path.clone(),
                source: e,
            })?;
        if let Err(e) = tokio::fs::remove_file(&temp_path).await {
            tracing::warn!(path = %temp_path.display(), error = %e, "failed to remove temp file");
        }

        let outcome = IngestOutcome {
            slug,
            url,
            width,
            height,
            archived_path,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            slug = %outcome.slug,
            url = %outcome.url,
            width,
            height,
            duration_ms = outcome.duration_ms,
            "ingested image"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_for_path() {
        assert_eq!(slug_for_path(Path::new("example-soup.jpg")), Some("example-soup"));
        assert_eq!(
            slug_for_path(Path::new("incoming/morku-sriuba.PNG")),
            Some("morku-sriuba")
        );
        // no stem to speak of
        assert_eq!(slug_for_path(Path::new("/")), None);
    }
}
