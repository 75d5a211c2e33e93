//! End-to-end ingestion tests against the in-memory store fakes.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pantry_core::pipeline::{IngestPipeline, Ingestor};
use pantry_core::watcher::Watcher;
use pantry_core::{
    Config, IngestError, MemoryObjectStore, MemoryRecipeStore, Recipe, RecipeStatus,
};

fn test_config(incoming: &Path, processed: &Path) -> Config {
    Config {
        mongo_uri: "mongodb://localhost:27017".to_string(),
        db_name: "pantry".to_string(),
        bucket: "pantry-media".to_string(),
        s3_endpoint: None,
        public_url_base: None,
        incoming_dir: incoming.to_path_buf(),
        processed_dir: processed.to_path_buf(),
        poll_interval: Duration::from_millis(100),
    }
}

fn recipe(slug: &str, title_lt: &str, category: &str) -> Recipe {
    Recipe {
        slug: slug.to_string(),
        title: BTreeMap::from([("lt".to_string(), title_lt.to_string())]),
        category_path: category.to_string(),
        status: RecipeStatus::Public,
        ..Default::default()
    }
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 251) as u8, (y % 241) as u8, 90])
    });
    img.save(path).unwrap();
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_ingest_moves_source_and_patches_record() {
    let incoming = tempfile::tempdir().unwrap();
    let processed = tempfile::tempdir().unwrap();
    let config = test_config(incoming.path(), processed.path());

    let store = Arc::new(
        MemoryRecipeStore::new().with_recipe(recipe("morku-sriuba", "Morkų sriuba", "sriubos")),
    );
    let objects = Arc::new(MemoryObjectStore::new());
    let pipeline = IngestPipeline::new(store.clone(), objects.clone(), &config);

    let source = incoming.path().join("morku-sriuba.jpg");
    write_jpeg(&source, 1000, 600);

    let outcome = pipeline.ingest(&source).await.unwrap();

    // within bounds already: re-encoded, dimensions unchanged
    assert_eq!((outcome.width, outcome.height), (1000, 600));

    // the source moved, same filename, processed directory only
    assert!(!source.exists());
    assert_eq!(dir_entries(incoming.path()), Vec::<String>::new());
    assert_eq!(dir_entries(processed.path()), vec!["morku-sriuba.jpg"]);
    assert_eq!(
        outcome.archived_path,
        processed.path().join("morku-sriuba.jpg")
    );

    // uploaded object carries the public settings
    let object = objects.get("img/morku-sriuba.jpg").unwrap();
    assert_eq!(object.content_type, "image/jpeg");
    assert_eq!(object.cache_control, "public, max-age=31536000");

    // record patched with URL, alt from the Lithuanian title, dimensions
    let patched = store.get("morku-sriuba").unwrap();
    let image = patched.image.unwrap();
    assert_eq!(image.src, outcome.url);
    assert!(image.src.ends_with("img/morku-sriuba.jpg"));
    assert_eq!(image.alt, "Morkų sriuba");
    assert_eq!((image.width, image.height), (1000, 600));
    assert!(patched.updated_at.is_some());
}

#[tokio::test]
async fn test_watched_folder_end_to_end() {
    let incoming = tempfile::tempdir().unwrap();
    let processed = tempfile::tempdir().unwrap();
    let config = test_config(incoming.path(), processed.path());

    let store = Arc::new(
        MemoryRecipeStore::new().with_recipe(recipe("example-soup", "Example soup", "sriubos")),
    );
    let objects = Arc::new(MemoryObjectStore::new());
    let pipeline = Arc::new(IngestPipeline::new(store.clone(), objects.clone(), &config));

    write_jpeg(&incoming.path().join("example-soup.jpg"), 3000, 2000);

    let mut watcher = Watcher::new(
        config.incoming_dir.clone(),
        config.poll_interval,
        pipeline,
    );
    assert_eq!(watcher.poll_once().await.unwrap(), 1);
    watcher.drain().await;
    let summary = watcher.summary();
    assert_eq!(summary.dispatched, 1);
    assert_eq!(summary.succeeded, 1);

    let patched = store.get("example-soup").unwrap();
    let image = patched.image.unwrap();
    assert!(image.src.contains("example-soup"));
    assert!(image.width <= 1200 && image.height <= 800);
    // 3:2 ratio preserved
    assert_eq!((image.width, image.height), (1200, 800));

    // source lives only under the processed directory now
    assert_eq!(dir_entries(incoming.path()), Vec::<String>::new());
    assert_eq!(dir_entries(processed.path()), vec!["example-soup.jpg"]);
}

#[tokio::test]
async fn test_unmatched_file_is_left_in_place() {
    let incoming = tempfile::tempdir().unwrap();
    let processed = tempfile::tempdir().unwrap();
    let config = test_config(incoming.path(), processed.path());

    let store = Arc::new(MemoryRecipeStore::new());
    let objects = Arc::new(MemoryObjectStore::new());
    let pipeline = IngestPipeline::new(store.clone(), objects.clone(), &config);

    let source = incoming.path().join("unknown.jpg");
    write_jpeg(&source, 100, 100);

    let err = pipeline.ingest(&source).await.unwrap_err();
    assert!(matches!(err, IngestError::RecipeNotFound { .. }));
    assert!(err.to_string().contains("unknown"));

    // nothing uploaded, nothing moved
    assert!(source.exists());
    assert!(objects.is_empty());
    assert_eq!(dir_entries(processed.path()), Vec::<String>::new());
}

#[tokio::test]
async fn test_upload_failure_stops_before_patch_and_archive() {
    let incoming = tempfile::tempdir().unwrap();
    let processed = tempfile::tempdir().unwrap();
    let config = test_config(incoming.path(), processed.path());

    let store = Arc::new(
        MemoryRecipeStore::new().with_recipe(recipe("cepelinai", "Cepelinai", "karsti-patiekalai")),
    );
    let objects = Arc::new(MemoryObjectStore::new().with_upload_failure("img/cepelinai.jpg"));
    let pipeline = IngestPipeline::new(store.clone(), objects.clone(), &config);

    let source = incoming.path().join("cepelinai.jpg");
    write_jpeg(&source, 2000, 1500);

    let err = pipeline.ingest(&source).await.unwrap_err();
    assert!(matches!(err, IngestError::ObjectStore(_)));

    // the record was not patched and the source file did not move
    assert!(store.get("cepelinai").unwrap().image.is_none());
    assert!(source.exists());
    assert_eq!(dir_entries(processed.path()), Vec::<String>::new());
}
