pub mod config;
pub mod error;
pub mod image;
pub mod object_store;
pub mod pipeline;
pub mod store;
pub mod types;
pub mod watcher;

pub use config::{Config, ConfigError};
pub use error::{ImageError, IngestError, ObjectStoreError, StoreError};
pub use image::{
    is_image_filename, normalize_image, NormalizedImage, IMAGE_EXTENSIONS, JPEG_QUALITY,
    MAX_HEIGHT, MAX_WIDTH,
};
pub use object_store::{
    list_all, MemoryObjectStore, ObjectPage, ObjectStore, S3ObjectStore, StoredObject,
};
pub use pipeline::{slug_for_path, IngestOutcome, IngestPipeline, Ingestor};
pub use store::{MemoryRecipeStore, RecipeStore, Store, UpdateCounts};
pub use types::{
    preferred_text, Category, FilterFacet, FilterSpec, ImageRef, Ingredient, InstructionStep,
    LocalizedText, Rating, Recipe, RecipeStatus, SeoMeta, Timing,
};
pub use watcher::{WatchSummary, Watcher};
