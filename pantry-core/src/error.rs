use std::path::PathBuf;

use thiserror::Error;

/// Errors from the document store accessor and the typed read boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to connect to document store: {0}")]
    Connect(mongodb::error::Error),

    #[error("Query failed on collection '{collection}': {source}")]
    Query {
        collection: String,
        source: mongodb::error::Error,
    },

    #[error("Malformed document in '{collection}' (key: {key}): {source}")]
    Malformed {
        collection: String,
        key: String,
        source: mongodb::bson::de::Error,
    },

    #[error("Failed to encode document for '{collection}' (key: {key}): {source}")]
    Encode {
        collection: String,
        key: String,
        source: mongodb::bson::ser::Error,
    },
}

/// Errors from the object-store client.
#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("Failed to list objects under '{prefix}': {source}")]
    List {
        prefix: String,
        source: aws_sdk_s3::Error,
    },

    #[error("Failed to upload object '{key}': {source}")]
    Upload {
        key: String,
        source: aws_sdk_s3::Error,
    },

    #[error("Failed to delete object '{key}': {source}")]
    Delete {
        key: String,
        source: aws_sdk_s3::Error,
    },

    #[error("Object store failure: {0}")]
    Backend(String),
}

/// Errors from the image normalizer, always naming the offending path.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to open image {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to encode image {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Errors from one ingestion pipeline run. Each run targets a single source
/// file, so callers iterating a batch report these per item and continue.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Source path has no usable file name: {}", .0.display())]
    InvalidSourcePath(PathBuf),

    #[error("No recipe found for slug '{slug}' (source file: {file})")]
    RecipeNotFound { slug: String, file: String },

    #[error("Image normalization failed: {0}")]
    Image(#[from] ImageError),

    #[error("Image task failed for {}: {source}", .path.display())]
    ImageTask {
        path: PathBuf,
        source: tokio::task::JoinError,
    },

    #[error("Document store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Object store operation failed: {0}")]
    ObjectStore(#[from] ObjectStoreError),

    #[error("Failed to write temp file {}: {source}", .path.display())]
    TempFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to archive {} to {}: {source}", .from.display(), .to.display())]
    Archive {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}
