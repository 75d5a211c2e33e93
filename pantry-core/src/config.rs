//! Process configuration from environment variables.
//!
//! All environment access happens here, once, at startup. Components receive
//! the resulting [`Config`] by reference and never read the environment
//! themselves.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default database name.
pub const DEFAULT_DB_NAME: &str = "pantry";

/// Default object-store bucket.
pub const DEFAULT_BUCKET: &str = "pantry-media";

/// Fixed key prefix for uploaded recipe images.
pub const IMAGE_KEY_PREFIX: &str = "img";

/// Cache directive attached to uploaded images (one year).
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Default directory polled for new images.
pub const DEFAULT_INCOMING_DIR: &str = "incoming";

/// Default directory receiving originals after successful ingestion.
pub const DEFAULT_PROCESSED_DIR: &str = "processed";

/// Seconds between watcher polls of the incoming directory.
pub const POLL_INTERVAL_SECS: u64 = 2;

/// Default safety-window delay before a bulk delete, in seconds.
pub const DEFAULT_CLEANUP_DELAY_SECS: u64 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Admin toolkit configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store connection string.
    pub mongo_uri: String,
    /// Database name.
    pub db_name: String,
    /// Object-store bucket.
    pub bucket: String,
    /// Optional S3-compatible endpoint override (path-style addressing).
    pub s3_endpoint: Option<String>,
    /// Optional public URL base override (e.g. a CDN host).
    pub public_url_base: Option<String>,
    /// Directory polled for new images.
    pub incoming_dir: PathBuf,
    /// Directory receiving originals after successful ingestion.
    pub processed_dir: PathBuf,
    /// Interval between watcher polls.
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `PANTRY_MONGO_URI`: document store connection string
    ///
    /// Optional:
    /// - `PANTRY_DB_NAME`: database name (default: "pantry")
    /// - `PANTRY_S3_BUCKET`: bucket name (default: "pantry-media")
    /// - `PANTRY_S3_ENDPOINT`: S3-compatible endpoint override
    /// - `PANTRY_PUBLIC_URL_BASE`: public URL base override
    /// - `PANTRY_INCOMING_DIR`: watched directory (default: "incoming")
    /// - `PANTRY_PROCESSED_DIR`: archive directory (default: "processed")
    ///
    /// Object-store region and credentials come from the standard AWS
    /// variables (`AWS_REGION`, `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`)
    /// and are resolved by the SDK, not here.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongo_uri = env::var("PANTRY_MONGO_URI")
            .map_err(|_| ConfigError::MissingEnvVar("PANTRY_MONGO_URI".to_string()))?;

        let db_name = env::var("PANTRY_DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string());

        let bucket = env::var("PANTRY_S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string());

        let s3_endpoint = env::var("PANTRY_S3_ENDPOINT").ok();

        let public_url_base = env::var("PANTRY_PUBLIC_URL_BASE").ok();

        let incoming_dir = env::var("PANTRY_INCOMING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_INCOMING_DIR));

        let processed_dir = env::var("PANTRY_PROCESSED_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROCESSED_DIR));

        Ok(Self {
            mongo_uri,
            db_name,
            bucket,
            s3_endpoint,
            public_url_base,
            incoming_dir,
            processed_dir,
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var reads are process-global, so this single test covers both the
    // missing-required and defaulted paths without racing a parallel test.
    #[test]
    fn test_from_env() {
        env::remove_var("PANTRY_MONGO_URI");
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PANTRY_MONGO_URI"));

        env::set_var("PANTRY_MONGO_URI", "mongodb://localhost:27017");
        let config = Config::from_env().unwrap();
        assert_eq!(config.db_name, DEFAULT_DB_NAME);
        assert_eq!(config.bucket, DEFAULT_BUCKET);
        assert_eq!(config.incoming_dir, PathBuf::from(DEFAULT_INCOMING_DIR));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        env::remove_var("PANTRY_MONGO_URI");
    }
}
