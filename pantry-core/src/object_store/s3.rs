//! S3 implementation of the object-store client.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use crate::config::Config;
use crate::error::ObjectStoreError;

use super::{ObjectPage, ObjectStore, StoredObject};

/// S3 (or S3-compatible) object store scoped to one bucket.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url_base: String,
}

impl S3ObjectStore {
    /// Build a client from the standard AWS environment (region, credentials)
    /// plus the endpoint/bucket settings in `config`.
    pub async fn connect(config: &Config) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.s3_endpoint {
            // S3-compatible stores generally want path-style addressing
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());

        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());
        let public_url_base = derive_public_url_base(
            &config.bucket,
            &region,
            config.s3_endpoint.as_deref(),
            config.public_url_base.as_deref(),
        );

        Self {
            client,
            bucket: config.bucket.clone(),
            public_url_base,
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url_base, key)
    }
}

/// Where uploaded objects become reachable: an explicit override wins, an
/// endpoint override implies path-style URLs, otherwise the standard
/// virtual-hosted S3 form.
fn derive_public_url_base(
    bucket: &str,
    region: &str,
    endpoint: Option<&str>,
    url_base_override: Option<&str>,
) -> String {
    match (url_base_override, endpoint) {
        (Some(base), _) => base.trim_end_matches('/').to_string(),
        (None, Some(endpoint)) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        (None, None) => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, ObjectStoreError> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix);
        if let Some(token) = continuation {
            request = request.continuation_token(token);
        }

        let output = request.send().await.map_err(|e| ObjectStoreError::List {
            prefix: prefix.to_string(),
            source: e.into(),
        })?;

        let objects = output
            .contents()
            .iter()
            .map(|object| StoredObject {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size().unwrap_or(0),
            })
            .collect();

        Ok(ObjectPage {
            objects,
            next_token: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<String, ObjectStoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .cache_control(cache_control)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Upload {
                key: key.to_string(),
                source: e.into(),
            })?;

        let url = self.public_url(key);
        tracing::debug!(key, url = %url, "uploaded object");
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Delete {
                key: key.to_string(),
                source: e.into(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_base_default() {
        let base = derive_public_url_base("pantry-media", "eu-central-1", None, None);
        assert_eq!(base, "https://pantry-media.s3.eu-central-1.amazonaws.com");
    }

    #[test]
    fn test_public_url_base_endpoint_override() {
        let base = derive_public_url_base(
            "pantry-media",
            "us-east-1",
            Some("http://localhost:9000/"),
            None,
        );
        assert_eq!(base, "http://localhost:9000/pantry-media");
    }

    #[test]
    fn test_public_url_base_cdn_override() {
        let base = derive_public_url_base(
            "pantry-media",
            "us-east-1",
            Some("http://localhost:9000"),
            Some("https://static.receptai.example/"),
        );
        assert_eq!(base, "https://static.receptai.example");
    }
}
