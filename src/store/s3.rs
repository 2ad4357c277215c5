//! S3-compatible store backend.
//!
//! Talks to AWS S3 or any S3-compatible service (Cloudflare R2, MinIO)
//! through a custom endpoint. Every request is individually time-bounded so
//! a hung connection cannot stall a pipeline stage; a timed-out call is a
//! failed call and follows normal error propagation.

use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;
use tokio::time::timeout;
use tracing::debug;

use crate::config::StoreConfig;

use super::{ObjectBody, ObjectEntry, ObjectStore, StoreError};

/// Object store backend for S3-compatible services.
pub struct S3Store {
    bucket: Box<Bucket>,
    request_timeout: Duration,
}

impl S3Store {
    /// Build a store from the resolved configuration.
    ///
    /// Credentials come from the environment via the config layer, never
    /// from a config file.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        for (field, value) in [
            ("endpoint (SITEFORGE_ENDPOINT)", &config.endpoint),
            ("bucket (SITEFORGE_BUCKET)", &config.bucket),
            ("access key (SITEFORGE_ACCESS_KEY)", &config.access_key),
            ("secret key (SITEFORGE_SECRET_KEY)", &config.secret_key),
        ] {
            if value.is_empty() {
                return Err(StoreError::Backend(anyhow!(
                    "store {field} is not configured"
                )));
            }
        }

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StoreError::Backend(anyhow!(e)))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StoreError::Backend(anyhow!(e)))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            request_timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    fn timeout_error(&self) -> StoreError {
        StoreError::Timeout {
            seconds: self.request_timeout.as_secs(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        let pages = timeout(self.request_timeout, self.bucket.list(prefix.to_string(), None))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| map_s3_error(e, prefix))?;

        let mut entries = Vec::new();
        for page in pages {
            for object in page.contents {
                entries.push(ObjectEntry {
                    key: object.key,
                    size: object.size as u64,
                });
            }
        }

        debug!(prefix, count = entries.len(), "listed objects");
        Ok(entries)
    }

    async fn get(&self, key: &str) -> Result<ObjectBody, StoreError> {
        let response = timeout(self.request_timeout, self.bucket.get_object(key))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| map_s3_error(e, key))?;

        let content_type = response.headers().get("content-type").cloned();
        Ok(ObjectBody {
            bytes: response.bytes().to_vec(),
            content_type,
        })
    }

    async fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), StoreError> {
        timeout(
            self.request_timeout,
            self.bucket.put_object_with_content_type(key, body, content_type),
        )
        .await
        .map_err(|_| self.timeout_error())?
        .map_err(|e| map_s3_error(e, key))?;

        Ok(())
    }
}

/// Classify a backend error into the store taxonomy.
fn map_s3_error(err: S3Error, key: &str) -> StoreError {
    match err {
        S3Error::HttpFailWithBody(404, _) => StoreError::NotFound {
            key: key.to_string(),
        },
        S3Error::HttpFailWithBody(401, _) | S3Error::HttpFailWithBody(403, _) => {
            StoreError::PermissionDenied
        }
        other => StoreError::Backend(anyhow!(other)),
    }
}
