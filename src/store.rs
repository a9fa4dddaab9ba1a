//! Object storage targets.
//!
//! The publish pipeline writes through the [`ObjectStore`] trait, one
//! [`PutObject`] per file. Two implementations ship with the crate:
//!
//! - [`S3Store`]: `PutObject` calls against an S3 bucket (or any
//!   S3-compatible endpoint such as MinIO or LocalStack)
//! - [`DirectoryStore`]: writes each object to `<dir>/<key>`, for local
//!   builds and previews
//!
//! Stores make one attempt per object; retries are out of scope.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use std::error::Error;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error writing {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("S3 error for {key}: {message}")]
    S3 { key: String, message: String },
    #[error("invalid object key: {0}")]
    InvalidKey(String),
}

/// One object write.
#[derive(Debug, Clone, PartialEq)]
pub struct PutObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write a single object, replacing any existing one at the same key.
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError>;

    /// Human-readable target, e.g. `s3://bucket` or a directory path.
    fn describe(&self) -> String;
}

// =============================================================================
// S3
// =============================================================================

/// Connection settings for [`S3Store`].
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    /// Falls back to the AWS environment (`AWS_REGION`, profile) when `None`.
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

/// Uploads objects to an S3 bucket.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from the AWS default credential chain.
    pub async fn connect(settings: S3Settings) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        // Custom endpoints address buckets as endpoint/bucket/key.
        let client = if settings.endpoint.is_some() {
            let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                .force_path_style(true)
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(&sdk_config)
        };

        Self {
            client,
            bucket: settings.bucket,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object.key)
            .body(ByteStream::from(object.body))
            .content_type(object.content_type)
            .send()
            .await
            .map_err(|e| StoreError::S3 {
                key: object.key.clone(),
                message: error_chain(&e),
            })?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("s3://{}", self.bucket)
    }
}

/// Walk the error source chain and join all messages.
pub fn error_chain(err: &dyn Error) -> String {
    let mut msgs = vec![err.to_string()];
    let mut source = err.source();
    while let Some(s) = source {
        msgs.push(s.to_string());
        source = s.source();
    }
    msgs.join(": ")
}

// =============================================================================
// Local directory
// =============================================================================

/// Writes objects as files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to a path under the root, rejecting keys that escape it.
    fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(StoreError::InvalidKey(key.to_string())),
                _ => path.push(segment),
            }
        }
        if path == self.root {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(path)
    }
}

#[async_trait]
impl ObjectStore for DirectoryStore {
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
        let path = self.object_path(&object.key)?;
        let io_err = |source| StoreError::Io {
            key: object.key.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&path, &object.body).await.map_err(io_err)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
