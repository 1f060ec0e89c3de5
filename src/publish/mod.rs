//! Publishing of run artifacts to S3-compatible object storage.
//!
//! Publishing is best effort: every problem is logged and the run goes on.

use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::PublishConfig;
use crate::error::PublishError;
use crate::models::ArtifactPaths;

/// Destination for uploaded artifacts.
#[allow(async_fn_in_trait)]
pub trait Publisher {
    /// Upload one local file to `bucket` under `key`.
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), PublishError>;
}

/// Publisher backed by the AWS S3 client.
///
/// Credentials come from the default AWS provider chain.
#[derive(Debug, Clone)]
pub struct S3Publisher {
    client: Client,
    path_style: bool,
}

impl S3Publisher {
    /// Build a client from the publish settings.
    ///
    /// A custom endpoint switches to path-style addressing, which is what
    /// MinIO and most other S3-compatible stores expect.
    pub async fn new(config: &PublishConfig) -> Self {
        let endpoint = config
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(config.timeout_seconds))
                    .build(),
            );
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let path_style = endpoint.is_some();
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(path_style)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            path_style,
        }
    }

    pub fn path_style(&self) -> bool {
        self.path_style
    }
}

impl Publisher for S3Publisher {
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), PublishError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| PublishError::Read {
                path: local_path.to_path_buf(),
                source: Box::new(e),
            })?;

        debug!("PUT s3://{}/{}", bucket, key);

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| PublishError::Upload(DisplayErrorContext(e).to_string()))?;

        Ok(())
    }
}

/// Counts from one publishing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    pub attempted: usize,
    pub succeeded: usize,
}

/// Local files and their destination keys.
pub fn upload_plan(paths: &ArtifactPaths) -> Vec<(PathBuf, String)> {
    let key = |prefix: &str, path: &Path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("{}/{}", prefix, name)
    };

    vec![
        (paths.cleaned_csv.clone(), key("data", &paths.cleaned_csv)),
        (paths.report_pdf.clone(), key("reports", &paths.report_pdf)),
    ]
}

/// Upload the cleaned dataset and the PDF report.
///
/// Never fails: a disabled setting does nothing, a missing bucket or local
/// file is logged and skipped, and upload errors are logged per file.
pub async fn publish_artifacts<P: Publisher>(
    publisher: &P,
    config: &PublishConfig,
    paths: &ArtifactPaths,
) -> PublishOutcome {
    let mut outcome = PublishOutcome::default();

    if !config.enabled {
        debug!("Publishing disabled");
        return outcome;
    }

    let bucket = match config.bucket.as_deref().map(str::trim) {
        Some(bucket) if !bucket.is_empty() => bucket,
        _ => {
            error!("Missing required setting: AWS_S3_BUCKET");
            return outcome;
        }
    };

    info!("Uploading cleaned data and report to bucket {}", bucket);

    for (local, key) in upload_plan(paths) {
        if !local.exists() {
            error!("File not found: {}", local.display());
            continue;
        }

        outcome.attempted += 1;
        match publisher.upload(&local, bucket, &key).await {
            Ok(()) => {
                outcome.succeeded += 1;
                info!("Uploaded {} to s3://{}/{}", local.display(), bucket, key);
            }
            Err(e) => {
                error!("Failed to upload {}: {:#}", local.display(), anyhow::Error::new(e));
            }
        }
    }

    outcome
}
