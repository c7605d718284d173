use crate::adapters::object_storage::public_url;
use crate::domain::ports::ObjectStorage;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, Clone)]
pub struct S3ObjectStorage {
    client: S3Client,
    public_base_url: String,
}

impl S3ObjectStorage {
    pub fn new(client: S3Client, public_base_url: impl Into<String>) -> Self {
        Self {
            client,
            public_base_url: public_base_url.into(),
        }
    }

    /// 依設定建立 client；有 endpoint 時使用 path-style (MinIO 等相容服務)
    pub async fn connect(
        region: &str,
        endpoint: Option<&str>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder =
            aws_sdk_s3::config::Builder::from(&shared).region(Region::new(region.to_string()));
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = S3Client::from_conf(builder.build());
        Self::new(client, public_base_url)
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|err| {
                let service_error = err.into_service_error();
                AppError::StorageError {
                    message: format!(
                        "Failed to write s3://{}/{}: {} ({})",
                        bucket,
                        path,
                        service_error.message().unwrap_or("no message"),
                        service_error.code().unwrap_or("unknown code"),
                    ),
                }
            })?;

        tracing::debug!("Uploaded {} bytes to s3://{}/{}", size, bucket, path);
        Ok(public_url(&self.public_base_url, bucket, path))
    }
}
