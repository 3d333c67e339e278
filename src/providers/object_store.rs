use std::collections::HashMap;
use std::io::{Cursor, Write};

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::{ByteStream as S3Body, ByteStreamError};
use aws_sdk_s3::Client;
use futures::StreamExt;
use uuid::Uuid;
use zip::write::{FileOptions, ZipWriter};

use crate::config::ObjectStoreConfig;
use crate::domain::model::{ByteStream, ObjectMetadata, ObjectWithMetadata};
use crate::domain::ports::StorageProvider;
use crate::providers::pairtree::pairtree_path;
use crate::utils::error::{Result, StorageError};
use crate::utils::stream::{rechunk, DEFAULT_CHUNK_SIZE};
use crate::utils::validation::Validate;

const OCTET_STREAM: &str = "application/octet-stream";
const DEFAULT_CONCURRENT_FETCHES: usize = 8;

/// Storage provider backed by an S3-compatible object store.
///
/// Container keys are mapped to pairtree prefixes inside a single bucket;
/// object keys are appended to the prefix untouched. Operations without an
/// object-storage analogue fail with [`StorageError::NotImplemented`].
pub struct ObjectStoreProvider {
    client: Client,
    bucket: String,
    concurrent_fetches: usize,
}

fn sdk_error<E>(err: SdkError<E>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let status_code = err
        .raw_response()
        .map(|response| response.status().as_u16())
        .unwrap_or(0);
    StorageError::OperationFailed {
        status_code,
        message: DisplayErrorContext(&err).to_string(),
    }
}

fn body_error(err: ByteStreamError) -> StorageError {
    StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, err))
}

/// Assemble fetched container members into a zip archive. A failed member
/// fetch is logged and the member omitted; the export itself still succeeds.
/// Entries are keyed by object key, not completion order.
fn assemble_container_zip(
    fetched: Vec<(String, Result<Vec<u8>>)>,
    translations: Option<&HashMap<String, String>>,
) -> Result<Vec<u8>> {
    let mut entries: Vec<(String, Vec<u8>)> = fetched
        .into_iter()
        .filter_map(|(key, content)| match content {
            Ok(content) => Some((key, content)),
            Err(err) => {
                tracing::warn!("skipping object {} in container export: {}", key, err);
                None
            }
        })
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (key, content) in entries {
        let file_name = translations
            .and_then(|t| t.get(&key))
            .cloned()
            .unwrap_or(key);
        writer.start_file::<_, ()>(file_name, FileOptions::default())?;
        writer.write_all(&content)?;
    }
    Ok(writer.finish()?.into_inner())
}

impl ObjectStoreProvider {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            concurrent_fetches: DEFAULT_CONCURRENT_FETCHES,
        }
    }

    pub fn with_concurrent_fetches(mut self, concurrent_fetches: usize) -> Self {
        self.concurrent_fetches = concurrent_fetches.max(1);
        self
    }

    /// Build a provider against an explicit endpoint with static credentials
    /// (MinIO style). Forces path-style addressing.
    pub fn from_config(config: ObjectStoreConfig) -> Result<Self> {
        config.validate()?;
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.access_key,
            config.secret_key,
            None,
            None,
            "storageprovider-client",
        );
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(config.region))
            .endpoint_url(config.endpoint_url)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket,
            concurrent_fetches: config.concurrent_fetches.max(1),
        })
    }

    /// Build a provider from the ambient AWS environment (shared config,
    /// instance roles and friends).
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let shared = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&shared), bucket)
    }

    fn object_path(&self, container_key: &str, object_key: &str) -> String {
        format!("{}{}", pairtree_path(container_key), object_key)
    }

    async fn fetch_path(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(sdk_error)?;
        let data = response.body.collect().await.map_err(body_error)?;
        Ok(data.into_bytes().to_vec())
    }

    async fn stat_path(&self, path: &str) -> Result<ObjectMetadata> {
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(ObjectMetadata {
            mime: head.content_type().unwrap_or(OCTET_STREAM).to_string(),
            size: head.content_length().unwrap_or(0).max(0) as u64,
            time_last_modification: head.last_modified().and_then(|t| {
                chrono::DateTime::from_timestamp(t.secs(), t.subsec_nanos())
            }),
        })
    }

    async fn list_paths(&self, prefix: &str) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(sdk_error)?;
            for object in response.contents() {
                if let Some(key) = object.key() {
                    paths.push(key.to_string());
                }
            }

            continuation_token = response.next_continuation_token().map(|t| t.to_string());
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(paths)
    }

    fn strip_prefix(prefix: &str, path: String) -> String {
        match path.strip_prefix(prefix) {
            Some(key) => key.to_string(),
            None => path,
        }
    }
}

#[async_trait]
impl StorageProvider for ObjectStoreProvider {
    async fn delete_object(
        &self,
        container_key: &str,
        object_key: &str,
        _system_token: Option<&str>,
    ) -> Result<()> {
        let path = self.object_path(container_key, object_key);
        tracing::debug!("delete {}", path);
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&path)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn get_object(
        &self,
        container_key: &str,
        object_key: &str,
        _system_token: Option<&str>,
    ) -> Result<Vec<u8>> {
        let path = self.object_path(container_key, object_key);
        tracing::debug!("get {}", path);
        self.fetch_path(&path).await
    }

    async fn get_object_streaming(
        &self,
        container_key: &str,
        object_key: &str,
        _system_token: Option<&str>,
    ) -> Result<ByteStream> {
        let path = self.object_path(container_key, object_key);
        tracing::debug!("get {} (streaming)", path);
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&path)
            .send()
            .await
            .map_err(sdk_error)?;

        let stream = futures::stream::try_unfold(response.body, |mut body| async move {
            match body.next().await {
                Some(Ok(chunk)) => Ok(Some((chunk, body))),
                Some(Err(err)) => Err(body_error(err)),
                None => Ok(None),
            }
        });
        Ok(rechunk(stream, DEFAULT_CHUNK_SIZE))
    }

    async fn get_object_and_metadata(
        &self,
        container_key: &str,
        object_key: &str,
        _system_token: Option<&str>,
    ) -> Result<ObjectWithMetadata> {
        let path = self.object_path(container_key, object_key);
        let metadata = self.stat_path(&path).await?;
        let content = self.fetch_path(&path).await?;
        Ok(ObjectWithMetadata { content, metadata })
    }

    async fn get_object_metadata(
        &self,
        container_key: &str,
        object_key: &str,
        _system_token: Option<&str>,
    ) -> Result<ObjectMetadata> {
        let path = self.object_path(container_key, object_key);
        self.stat_path(&path).await
    }

    async fn copy_object_and_create_key(
        &self,
        source_container_key: &str,
        source_object_key: &str,
        output_container_key: &str,
        system_token: Option<&str>,
    ) -> Result<String> {
        let output_object_key = Uuid::new_v4().to_string();
        self.copy_object(
            source_container_key,
            source_object_key,
            output_container_key,
            &output_object_key,
            system_token,
        )
        .await?;
        Ok(output_object_key)
    }

    async fn copy_object(
        &self,
        source_container_key: &str,
        source_object_key: &str,
        output_container_key: &str,
        output_object_key: &str,
        _system_token: Option<&str>,
    ) -> Result<()> {
        let source = format!(
            "{}/{}",
            self.bucket,
            self.object_path(source_container_key, source_object_key)
        );
        let destination = self.object_path(output_container_key, output_object_key);
        tracing::debug!("copy {} -> {}", source, destination);
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(source)
            .key(destination)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn update_object_and_key(
        &self,
        container_key: &str,
        object_data: Vec<u8>,
        system_token: Option<&str>,
    ) -> Result<String> {
        let object_key = Uuid::new_v4().to_string();
        self.update_object(container_key, &object_key, object_data, system_token)
            .await?;
        Ok(object_key)
    }

    async fn update_object(
        &self,
        container_key: &str,
        object_key: &str,
        object_data: Vec<u8>,
        _system_token: Option<&str>,
    ) -> Result<()> {
        let path = self.object_path(container_key, object_key);
        tracing::debug!("put {} ({} bytes)", path, object_data.len());
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&path)
            .body(S3Body::from(object_data))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn list_object_keys_for_container(
        &self,
        container_key: &str,
        _system_token: Option<&str>,
    ) -> Result<Vec<String>> {
        let prefix = pairtree_path(container_key);
        let paths = self.list_paths(&prefix).await?;
        Ok(paths
            .into_iter()
            .map(|path| Self::strip_prefix(&prefix, path))
            .collect())
    }

    async fn get_container_data(
        &self,
        container_key: &str,
        _system_token: Option<&str>,
        translations: Option<&HashMap<String, String>>,
    ) -> Result<Vec<u8>> {
        let prefix = pairtree_path(container_key);
        let paths = self.list_paths(&prefix).await?;
        tracing::debug!(
            "exporting {} objects from container {}",
            paths.len(),
            container_key
        );

        let fetched: Vec<(String, Result<Vec<u8>>)> =
            futures::stream::iter(paths.into_iter().map(|path| {
                let key = Self::strip_prefix(&prefix, path.clone());
                async move { (key, self.fetch_path(&path).await) }
            }))
            .buffer_unordered(self.concurrent_fetches)
            .collect()
            .await;

        assemble_container_zip(fetched, translations)
    }

    async fn get_container_data_streaming(
        &self,
        _container_key: &str,
        _system_token: Option<&str>,
        _translations: Option<&HashMap<String, String>>,
    ) -> Result<ByteStream> {
        Err(StorageError::NotImplemented {
            operation: "get_container_data_streaming",
        })
    }

    async fn create_container(
        &self,
        _container_key: &str,
        _system_token: Option<&str>,
    ) -> Result<()> {
        Err(StorageError::NotImplemented {
            operation: "create_container",
        })
    }

    async fn create_container_and_key(&self, _system_token: Option<&str>) -> Result<String> {
        Err(StorageError::NotImplemented {
            operation: "create_container_and_key",
        })
    }

    /// Containers have no first-class representation in the object store, so
    /// deletion enumerates and removes members one by one. Not atomic.
    async fn delete_container(
        &self,
        container_key: &str,
        _system_token: Option<&str>,
    ) -> Result<()> {
        let prefix = pairtree_path(container_key);
        let paths = self.list_paths(&prefix).await?;
        tracing::debug!(
            "deleting {} objects under container {}",
            paths.len(),
            container_key
        );
        for path in paths {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(&path)
                .send()
                .await
                .map_err(sdk_error)?;
        }
        Ok(())
    }

    async fn get_object_from_archive(
        &self,
        _container_key: &str,
        _object_key: &str,
        _file_name: &str,
        _system_token: Option<&str>,
    ) -> Result<Vec<u8>> {
        Err(StorageError::NotImplemented {
            operation: "get_object_from_archive",
        })
    }

    async fn get_object_from_archive_streaming(
        &self,
        _container_key: &str,
        _object_key: &str,
        _file_name: &str,
        _system_token: Option<&str>,
    ) -> Result<ByteStream> {
        Err(StorageError::NotImplemented {
            operation: "get_object_from_archive_streaming",
        })
    }

    async fn replace_file_in_zip_object(
        &self,
        _container_key: &str,
        _object_key: &str,
        _file_to_replace: &str,
        _new_file_content: Vec<u8>,
        _new_file_name: &str,
        _system_token: Option<&str>,
    ) -> Result<serde_json::Value> {
        Err(StorageError::NotImplemented {
            operation: "replace_file_in_zip_object",
        })
    }
}
