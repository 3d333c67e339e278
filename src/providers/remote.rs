use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::{RemoteStorageConfig, TokenHeader};
use crate::domain::model::{ByteStream, ObjectMetadata, ObjectWithMetadata};
use crate::domain::ports::StorageProvider;
use crate::utils::error::{Result, StorageError};
use crate::utils::stream::{rechunk, DEFAULT_CHUNK_SIZE};
use crate::utils::validation::Validate;

const OCTET_STREAM: &str = "application/octet-stream";

/// Storage provider backed by the remote HTTP service.
///
/// Requests go to
/// `{base}/collections/{collection}/containers[/{container}[/{object}[/{entry}]]]`.
pub struct RemoteStorageProvider {
    client: Client,
    base_url: String,
    collection: String,
    container_prefix: Option<String>,
    token_header: TokenHeader,
}

#[derive(Serialize)]
struct CopyRequest<'a> {
    host_url: &'a str,
    collection_key: &'a str,
    container_key: &'a str,
    object_key: &'a str,
}

#[derive(Deserialize)]
struct ObjectKeyResponse {
    object_key: String,
}

#[derive(Deserialize)]
struct ContainerKeyResponse {
    container_key: String,
}

impl RemoteStorageProvider {
    pub fn new(config: RemoteStorageConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            collection: config.collection,
            container_prefix: config.container_prefix,
            token_header: config.token_header,
        })
    }

    fn prefixed_container(&self, container_key: &str) -> String {
        match &self.container_prefix {
            Some(prefix) => format!("{}:{}", prefix, container_key),
            None => container_key.to_string(),
        }
    }

    fn containers_url(&self) -> String {
        format!(
            "{}/collections/{}/containers",
            self.base_url, self.collection
        )
    }

    fn container_url(&self, container_key: &str) -> String {
        format!(
            "{}/{}",
            self.containers_url(),
            self.prefixed_container(container_key)
        )
    }

    fn object_url(&self, container_key: &str, object_key: &str) -> String {
        format!("{}/{}", self.container_url(container_key), object_key)
    }

    fn entry_url(&self, container_key: &str, object_key: &str, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.object_url(container_key, object_key),
            file_name
        )
    }

    fn with_token(&self, request: RequestBuilder, system_token: Option<&str>) -> RequestBuilder {
        match system_token {
            Some(token) => {
                let (name, value) = self.token_header.header(token);
                request.header(name, value)
            }
            None => request,
        }
    }

    async fn expect_status(response: Response, expected: StatusCode) -> Result<Response> {
        if response.status() != expected {
            let status_code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(
                "unexpected response status {} (expected {})",
                status_code,
                expected.as_u16()
            );
            return Err(StorageError::OperationFailed {
                status_code,
                message,
            });
        }
        Ok(response)
    }

    fn body_stream(response: Response) -> ByteStream {
        let stream = response.bytes_stream().map_err(StorageError::from);
        rechunk(stream, DEFAULT_CHUNK_SIZE)
    }

    fn metadata_from_headers(headers: &HeaderMap) -> ObjectMetadata {
        let mime = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(OCTET_STREAM)
            .to_string();
        let size = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let time_last_modification = headers
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
            .map(|t| t.with_timezone(&Utc));
        ObjectMetadata {
            mime,
            size,
            time_last_modification,
        }
    }

    fn copy_request<'a>(
        &'a self,
        source_container_key: &'a str,
        source_object_key: &'a str,
    ) -> CopyRequest<'a> {
        CopyRequest {
            host_url: &self.base_url,
            collection_key: &self.collection,
            container_key: source_container_key,
            object_key: source_object_key,
        }
    }
}

#[async_trait]
impl StorageProvider for RemoteStorageProvider {
    async fn delete_object(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<()> {
        let url = self.object_url(container_key, object_key);
        tracing::debug!("DELETE {}", url);
        let request = self.with_token(self.client.delete(&url), system_token);
        Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(())
    }

    async fn get_object(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<Vec<u8>> {
        let url = self.object_url(container_key, object_key);
        tracing::debug!("GET {}", url);
        let request = self.with_token(self.client.get(&url), system_token);
        let response = Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_object_streaming(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<ByteStream> {
        let url = self.object_url(container_key, object_key);
        tracing::debug!("GET {} (streaming)", url);
        let request = self.with_token(self.client.get(&url), system_token);
        let response = Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(Self::body_stream(response))
    }

    async fn get_object_and_metadata(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<ObjectWithMetadata> {
        let url = self.object_url(container_key, object_key);
        tracing::debug!("GET {}", url);
        let request = self.with_token(self.client.get(&url), system_token);
        let response = Self::expect_status(request.send().await?, StatusCode::OK).await?;
        let metadata = Self::metadata_from_headers(response.headers());
        let content = response.bytes().await?.to_vec();
        Ok(ObjectWithMetadata { content, metadata })
    }

    async fn get_object_metadata(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<ObjectMetadata> {
        let url = format!("{}/meta", self.object_url(container_key, object_key));
        tracing::debug!("GET {}", url);
        let request = self.with_token(self.client.get(&url), system_token);
        let response = Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(response.json().await?)
    }

    async fn copy_object_and_create_key(
        &self,
        source_container_key: &str,
        source_object_key: &str,
        output_container_key: &str,
        system_token: Option<&str>,
    ) -> Result<String> {
        let url = self.container_url(output_container_key);
        let source_container = self.prefixed_container(source_container_key);
        tracing::debug!("POST {} (copy)", url);
        let request = self
            .with_token(self.client.post(&url), system_token)
            .json(&self.copy_request(&source_container, source_object_key));
        let response = Self::expect_status(request.send().await?, StatusCode::CREATED).await?;
        let body: ObjectKeyResponse = response.json().await?;
        Ok(body.object_key)
    }

    async fn copy_object(
        &self,
        source_container_key: &str,
        source_object_key: &str,
        output_container_key: &str,
        output_object_key: &str,
        system_token: Option<&str>,
    ) -> Result<()> {
        let url = self.object_url(output_container_key, output_object_key);
        let source_container = self.prefixed_container(source_container_key);
        tracing::debug!("PUT {} (copy)", url);
        let request = self
            .with_token(self.client.put(&url), system_token)
            .json(&self.copy_request(&source_container, source_object_key));
        Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(())
    }

    async fn update_object_and_key(
        &self,
        container_key: &str,
        object_data: Vec<u8>,
        system_token: Option<&str>,
    ) -> Result<String> {
        let url = self.container_url(container_key);
        tracing::debug!("POST {} ({} bytes)", url, object_data.len());
        let request = self
            .with_token(self.client.post(&url), system_token)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(object_data);
        let response = Self::expect_status(request.send().await?, StatusCode::CREATED).await?;
        let body: ObjectKeyResponse = response.json().await?;
        Ok(body.object_key)
    }

    async fn update_object(
        &self,
        container_key: &str,
        object_key: &str,
        object_data: Vec<u8>,
        system_token: Option<&str>,
    ) -> Result<()> {
        let url = self.object_url(container_key, object_key);
        tracing::debug!("PUT {} ({} bytes)", url, object_data.len());
        let request = self
            .with_token(self.client.put(&url), system_token)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(object_data);
        Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(())
    }

    async fn list_object_keys_for_container(
        &self,
        container_key: &str,
        system_token: Option<&str>,
    ) -> Result<Vec<String>> {
        let url = self.container_url(container_key);
        tracing::debug!("GET {} (list)", url);
        let request = self
            .with_token(self.client.get(&url), system_token)
            .header(ACCEPT, "application/json");
        let response = Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(response.json().await?)
    }

    async fn get_container_data(
        &self,
        container_key: &str,
        system_token: Option<&str>,
        translations: Option<&HashMap<String, String>>,
    ) -> Result<Vec<u8>> {
        let url = self.container_url(container_key);
        tracing::debug!("GET {} (zip)", url);
        let mut request = self
            .with_token(self.client.get(&url), system_token)
            .header(ACCEPT, "application/zip");
        if let Some(translations) = translations {
            request = request.query(translations);
        }
        let response = Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_container_data_streaming(
        &self,
        container_key: &str,
        system_token: Option<&str>,
        translations: Option<&HashMap<String, String>>,
    ) -> Result<ByteStream> {
        let url = self.container_url(container_key);
        tracing::debug!("GET {} (zip, streaming)", url);
        let mut request = self
            .with_token(self.client.get(&url), system_token)
            .header(ACCEPT, "application/zip");
        if let Some(translations) = translations {
            request = request.query(translations);
        }
        let response = Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(Self::body_stream(response))
    }

    async fn create_container(
        &self,
        container_key: &str,
        system_token: Option<&str>,
    ) -> Result<()> {
        let url = self.container_url(container_key);
        tracing::debug!("PUT {}", url);
        let request = self.with_token(self.client.put(&url), system_token);
        Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(())
    }

    async fn create_container_and_key(&self, system_token: Option<&str>) -> Result<String> {
        let url = self.containers_url();
        tracing::debug!("POST {}", url);
        let request = self.with_token(self.client.post(&url), system_token);
        let response = Self::expect_status(request.send().await?, StatusCode::CREATED).await?;
        let body: ContainerKeyResponse = response.json().await?;
        Ok(body.container_key)
    }

    async fn delete_container(
        &self,
        container_key: &str,
        system_token: Option<&str>,
    ) -> Result<()> {
        let url = self.container_url(container_key);
        tracing::debug!("DELETE {}", url);
        let request = self.with_token(self.client.delete(&url), system_token);
        Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(())
    }

    async fn get_object_from_archive(
        &self,
        container_key: &str,
        object_key: &str,
        file_name: &str,
        system_token: Option<&str>,
    ) -> Result<Vec<u8>> {
        let url = self.entry_url(container_key, object_key, file_name);
        tracing::debug!("GET {}", url);
        let request = self.with_token(self.client.get(&url), system_token);
        let response = Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_object_from_archive_streaming(
        &self,
        container_key: &str,
        object_key: &str,
        file_name: &str,
        system_token: Option<&str>,
    ) -> Result<ByteStream> {
        let url = self.entry_url(container_key, object_key, file_name);
        tracing::debug!("GET {} (streaming)", url);
        let request = self.with_token(self.client.get(&url), system_token);
        let response = Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(Self::body_stream(response))
    }

    async fn replace_file_in_zip_object(
        &self,
        container_key: &str,
        object_key: &str,
        file_to_replace: &str,
        new_file_content: Vec<u8>,
        new_file_name: &str,
        system_token: Option<&str>,
    ) -> Result<serde_json::Value> {
        let url = self.entry_url(container_key, object_key, file_to_replace);
        tracing::debug!("PUT {} (replace archive entry)", url);
        let request = self
            .with_token(self.client.put(&url), system_token)
            .query(&[("new_file_name", new_file_name)])
            .body(new_file_content);
        let response = Self::expect_status(request.send().await?, StatusCode::OK).await?;
        Ok(response.json().await?)
    }
}
