use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::model::{ByteStream, ObjectMetadata, ObjectWithMetadata};
use crate::utils::error::Result;

/// Capability contract implemented by every storage backend.
///
/// Each operation is a single request-response exchange against the provider;
/// no retries, no caching, no state kept between calls. The optional
/// `system_token` is forwarded per call and never stored.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Delete an object from a container.
    async fn delete_object(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<()>;

    /// Retrieve the full content of an object.
    async fn get_object(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<Vec<u8>>;

    /// Retrieve the content of an object as a chunked stream.
    async fn get_object_streaming(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<ByteStream>;

    /// Retrieve the content of an object together with its metadata.
    async fn get_object_and_metadata(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<ObjectWithMetadata>;

    /// Retrieve only the metadata of an object.
    async fn get_object_metadata(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<ObjectMetadata>;

    /// Copy an object into `output_container_key` under a generated key,
    /// returning that key.
    async fn copy_object_and_create_key(
        &self,
        source_container_key: &str,
        source_object_key: &str,
        output_container_key: &str,
        system_token: Option<&str>,
    ) -> Result<String>;

    /// Copy an object to a specific destination key.
    async fn copy_object(
        &self,
        source_container_key: &str,
        source_object_key: &str,
        output_container_key: &str,
        output_object_key: &str,
        system_token: Option<&str>,
    ) -> Result<()>;

    /// Store an object under a generated key, returning that key.
    async fn update_object_and_key(
        &self,
        container_key: &str,
        object_data: Vec<u8>,
        system_token: Option<&str>,
    ) -> Result<String>;

    /// Create or overwrite an object under a specific key.
    async fn update_object(
        &self,
        container_key: &str,
        object_key: &str,
        object_data: Vec<u8>,
        system_token: Option<&str>,
    ) -> Result<()>;

    /// List all object keys present in a container.
    async fn list_object_keys_for_container(
        &self,
        container_key: &str,
        system_token: Option<&str>,
    ) -> Result<Vec<String>>;

    /// Retrieve a zip of all objects in a container. `translations` maps
    /// object keys to the file names used inside the archive.
    async fn get_container_data(
        &self,
        container_key: &str,
        system_token: Option<&str>,
        translations: Option<&HashMap<String, String>>,
    ) -> Result<Vec<u8>>;

    /// Streaming variant of [`get_container_data`](Self::get_container_data).
    async fn get_container_data_streaming(
        &self,
        container_key: &str,
        system_token: Option<&str>,
        translations: Option<&HashMap<String, String>>,
    ) -> Result<ByteStream>;

    /// Create a container with a caller-supplied key.
    async fn create_container(
        &self,
        container_key: &str,
        system_token: Option<&str>,
    ) -> Result<()>;

    /// Create a container with a server-generated key, returning that key.
    async fn create_container_and_key(&self, system_token: Option<&str>) -> Result<String>;

    /// Delete a container. Whether members are removed atomically is
    /// provider-defined.
    async fn delete_container(
        &self,
        container_key: &str,
        system_token: Option<&str>,
    ) -> Result<()>;

    /// Retrieve a single named entry from an object that is a zip archive.
    async fn get_object_from_archive(
        &self,
        container_key: &str,
        object_key: &str,
        file_name: &str,
        system_token: Option<&str>,
    ) -> Result<Vec<u8>>;

    /// Streaming variant of
    /// [`get_object_from_archive`](Self::get_object_from_archive).
    async fn get_object_from_archive_streaming(
        &self,
        container_key: &str,
        object_key: &str,
        file_name: &str,
        system_token: Option<&str>,
    ) -> Result<ByteStream>;

    /// Replace a named entry inside a zip object, returning the provider's
    /// descriptor of the updated archive.
    async fn replace_file_in_zip_object(
        &self,
        container_key: &str,
        object_key: &str,
        file_to_replace: &str,
        new_file_content: Vec<u8>,
        new_file_name: &str,
        system_token: Option<&str>,
    ) -> Result<serde_json::Value>;
}
