use std::collections::HashMap;

use crate::domain::model::{ByteStream, ObjectMetadata, ObjectWithMetadata};
use crate::domain::ports::StorageProvider;
use crate::utils::error::Result;

/// Thin façade over an injected [`StorageProvider`].
///
/// Every call is forwarded verbatim; the client adds no retry, caching or
/// credential state. Its only purpose is to decouple callers from the
/// concrete provider type.
pub struct StorageProviderClient<P: StorageProvider> {
    provider: P,
}

impl<P: StorageProvider> StorageProviderClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn delete_object(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<()> {
        self.provider
            .delete_object(container_key, object_key, system_token)
            .await
    }

    pub async fn get_object(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<Vec<u8>> {
        self.provider
            .get_object(container_key, object_key, system_token)
            .await
    }

    pub async fn get_object_streaming(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<ByteStream> {
        self.provider
            .get_object_streaming(container_key, object_key, system_token)
            .await
    }

    pub async fn get_object_and_metadata(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<ObjectWithMetadata> {
        self.provider
            .get_object_and_metadata(container_key, object_key, system_token)
            .await
    }

    pub async fn get_object_metadata(
        &self,
        container_key: &str,
        object_key: &str,
        system_token: Option<&str>,
    ) -> Result<ObjectMetadata> {
        self.provider
            .get_object_metadata(container_key, object_key, system_token)
            .await
    }

    pub async fn copy_object_and_create_key(
        &self,
        source_container_key: &str,
        source_object_key: &str,
        output_container_key: &str,
        system_token: Option<&str>,
    ) -> Result<String> {
        self.provider
            .copy_object_and_create_key(
                source_container_key,
                source_object_key,
                output_container_key,
                system_token,
            )
            .await
    }

    pub async fn copy_object(
        &self,
        source_container_key: &str,
        source_object_key: &str,
        output_container_key: &str,
        output_object_key: &str,
        system_token: Option<&str>,
    ) -> Result<()> {
        self.provider
            .copy_object(
                source_container_key,
                source_object_key,
                output_container_key,
                output_object_key,
                system_token,
            )
            .await
    }

    pub async fn update_object_and_key(
        &self,
        container_key: &str,
        object_data: Vec<u8>,
        system_token: Option<&str>,
    ) -> Result<String> {
        self.provider
            .update_object_and_key(container_key, object_data, system_token)
            .await
    }

    pub async fn update_object(
        &self,
        container_key: &str,
        object_key: &str,
        object_data: Vec<u8>,
        system_token: Option<&str>,
    ) -> Result<()> {
        self.provider
            .update_object(container_key, object_key, object_data, system_token)
            .await
    }

    pub async fn list_object_keys_for_container(
        &self,
        container_key: &str,
        system_token: Option<&str>,
    ) -> Result<Vec<String>> {
        self.provider
            .list_object_keys_for_container(container_key, system_token)
            .await
    }

    pub async fn get_container_data(
        &self,
        container_key: &str,
        system_token: Option<&str>,
        translations: Option<&HashMap<String, String>>,
    ) -> Result<Vec<u8>> {
        self.provider
            .get_container_data(container_key, system_token, translations)
            .await
    }

    pub async fn get_container_data_streaming(
        &self,
        container_key: &str,
        system_token: Option<&str>,
        translations: Option<&HashMap<String, String>>,
    ) -> Result<ByteStream> {
        self.provider
            .get_container_data_streaming(container_key, system_token, translations)
            .await
    }

    pub async fn create_container(
        &self,
        container_key: &str,
        system_token: Option<&str>,
    ) -> Result<()> {
        self.provider
            .create_container(container_key, system_token)
            .await
    }

    pub async fn create_container_and_key(&self, system_token: Option<&str>) -> Result<String> {
        self.provider.create_container_and_key(system_token).await
    }

    pub async fn delete_container(
        &self,
        container_key: &str,
        system_token: Option<&str>,
    ) -> Result<()> {
        self.provider
            .delete_container(container_key, system_token)
            .await
    }

    pub async fn get_object_from_archive(
        &self,
        container_key: &str,
        object_key: &str,
        file_name: &str,
        system_token: Option<&str>,
    ) -> Result<Vec<u8>> {
        self.provider
            .get_object_from_archive(container_key, object_key, file_name, system_token)
            .await
    }

    pub async fn get_object_from_archive_streaming(
        &self,
        container_key: &str,
        object_key: &str,
        file_name: &str,
        system_token: Option<&str>,
    ) -> Result<ByteStream> {
        self.provider
            .get_object_from_archive_streaming(container_key, object_key, file_name, system_token)
            .await
    }

    pub async fn replace_file_in_zip_object(
        &self,
        container_key: &str,
        object_key: &str,
        file_to_replace: &str,
        new_file_content: Vec<u8>,
        new_file_name: &str,
        system_token: Option<&str>,
    ) -> Result<serde_json::Value> {
        self.provider
            .replace_file_in_zip_object(
                container_key,
                object_key,
                file_to_replace,
                new_file_content,
                new_file_name,
                system_token,
            )
            .await
    }
}
