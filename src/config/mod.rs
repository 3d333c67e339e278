use std::env;

use crate::utils::error::{Result, StorageError};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};

/// How a call-scoped system token is attached to outgoing requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenHeader {
    /// `Authorization: Bearer {token}`.
    #[default]
    Bearer,
    /// The token verbatim under a custom header name, for services carrying
    /// a session id instead of a bearer credential.
    Custom(String),
}

impl TokenHeader {
    pub fn header(&self, token: &str) -> (String, String) {
        match self {
            TokenHeader::Bearer => ("Authorization".to_string(), format!("Bearer {}", token)),
            TokenHeader::Custom(name) => (name.clone(), token.to_string()),
        }
    }
}

/// Configuration of the remote HTTP provider.
#[derive(Debug, Clone)]
pub struct RemoteStorageConfig {
    pub base_url: String,
    pub collection: String,
    /// Optional prefix joined to container keys as `{prefix}:{key}`.
    pub container_prefix: Option<String>,
    pub token_header: TokenHeader,
}

impl RemoteStorageConfig {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            collection: collection.into(),
            container_prefix: None,
            token_header: TokenHeader::Bearer,
        }
    }

    pub fn with_container_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.container_prefix = Some(prefix.into());
        self
    }

    pub fn with_token_header(mut self, token_header: TokenHeader) -> Self {
        self.token_header = token_header;
        self
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: env::var("STORAGE_BASE_URL").map_err(|_| StorageError::MissingConfig {
                field: "STORAGE_BASE_URL".to_string(),
            })?,
            collection: env::var("STORAGE_COLLECTION").map_err(|_| {
                StorageError::MissingConfig {
                    field: "STORAGE_COLLECTION".to_string(),
                }
            })?,
            container_prefix: env::var("STORAGE_CONTAINER_PREFIX").ok(),
            token_header: match env::var("STORAGE_TOKEN_HEADER") {
                Ok(name) => TokenHeader::Custom(name),
                Err(_) => TokenHeader::Bearer,
            },
        })
    }
}

impl Validate for RemoteStorageConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_non_empty_string("collection", &self.collection)?;
        if let Some(prefix) = &self.container_prefix {
            validate_non_empty_string("container_prefix", prefix)?;
        }
        if let TokenHeader::Custom(name) = &self.token_header {
            validate_non_empty_string("token_header", name)?;
        }
        Ok(())
    }
}

/// Configuration of the S3-compatible object-storage provider.
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub endpoint_url: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket: String,
    /// Upper bound on parallel object fetches during container zip export.
    pub concurrent_fetches: usize,
}

impl ObjectStoreConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint_url: env::var("OBJECT_STORE_ENDPOINT").map_err(|_| {
                StorageError::MissingConfig {
                    field: "OBJECT_STORE_ENDPOINT".to_string(),
                }
            })?,
            access_key: env::var("OBJECT_STORE_ACCESS_KEY").map_err(|_| {
                StorageError::MissingConfig {
                    field: "OBJECT_STORE_ACCESS_KEY".to_string(),
                }
            })?,
            secret_key: env::var("OBJECT_STORE_SECRET_KEY").map_err(|_| {
                StorageError::MissingConfig {
                    field: "OBJECT_STORE_SECRET_KEY".to_string(),
                }
            })?,
            region: env::var("OBJECT_STORE_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket: env::var("OBJECT_STORE_BUCKET").map_err(|_| StorageError::MissingConfig {
                field: "OBJECT_STORE_BUCKET".to_string(),
            })?,
            concurrent_fetches: match env::var("OBJECT_STORE_CONCURRENT_FETCHES") {
                Ok(value) => value.parse().map_err(|_| StorageError::InvalidConfigValue {
                    field: "OBJECT_STORE_CONCURRENT_FETCHES".to_string(),
                    value: value.clone(),
                    reason: "Value must be a positive integer".to_string(),
                })?,
                Err(_) => 8,
            },
        })
    }
}

impl Validate for ObjectStoreConfig {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint_url", &self.endpoint_url)?;
        validate_non_empty_string("access_key", &self.access_key)?;
        validate_non_empty_string("secret_key", &self.secret_key)?;
        validate_non_empty_string("region", &self.region)?;
        validate_non_empty_string("bucket", &self.bucket)?;
        validate_positive_number("concurrent_fetches", self.concurrent_fetches, 1)?;
        Ok(())
    }
}
