pub mod client;
pub mod config;
pub mod domain;
pub mod providers;
pub mod utils;

pub use client::StorageProviderClient;
pub use config::{ObjectStoreConfig, RemoteStorageConfig, TokenHeader};
pub use domain::model::{ByteStream, ObjectMetadata, ObjectWithMetadata};
pub use domain::ports::StorageProvider;
#[cfg(feature = "s3")]
pub use providers::object_store::ObjectStoreProvider;
pub use providers::remote::RemoteStorageProvider;
pub use utils::error::{Result, StorageError};
