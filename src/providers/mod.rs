#[cfg(feature = "s3")]
pub mod object_store;
pub mod pairtree;
pub mod remote;
