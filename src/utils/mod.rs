pub mod error;
pub mod logger;
pub mod stream;
pub mod validation;
