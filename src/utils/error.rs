use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The provider answered with an unexpected status or result.
    #[error("{message}, http status code: {status_code}")]
    OperationFailed { status_code: u16, message: String },

    /// The selected provider has no implementation for this operation.
    #[error("{operation} is not implemented for this provider")]
    NotImplemented { operation: &'static str },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_failed_display() {
        let err = StorageError::OperationFailed {
            status_code: 400,
            message: "response has invalid state".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "response has invalid state, http status code: 400"
        );
    }

    #[test]
    fn test_not_implemented_display() {
        let err = StorageError::NotImplemented {
            operation: "create_container",
        };
        assert_eq!(
            err.to_string(),
            "create_container is not implemented for this provider"
        );
    }
}
