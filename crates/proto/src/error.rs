use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value and reason.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Filesystem read/write error.
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(String),
}

/// Local storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backing file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be decoded or encoded.
    #[error("Corrupt storage file {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// No storage location could be resolved (e.g. no home directory).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Inference proxy errors
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Connection-level failure (DNS, refused, reset, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Proxy answered with a non-2xx status.
    #[error("Inference API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// Response body was not valid JSON.
    #[error("Invalid response from inference API: {0}")]
    InvalidResponse(String),
}

/// Chat session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Requested chat session does not exist.
    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    /// Requested model id is not part of the catalog.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Model exists but belongs to another category.
    #[error("Model {model} is not a {category} model")]
    ModelCategoryMismatch { model: String, category: String },
}

/// Account and testimonials API errors
#[derive(Debug, Error)]
pub enum PortalError {
    /// Server rejected the request with a user-facing message.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Bearer token missing, invalid or expired.
    #[error("Session expired. Please login again.")]
    Unauthorized,

    /// Connection-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),
}

/// Internal proto errors
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Invalid role string value.
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Invalid model category string value.
    #[error("Invalid model category: {0}")]
    InvalidCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_config_error_variant() {
        let err = ConfigError::InvalidValue {
            field: "chat.temperature".to_string(),
            reason: "must be between 0 and 2".to_string(),
        };
        assert!(err.to_string().contains("chat.temperature"));
    }

    #[test]
    fn inference_status_error_carries_code_and_body() {
        let err = InferenceError::Status {
            status: 503,
            body: "busy".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("503"));
        assert!(rendered.contains("busy"));
    }

    #[test]
    fn portal_api_error_displays_server_message_only() {
        let err = PortalError::Api {
            status: 400,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[test]
    fn storage_and_config_errors_convert_from_io() {
        let io = || std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let storage: StorageError = io().into();
        assert!(storage.to_string().contains("denied"));
        let config: ConfigError = io().into();
        assert!(config.to_string().starts_with("IO error reading config"));
    }
}
