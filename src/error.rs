//! Error types for the content client

use thiserror::Error;

/// Result type for content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that cross the library boundary.
///
/// Parsing and validation never produce these: unknown tags fall back to the
/// base model and failed rules are recorded on the field. Only the transport
/// and the ambient layers (config, IO) report errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Request to {url} failed with status {status}: {message}")]
    Transport {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl Error {
    /// Build a transport error for a failed request
    pub fn transport(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Error::Transport {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// HTTP-like status carried by transport errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_message_embeds_url_and_status() {
        let err = Error::transport("/api/pages/blog", 404, "not found");
        let msg = err.to_string();
        assert!(msg.contains("/api/pages/blog"));
        assert!(msg.contains("404"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_json_error_has_no_status() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(json_err);
        assert_eq!(err.status(), None);
    }
}
