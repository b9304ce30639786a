use core::result::Result as CoreResult;
use std::io::Error as IoError;

use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;
use toml::ser::Error as TomlSerializeError;

use crate::types::Operation;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur in the core library and the collection clients.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// An HTTP request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),

    /// A response body was not the JSON the operation expects.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// TOML serialization failed.
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] TomlSerializeError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The collection resource answered with a non-success status.
    #[error("{operation} failed with HTTP {status}: {body}")]
    Status {
        /// Operation that was issued.
        operation: Operation,
        /// HTTP status code returned by the server.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// A draft field name other than `title` or `content`.
    #[error("Unknown draft field: {0}")]
    UnknownField(String),
}

impl Error {
    /// Whether this error is a failure of a call against the collection resource.
    ///
    /// Network failures, non-2xx statuses and malformed response bodies all
    /// count; local configuration and input errors do not.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Request(_) | Self::Json(_) | Self::Status { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, from_str};
    use std::io;

    #[test]
    fn test_error_display() {
        let error1 = Error::Config("invalid base url".to_owned());
        assert_eq!(error1.to_string(), "Configuration error: invalid base url");

        let error2 = Error::Status {
            operation: Operation::Delete,
            status: 404,
            body: "not found".to_owned(),
        };
        assert_eq!(error2.to_string(), "delete failed with HTTP 404: not found");

        let error3 = Error::UnknownField("author".to_owned());
        assert_eq!(error3.to_string(), "Unknown draft field: author");
    }

    #[test]
    fn test_error_is_remote() {
        let status = Error::Status {
            operation: Operation::List,
            status: 500,
            body: String::new(),
        };
        assert!(status.is_remote());

        let json_error = from_str::<JsonValue>("not json").unwrap_err();
        assert!(Error::from(json_error).is_remote());

        assert!(!Error::Config("bad config".to_owned()).is_remote());
        assert!(!Error::UnknownField("tags".to_owned()).is_remote());
    }

    #[test]
    fn test_error_from_io() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
        assert!(!error.is_remote());
    }
}
