//! Error handling for catalog API operations.

use std::error::Error as _;

use reqwest::StatusCode;
use thiserror::Error;

/// Common error type for catalog API operations.
///
/// Transport failures, unsuccessful status codes and unexpected payloads
/// all end up here, so consumers only ever deal with one error shape.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("could not reach the catalog")]
    Transport(#[source] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),
    #[error("unexpected response from the catalog")]
    InvalidResponse(#[source] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

impl CatalogClientError {
    /// The HTTP status of the failed request, if the catalog answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CatalogClientError::Status(status) => Some(*status),
            CatalogClientError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Render the error and its sources as the single message shown to users.
    pub fn user_message(&self) -> String {
        let mut message = format!("Error fetching data: {self}");
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
