//! Error types for the gallery.
//!
//! Every fallible operation in the crate returns [`GalleryError`]. Callers
//! decide the policy: index refresh failures propagate, search failures turn
//! into a notice, enrichment failures are only logged.

use thiserror::Error;

use crate::state::data::TagId;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GalleryError>;

/// Errors that can occur while talking to the document store or rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GalleryError {
    /// The store answered with something other than 200
    #[error("Request to {url} failed with status {status}")]
    Network { url: String, status: u16 },
    /// The request never produced a response (DNS, TLS, timeout...)
    #[error("Transport error: {0}")]
    Transport(String),
    /// Malformed JSON or image bytes
    #[error("Failed to parse response: {0}")]
    Parse(String),
    /// Tag id absent from the tag table
    #[error("Unknown tag id {0}")]
    CacheMiss(TagId),
    /// A cache read happened before `ensure_populated` succeeded
    #[error("Document index has not been loaded yet")]
    NotPopulated,
    /// Result belongs to a search that has since been superseded
    #[error("Superseded by a newer search")]
    Cancelled,
    /// Missing or invalid settings
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for GalleryError {
    fn from(err: serde_json::Error) -> Self {
        GalleryError::Parse(err.to_string())
    }
}

impl From<image::ImageError> for GalleryError {
    fn from(err: image::ImageError) -> Self {
        GalleryError::Parse(format!("thumbnail: {}", err))
    }
}

impl From<url::ParseError> for GalleryError {
    fn from(err: url::ParseError) -> Self {
        GalleryError::Config(format!("invalid base url: {}", err))
    }
}
