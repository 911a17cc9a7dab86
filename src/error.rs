// Error types for the Vimeo client.
// Covers configuration, transport, parsing and cache filesystem errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VimeoError {
    #[error("No HTTP transport configured for live requests")]
    MissingTransport,

    #[error("Cache directory {path:?} {reason}")]
    CacheDir { path: PathBuf, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("XML document has no root element")]
    EmptyXml,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VimeoError {
    /// Whether this error comes from bad configuration rather than a request.
    pub fn is_config(&self) -> bool {
        matches!(self, VimeoError::MissingTransport | VimeoError::CacheDir { .. })
    }
}

pub type Result<T> = std::result::Result<T, VimeoError>;
