// Client library for the Vimeo Simple API.
// Chained namespaces become REST URLs; JSON responses can be cached on disk.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;

pub use api::{
    Args, Body, Endpoint, JsonResponse, QueryValue, RawResponse, Reply, ReqwestTransport, Response,
    Transport, Vimeo, VimeoCache, XmlElement,
};
pub use config::{CacheConfig, Format, RequestConfig};
pub use error::{Result, VimeoError};
