// Vimeo Simple API module.
// Endpoint building, transports and the plain and caching clients.

pub mod cached;
pub mod client;
pub mod path;
pub mod transport;
pub mod xml;

pub use cached::{JsonResponse, VimeoCache};
pub use client::{Body, Reply, Response, Vimeo};
pub use path::{Args, Endpoint, QueryValue};
pub use transport::{RawResponse, ReqwestTransport, Transport};
pub use xml::XmlElement;
