// Vimeo Simple API client.
// Builds endpoint URLs from chained namespaces and parses XML or JSON responses.

use std::sync::Arc;

use serde_json::Value;

use crate::config::{Format, RequestConfig};
use crate::error::{Result, VimeoError};

use super::path::{Args, Endpoint};
use super::transport::{RawResponse, ReqwestTransport, user_agent};
use super::xml::XmlElement;

/// What a call produced: the URL in test mode, otherwise a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Url(String),
    Response(T),
}

impl<T> Reply<T> {
    pub fn url(&self) -> Option<&str> {
        match self {
            Reply::Url(url) => Some(url),
            Reply::Response(_) => None,
        }
    }

    pub fn response(&self) -> Option<&T> {
        match self {
            Reply::Url(_) => None,
            Reply::Response(response) => Some(response),
        }
    }

    pub fn into_response(self) -> Option<T> {
        match self {
            Reply::Url(_) => None,
            Reply::Response(response) => Some(response),
        }
    }
}

/// Parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Xml(XmlElement),
    Json(Value),
}

impl Body {
    pub fn parse(format: Format, data: &str) -> Result<Self> {
        match format {
            Format::Xml => Ok(Body::Xml(XmlElement::parse(data)?)),
            Format::Json => Ok(Body::Json(serde_json::from_str(data)?)),
        }
    }
}

/// Response from a live request. Non-2xx statuses are returned, not raised.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub header: String,
    pub body: Body,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status.to_string().starts_with('2')
    }
}

/// Send a GET through the configured transport.
pub(crate) fn fetch(config: &RequestConfig, url: &str) -> Result<RawResponse> {
    let transport = config
        .transport
        .as_ref()
        .ok_or(VimeoError::MissingTransport)?;

    tracing::debug!("Requesting {}", url);

    transport.get(url, &user_agent())
}

/// Client for the Vimeo Simple API.
///
/// Each [`namespace`](Vimeo::namespace) call returns a new client one level
/// deeper, so a base client can be reused for many independent calls:
///
/// ```no_run
/// use vimeo_simple::{Args, Vimeo};
///
/// let vimeo = Vimeo::new()?;
/// let reply = vimeo.namespace("videos").call("search", &Args::new().arg("query", "cats"))?;
/// # Ok::<(), vimeo_simple::VimeoError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Vimeo {
    endpoint: Endpoint,
    config: RequestConfig,
}

impl Vimeo {
    /// Create a client using the default reqwest transport.
    pub fn new() -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_config(
            RequestConfig::new().with_transport(Arc::new(transport)),
        ))
    }

    pub fn with_config(config: RequestConfig) -> Self {
        Self {
            endpoint: Endpoint::root(),
            config,
        }
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config.api_version = api_version.into();
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.hostname = hostname.into();
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.config.format = format;
        self
    }

    /// Return request URLs instead of requesting them.
    pub fn test_mode(mut self, enabled: bool) -> Self {
        self.config.test_mode = enabled;
        self
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Descend into a namespace, e.g. `videos` or `album`.
    pub fn namespace(&self, name: &str) -> Self {
        Self {
            endpoint: self.endpoint.join(name),
            config: self.config.clone(),
        }
    }

    /// URL a call to `method` would request.
    pub fn url(&self, method: &str, args: &Args) -> String {
        self.endpoint.url(&self.config, method, args)
    }

    /// Call an API method under the current namespace.
    pub fn call(&self, method: &str, args: &Args) -> Result<Reply<Response>> {
        self.request(&self.url(method, args))
    }

    /// Request a fully formed URL and parse the response.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn request(&self, url: &str) -> Result<Reply<Response>> {
        if self.config.test_mode {
            return Ok(Reply::Url(url.to_string()));
        }

        let raw = fetch(&self.config, url)?;
        let body = Body::parse(self.config.format, &raw.body)?;

        Ok(Reply::Response(Response {
            status: raw.status,
            header: raw.header,
            body,
        }))
    }
}
