// HTTP transport used for live requests.
// Wraps a blocking reqwest client behind a small trait so it can be swapped.

use std::fmt::Write;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT as USER_AGENT_HEADER;

use crate::error::Result;

/// Name of the software, sent in the user agent.
pub const NAME: &str = "api-vimeo";

/// Version of the software, sent in the user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build identifier, sent in the user agent.
pub const BUILD: &str = match option_env!("VIMEO_SIMPLE_BUILD") {
    Some(build) => build,
    None => "0",
};

/// Where to learn more about the software.
pub const PROJECT_URL: &str = "http://github.com/jaywilliams/vimeo/";

/// Default request timeout for the reqwest transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent string identifying this client.
pub fn user_agent() -> String {
    format!(
        "{}/{} (Vimeo Toolkit; {}) Build/{}",
        NAME, VERSION, PROJECT_URL, BUILD
    )
}

/// Raw result of an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Status line and headers as text, one per line.
    pub header: String,
    pub body: String,
}

impl RawResponse {
    /// Whether the status code starts with 2.
    pub fn is_success(&self) -> bool {
        self.status.to_string().starts_with('2')
    }
}

/// Performs GET requests for the clients.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, user_agent: &str) -> Result<RawResponse>;
}

/// Default transport backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    #[tracing::instrument(level = "trace", skip(self, user_agent))]
    fn get(&self, url: &str, user_agent: &str) -> Result<RawResponse> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT_HEADER, user_agent)
            .send()?;

        let status = response.status();

        let mut header = format!("{:?} {}\r\n", response.version(), status);
        for (name, value) in response.headers() {
            let _ = write!(
                header,
                "{}: {}\r\n",
                name,
                String::from_utf8_lossy(value.as_bytes())
            );
        }

        let body = response.text()?;

        tracing::trace!("Received {} ({} bytes)", status, body.len());

        Ok(RawResponse {
            status: status.as_u16(),
            header,
            body,
        })
    }
}
