// Request and cache configuration values.
// Each builder snapshot owns its own copy; nothing here is shared mutably.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::api::transport::Transport;
use crate::cache::store;
use crate::error::Result;

/// Hostname used when no alternate hostname is configured.
pub const DEFAULT_HOSTNAME: &str = "vimeo.com";

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v2";

/// Default cache TTL: one hour.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "./cache/";

/// Response format requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Xml,
    Json,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Settings carried through every namespace snapshot.
#[derive(Clone)]
pub struct RequestConfig {
    pub api_version: String,
    pub hostname: String,
    pub format: Format,
    /// When set, calls return the computed URL instead of requesting it.
    pub test_mode: bool,
    pub(crate) transport: Option<Arc<dyn Transport>>,
}

impl RequestConfig {
    /// Configuration with default settings and no transport attached.
    pub fn new() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            hostname: DEFAULT_HOSTNAME.to_string(),
            format: Format::default(),
            test_mode: false,
            transport: None,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("api_version", &self.api_version)
            .field("hostname", &self.hostname)
            .field("format", &self.format)
            .field("test_mode", &self.test_mode)
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

/// File cache settings for the caching client.
///
/// A configuration with caching enabled can only be obtained through
/// [`CacheConfig::enabled`], which checks the directory up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    enabled: bool,
    ttl: Duration,
    dir: PathBuf,
}

impl CacheConfig {
    /// Caching turned off, with default TTL and directory.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ttl: DEFAULT_CACHE_TTL,
            dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }

    /// Caching turned on. Fails if `dir` is missing or not writable.
    pub fn enabled(dir: impl Into<PathBuf>, ttl: Duration) -> Result<Self> {
        let dir = dir.into();
        store::check_dir(&dir)?;

        Ok(Self {
            enabled: true,
            ttl,
            dir,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::disabled()
    }
}
