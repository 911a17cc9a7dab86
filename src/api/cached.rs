// Caching client for the JSON flavour of the Simple API.
// Serves fresh cache files, otherwise fetches, decorates and stores 2xx responses.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::cache::{self, EntryInfo};
use crate::config::{CacheConfig, Format, RequestConfig};
use crate::error::Result;

use super::client::{Reply, fetch};
use super::path::{Args, Endpoint};
use super::transport::ReqwestTransport;

/// Prefix of cache file names written by [`VimeoCache`].
pub const CACHE_TAG: &str = "VimeoCache";

/// Key under which response headers are attached in header mode.
pub const HEADER_KEY: &str = "_header";

/// Decoded JSON response.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    /// HTTP status of a live response; `None` when served from cache.
    pub status: Option<u16>,
    pub body: Value,
}

impl JsonResponse {
    pub fn from_cache(&self) -> bool {
        self.status.is_none()
    }
}

/// Attach raw headers to an object response. Other values are left alone.
pub fn decorate(value: &mut Value, header: &str) -> bool {
    match value {
        Value::Object(map) => {
            map.insert(HEADER_KEY.to_string(), Value::String(header.to_string()));
            true
        }
        _ => false,
    }
}

/// Client for the JSON Simple API with an optional file cache.
///
/// Requests are always made in JSON; the configured format is ignored.
#[derive(Debug, Clone)]
pub struct VimeoCache {
    endpoint: Endpoint,
    config: RequestConfig,
    cache: CacheConfig,
    header_mode: bool,
}

impl VimeoCache {
    /// Create a client using the default reqwest transport, caching disabled.
    pub fn new() -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_config(
            RequestConfig::new().with_transport(Arc::new(transport)),
        ))
    }

    pub fn with_config(config: RequestConfig) -> Self {
        Self {
            endpoint: Endpoint::root(),
            config: RequestConfig {
                format: Format::Json,
                ..config
            },
            cache: CacheConfig::disabled(),
            header_mode: false,
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

    /// Return request URLs instead of requesting them.
    pub fn test_mode(mut self, enabled: bool) -> Self {
        self.config.test_mode = enabled;
        self
    }

    /// Use the given cache settings. See [`CacheConfig::enabled`].
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Include raw response headers in object responses under `_header`.
    pub fn header_mode(mut self, enabled: bool) -> Self {
        self.header_mode = enabled;
        self
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    pub fn cache_config(&self) -> &CacheConfig {
        &self.cache
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Descend into a namespace, e.g. `videos` or `album`.
    pub fn namespace(&self, name: &str) -> Self {
        Self {
            endpoint: self.endpoint.join(name),
            ..self.clone()
        }
    }

    /// URL a call to `method` would request. Always a `.json` URL.
    pub fn url(&self, method: &str, args: &Args) -> String {
        let config = RequestConfig {
            format: Format::Json,
            ..self.config.clone()
        };
        self.endpoint.url(&config, method, args)
    }

    /// Cache file used for `url`.
    pub fn cache_path(&self, url: &str) -> PathBuf {
        cache::cache_file(self.cache.dir(), CACHE_TAG, url)
    }

    /// Describe the cache entry for a call, without any network access.
    pub fn cache_entry(&self, method: &str, args: &Args) -> Result<Option<EntryInfo>> {
        let path = self.cache_path(&self.url(method, args));
        cache::entry_info(&path, self.cache.ttl())
    }

    /// Call an API method under the current namespace.
    pub fn call(&self, method: &str, args: &Args) -> Result<Reply<JsonResponse>> {
        self.request(&self.url(method, args))
    }

    /// Request a fully formed URL, going through the cache when enabled.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn request(&self, url: &str) -> Result<Reply<JsonResponse>> {
        if self.config.test_mode {
            return Ok(Reply::Url(url.to_string()));
        }

        let path = self.cache_path(url);

        if self.cache.is_enabled() {
            match cache::read_if_fresh(&path, self.cache.ttl()) {
                Ok(Some(body)) => {
                    tracing::debug!("Cache hit for {}", url);
                    return Ok(Reply::Response(JsonResponse { status: None, body }));
                }
                Ok(None) => tracing::trace!("Cache miss for {}", url),
                Err(err) => tracing::warn!("Ignoring unreadable cache file {:?}: {}", path, err),
            }
        }

        let raw = fetch(&self.config, url)?;
        let mut body: Value = serde_json::from_str(&raw.body)?;

        if self.header_mode && !decorate(&mut body, &raw.header) {
            tracing::trace!("Response isn't an object, headers not attached");
        }

        if self.cache.is_enabled() && raw.is_success() {
            match cache::write_atomic(&path, &body) {
                Ok(()) => tracing::trace!("Cached response in {:?}", path),
                Err(err) => tracing::warn!("Failed to write cache file {:?}: {}", path, err),
            }
        }

        Ok(Reply::Response(JsonResponse {
            status: Some(raw.status),
            body,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::testing::StubTransport;
    use crate::error::VimeoError;
    use serde_json::json;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    const SEARCH_JSON: &str = r#"[{"id":1,"title":"Cats"}]"#;
    const USER_JSON: &str = r#"{"display_name":"Brad","total_videos_uploaded":3}"#;

    fn client_with(stub: &Arc<StubTransport>) -> VimeoCache {
        VimeoCache::with_config(RequestConfig::new().with_transport(stub.clone()))
    }

    fn cached_client(stub: &Arc<StubTransport>, dir: &TempDir, ttl: u64) -> VimeoCache {
        let cache = CacheConfig::enabled(dir.path(), Duration::from_secs(ttl)).unwrap();
        client_with(stub).cache(cache)
    }

    fn cache_files(dir: &TempDir) -> usize {
        fs::read_dir(dir.path()).unwrap().count()
    }

    #[test]
    fn test_always_json() {
        let stub = Arc::new(StubTransport::new(200, SEARCH_JSON));
        let config = RequestConfig {
            format: Format::Xml,
            ..RequestConfig::new().with_transport(stub.clone())
        };
        let vimeo = VimeoCache::with_config(config).test_mode(true);

        let reply = vimeo
            .namespace("videos")
            .call("search", &Args::new().arg("query", "cats"))
            .unwrap();
        assert_eq!(
            reply.url(),
            Some("http://vimeo.com/api/v2/videos/search.json?query=cats")
        );
    }

    #[test]
    fn test_test_mode_skips_cache_and_network() {
        let temp_dir = TempDir::new().unwrap();
        let stub = Arc::new(StubTransport::new(200, SEARCH_JSON));
        let vimeo = cached_client(&stub, &temp_dir, 3600).test_mode(true);

        vimeo.namespace("videos").call("search", &Args::new()).unwrap();

        assert_eq!(stub.calls(), 0);
        assert_eq!(cache_files(&temp_dir), 0);
    }

    #[test]
    fn test_namespace_carries_cache_settings() {
        let temp_dir = TempDir::new().unwrap();
        let stub = Arc::new(StubTransport::new(200, SEARCH_JSON));
        let vimeo = cached_client(&stub, &temp_dir, 60).header_mode(true);

        let user = vimeo.namespace("User");
        assert!(user.cache_config().is_enabled());
        assert_eq!(user.cache_config().ttl(), Duration::from_secs(60));
        assert!(user.header_mode);
        assert_eq!(user.endpoint().segments(), ["user"]);
        assert!(vimeo.endpoint().segments().is_empty());
    }

    #[test]
    fn test_second_call_served_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let stub = Arc::new(StubTransport::new(200, SEARCH_JSON));
        let videos = cached_client(&stub, &temp_dir, 3600).namespace("videos");
        let args = Args::new().arg("query", "cats");

        let first = videos.call("search", &args).unwrap().into_response().unwrap();
        assert_eq!(first.status, Some(200));
        assert!(!first.from_cache());

        let path = videos.cache_path(&videos.url("search", &args));
        assert!(path.exists());
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("VimeoCache_")
        );

        let second = videos.call("search", &args).unwrap().into_response().unwrap();
        assert!(second.from_cache());
        assert_eq!(second.body, first.body);
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn test_expired_entry_refetched() {
        let temp_dir = TempDir::new().unwrap();
        let stub = Arc::new(StubTransport::new(200, SEARCH_JSON));
        let videos = cached_client(&stub, &temp_dir, 100).namespace("videos");
        let args = Args::new().arg("query", "cats");

        videos.call("search", &args).unwrap();

        let path = videos.cache_path(&videos.url("search", &args));
        let file = fs::File::options().write(true).open(&path).unwrap();

        file.set_modified(SystemTime::now() - Duration::from_secs(99)).unwrap();
        videos.call("search", &args).unwrap();
        assert_eq!(stub.calls(), 1);

        file.set_modified(SystemTime::now() - Duration::from_secs(101)).unwrap();
        let reply = videos.call("search", &args).unwrap().into_response().unwrap();
        assert!(!reply.from_cache());
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn test_error_status_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let stub = Arc::new(StubTransport::new(404, r#"{"error":"Not found"}"#));
        let user = cached_client(&stub, &temp_dir, 3600).namespace("nobody");

        let response = user.call("info", &Args::new()).unwrap().into_response().unwrap();
        assert_eq!(response.status, Some(404));
        assert_eq!(response.body, json!({ "error": "Not found" }));
        assert_eq!(cache_files(&temp_dir), 0);

        user.call("info", &Args::new()).unwrap();
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn test_caching_disabled_always_fetches() {
        let stub = Arc::new(StubTransport::new(200, SEARCH_JSON));
        let vimeo = client_with(&stub);
        assert!(!vimeo.cache_config().is_enabled());

        vimeo.namespace("videos").call("search", &Args::new()).unwrap();
        let second = vimeo
            .namespace("videos")
            .call("search", &Args::new())
            .unwrap()
            .into_response()
            .unwrap();

        assert!(!second.from_cache());
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn test_header_mode_on_object() {
        let temp_dir = TempDir::new().unwrap();
        let stub = Arc::new(StubTransport::new(200, USER_JSON));
        let user = cached_client(&stub, &temp_dir, 3600)
            .header_mode(true)
            .namespace("brad");

        let response = user.call("info", &Args::new()).unwrap().into_response().unwrap();
        let header = response.body[HEADER_KEY].as_str().unwrap();
        assert!(header.starts_with("HTTP/1.1 200"));
        assert_eq!(response.body["display_name"], "Brad");

        // Headers are stored with the cached value
        let cached = user.call("info", &Args::new()).unwrap().into_response().unwrap();
        assert!(cached.from_cache());
        assert_eq!(cached.body[HEADER_KEY], response.body[HEADER_KEY]);
    }

    #[test]
    fn test_header_mode_skips_arrays_and_scalars() {
        let stub = Arc::new(StubTransport::new(200, SEARCH_JSON));
        let vimeo = client_with(&stub).header_mode(true);

        let response = vimeo
            .namespace("videos")
            .call("search", &Args::new())
            .unwrap()
            .into_response()
            .unwrap();
        assert_eq!(response.body, serde_json::from_str::<Value>(SEARCH_JSON).unwrap());

        let mut scalar = json!(42);
        assert!(!decorate(&mut scalar, "HTTP/1.1 200 OK"));
        assert_eq!(scalar, json!(42));
    }

    #[test]
    fn test_corrupt_cache_file_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let stub = Arc::new(StubTransport::new(200, SEARCH_JSON));
        let videos = cached_client(&stub, &temp_dir, 3600).namespace("videos");

        let path = videos.cache_path(&videos.url("search", &Args::new()));
        fs::write(&path, "{ truncated").unwrap();

        let response = videos
            .call("search", &Args::new())
            .unwrap()
            .into_response()
            .unwrap();
        assert!(!response.from_cache());
        assert_eq!(stub.calls(), 1);

        // The live response replaced the bad file
        let fixed = videos.call("search", &Args::new()).unwrap().into_response().unwrap();
        assert!(fixed.from_cache());
    }

    #[test]
    fn test_cache_entry_info() {
        let temp_dir = TempDir::new().unwrap();
        let stub = Arc::new(StubTransport::new(200, SEARCH_JSON));
        let videos = cached_client(&stub, &temp_dir, 3600).namespace("videos");
        let args = Args::new().arg("query", "cats");

        assert!(videos.cache_entry("search", &args).unwrap().is_none());

        videos.call("search", &args).unwrap();
        let info = videos.cache_entry("search", &args).unwrap().unwrap();
        assert!(info.fresh);
    }

    #[test]
    fn test_missing_transport_and_parse_errors() {
        let vimeo = VimeoCache::with_config(RequestConfig::new());
        let err = vimeo.namespace("user").call("info", &Args::new()).unwrap_err();
        assert!(matches!(err, VimeoError::MissingTransport));

        let stub = Arc::new(StubTransport::new(200, "<xml/>"));
        let err = client_with(&stub)
            .namespace("user")
            .call("info", &Args::new())
            .unwrap_err();
        assert!(matches!(err, VimeoError::Json(_)));
    }
}
