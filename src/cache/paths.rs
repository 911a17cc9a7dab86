// Cache path utilities.
// Derives cache file names from request URLs.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use directories::ProjectDirs;
use md5::{Digest, Md5};

/// Extension of committed cache files.
pub const CACHE_EXTENSION: &str = "cache";

/// Suffix appended to a cache file name while it is being written.
pub const TEMP_SUFFIX: &str = "_tmp";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Platform cache directory for the CLI (~/.cache/vimeo-simple on Linux).
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "vimeo-simple").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Lowercase hex MD5 of a request URL.
pub fn url_hash(url: &str) -> String {
    format!("{:x}", Md5::digest(url.as_bytes()))
}

/// Path of the cache file for `url`, e.g. `{dir}/VimeoCache_{md5}.cache`.
///
/// `tag` identifies the client that owns the entry.
pub fn cache_file(dir: &Path, tag: &str, url: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", tag, url_hash(url), CACHE_EXTENSION))
}

/// Sibling path used for the write-then-rename sequence.
///
/// Unique per call (`{path}_tmp.{pid}.{n}`), so concurrent writers of the
/// same entry never share a temp file.
pub fn temp_path(path: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut name = path.as_os_str().to_owned();
    name.push(format!("{}.{}.{}", TEMP_SUFFIX, std::process::id(), n));
    PathBuf::from(name)
}
