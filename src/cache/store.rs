// Cache store for reading and writing cached responses.
// Freshness is derived from file modification time; writes go through a temp file.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Result, VimeoError};

use super::paths::temp_path;

/// Probe names tried by [`check_dir`] before giving up.
const PROBE_ATTEMPTS: u32 = 16;

/// Metadata about a cache file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// When the file was last written.
    pub written_at: DateTime<Utc>,
    /// When the entry stops being served.
    pub expires_at: DateTime<Utc>,
    /// Whether the entry is still within its TTL.
    pub fresh: bool,
}

/// Check whether a file modified at `modified` is still valid at `now`.
///
/// A modification time in the future counts as fresh.
pub fn is_fresh(modified: SystemTime, now: SystemTime, ttl: Duration) -> bool {
    match now.duration_since(modified) {
        Ok(age) => age < ttl,
        Err(_) => true,
    }
}

/// Get the modification time of a cache file.
pub fn modified_at(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Read a cached JSON value, returning None if missing or expired.
pub fn read_if_fresh(path: &Path, ttl: Duration) -> Result<Option<Value>> {
    read_if_fresh_at(path, ttl, SystemTime::now())
}

/// Same as [`read_if_fresh`] with an explicit clock.
pub fn read_if_fresh_at(path: &Path, ttl: Duration, now: SystemTime) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }

    if !is_fresh(modified_at(path)?, now, ttl) {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let value = serde_json::from_str(&contents)?;
    Ok(Some(value))
}

/// Write a JSON value to cache.
///
/// The value is written to a sibling temp file and renamed into place, so
/// readers see either the previous file or the new one, never a partial write.
pub fn write_atomic(path: &Path, value: &Value) -> Result<()> {
    let json = serde_json::to_string(value)?;

    let temp_path = temp_path(path);
    let written = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));

    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    Ok(())
}

/// Describe a cache file without reading its contents.
pub fn entry_info(path: &Path, ttl: Duration) -> Result<Option<EntryInfo>> {
    if !path.exists() {
        return Ok(None);
    }

    let modified = modified_at(path)?;
    let written_at = DateTime::<Utc>::from(modified);
    let expires_at = DateTime::<Utc>::from(modified + ttl);

    Ok(Some(EntryInfo {
        written_at,
        expires_at,
        fresh: is_fresh(modified, SystemTime::now(), ttl),
    }))
}

/// Ensure `dir` exists, is a directory and accepts new files.
pub fn check_dir(dir: &Path) -> Result<()> {
    let cache_dir_error = |reason: &str| VimeoError::CacheDir {
        path: dir.to_path_buf(),
        reason: reason.to_string(),
    };

    if !dir.is_dir() {
        return Err(cache_dir_error("doesn't exist or isn't a directory"));
    }

    // Permission bits don't reflect ACLs or read-only mounts, so try a real file
    for attempt in 0..PROBE_ATTEMPTS {
        let probe = dir.join(format!(".write_probe_{}_{}", std::process::id(), attempt));
        let written = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&probe)
            .and_then(|mut file| file.write_all(b"probe"));

        match written {
            Ok(()) => {
                let _ = fs::remove_file(&probe);
                return Ok(());
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                let _ = fs::remove_file(&probe);
                return Err(cache_dir_error(&format!("isn't writable: {}", err)));
            }
        }
    }

    Err(cache_dir_error("isn't writable: no free probe file name"))
}
