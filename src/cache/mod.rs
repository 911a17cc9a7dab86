// Cache module for local filesystem caching.
// Stores successful JSON API responses keyed by request URL.

pub mod paths;
pub mod store;

pub use paths::{cache_file, default_cache_dir, url_hash};
pub use store::{EntryInfo, check_dir, entry_info, read_if_fresh, write_atomic};
