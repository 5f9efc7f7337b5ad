//! Small on-disk store for the per-counter "visited" flag.
//!
//! Entries live under `<root>/.cache/` in a directory named by a hash of the
//! counter namespace and key, so any namespace string is filesystem safe.
//! The format is a tiny TOML file with a single `visited_at_ms` field.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const CACHE_DIR: &str = ".cache";

/// When this counter was first recorded from this machine, if ever.
pub fn load_visited(cache_dir: &Path, namespace: &str, key: &str) -> Option<u64> {
    let path = visited_path(cache_dir, namespace, key);
    let data = fs::read_to_string(path).ok()?;
    let value: VisitedEntry = toml::from_str(&data).ok()?;
    Some(value.visited_at_ms)
}

/// Persist the visited flag. Errors are ignored; a lost flag only means the
/// next run counts again.
pub fn save_visited(cache_dir: &Path, namespace: &str, key: &str) {
    let path = visited_path(cache_dir, namespace, key);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let entry = VisitedEntry {
        visited_at_ms: now_ms(),
    };
    if let Ok(contents) = toml::to_string(&entry) {
        if let Ok(mut file) = fs::File::create(path) {
            let _ = file.write_all(contents.as_bytes());
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct VisitedEntry {
    visited_at_ms: u64,
}

pub fn hash_dir(cache_dir: &Path, namespace: &str, key: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b"/");
    hasher.update(key.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    cache_dir.join(hash)
}

fn visited_path(cache_dir: &Path, namespace: &str, key: &str) -> PathBuf {
    hash_dir(cache_dir, namespace, key).join("visited.toml")
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
