/// String key-value persistence behind the expiring cache.
///
/// [`FileStore`] keeps the whole map in memory and rewrites a single JSON
/// file (`~/.revlens/cache.json` by default) after every mutation so cached
/// filter results survive across `revlens` invocations. All file I/O is
/// best-effort: a missing, unreadable or corrupt file starts an empty store,
/// and write failures are silently ignored so caching never blocks a filter.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Minimal key-value store with string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store, used by tests and when caching is disabled on disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// JSON-file-backed store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file is missing or
    /// unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path).unwrap_or_default();
        Self { path, entries }
    }

    /// Open the default store under the home directory, falling back to a
    /// file in the working directory when no home is available.
    pub fn open_default() -> Self {
        Self::open(default_path().unwrap_or_else(|| PathBuf::from(".revlens-cache.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        // Best-effort persist.
        let _ = save_entries(&self.path, &self.entries);
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist();
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Default cache file location (`~/.revlens/cache.json`).
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".revlens").join("cache.json"))
}

// ---------------------------------------------------------------------------
// File I/O (best-effort)
// ---------------------------------------------------------------------------

fn load_entries(path: &Path) -> Option<BTreeMap<String, String>> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn save_entries(path: &Path, entries: &BTreeMap<String, String>) -> Option<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).ok()?;
    }
    let json = serde_json::to_string_pretty(entries).ok()?;
    fs::write(path, json).ok()
}
