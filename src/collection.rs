//! Discovered-item collection
//!
//! An ordered, deduplicated list of item ids the player has ever picked,
//! rewritten to storage on every new discovery. Storage is cosmetic: any
//! failure logs a warning and the collection carries on in memory only.

use crate::error::PersistError;
use crate::sim::items::Item;

/// Storage key / file stem
const STORAGE_KEY: &str = "abyss_fall_collection";

/// Backing store for the collection
pub trait CollectionStore: std::fmt::Debug {
    /// Human-readable backend name for logs
    fn name(&self) -> &'static str;
    fn load(&self) -> Result<Vec<u32>, PersistError>;
    fn save(&mut self, ids: &[u32]) -> Result<(), PersistError>;
}

/// Volatile store (tests, and the fallback when persistence fails)
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    ids: Vec<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectionStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> Result<Vec<u32>, PersistError> {
        Ok(self.ids.clone())
    }

    fn save(&mut self, ids: &[u32]) -> Result<(), PersistError> {
        self.ids = ids.to_vec();
        Ok(())
    }
}

/// JSON array on disk, written through a temp file and renamed into place
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/abyss_fall_collection.json`
    pub fn in_dir(dir: impl AsRef<std::path::Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", STORAGE_KEY)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl CollectionStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json file"
    }

    fn load(&self) -> Result<Vec<u32>, PersistError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&mut self, ids: &[u32]) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(ids)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(PersistError::Unavailable {
                backend: "localStorage",
            })
    }
}

#[cfg(target_arch = "wasm32")]
impl CollectionStore for LocalStorageStore {
    fn name(&self) -> &'static str {
        "localStorage"
    }

    fn load(&self) -> Result<Vec<u32>, PersistError> {
        match Self::storage()?.get_item(STORAGE_KEY) {
            Ok(Some(json)) => Ok(serde_json::from_str(&json)?),
            Ok(None) => Ok(Vec::new()),
            Err(_) => Err(PersistError::Unavailable {
                backend: "localStorage",
            }),
        }
    }

    fn save(&mut self, ids: &[u32]) -> Result<(), PersistError> {
        let json = serde_json::to_string(ids)?;
        Self::storage()?
            .set_item(STORAGE_KEY, &json)
            .map_err(|_| PersistError::Unavailable {
                backend: "localStorage",
            })
    }
}

/// The platform's default persistent store
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn CollectionStore> {
    Box::new(LocalStorageStore)
}

/// The platform's default persistent store
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn CollectionStore> {
    Box::new(JsonFileStore::in_dir(std::env::temp_dir()))
}

/// Seen item ids in discovery order
#[derive(Debug)]
pub struct Collection {
    seen: Vec<u32>,
    /// `None` once persistence has failed
    store: Option<Box<dyn CollectionStore>>,
}

impl Default for Collection {
    fn default() -> Self {
        Self::memory()
    }
}

impl Collection {
    /// In-memory only
    pub fn memory() -> Self {
        Self {
            seen: Vec::new(),
            store: None,
        }
    }

    /// Read the collection from `store`. Never fails: on error the collection
    /// starts empty and stays in memory.
    pub fn load(store: Box<dyn CollectionStore>) -> Self {
        match store.load() {
            Ok(ids) => {
                let mut collection = Self {
                    seen: Vec::with_capacity(ids.len()),
                    store: Some(store),
                };
                for id in ids {
                    match Item::try_from(id) {
                        Ok(_) if !collection.seen.contains(&id) => collection.seen.push(id),
                        Ok(_) => {}
                        Err(e) => log::warn!("Dropping stored collection entry: {}", e),
                    }
                }
                log::info!("Loaded {} collected items", collection.seen.len());
                collection
            }
            Err(e) => {
                log::warn!("{} unavailable, collection is memory-only: {}", store.name(), e);
                Self::memory()
            }
        }
    }

    /// Record a discovery. Returns true if `id` was new.
    pub fn mark_seen(&mut self, id: u32) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.push(id);
        self.persist();
        true
    }

    fn persist(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(e) = store.save(&self.seen) {
            log::warn!(
                "Failed to save collection to {}, continuing in memory: {}",
                store.name(),
                e
            );
            self.store = None;
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.seen.contains(&id)
    }

    pub fn ids(&self) -> &[u32] {
        &self.seen
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// True once the backing store has been dropped (or never existed)
    pub fn is_memory_only(&self) -> bool {
        self.store.is_none()
    }
}
