use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use tracing::{debug, warn};

use crate::constants::constants;

// --- Storage ---

/// Key-value persistence for the favorite channel IDs.
///
/// `load` never fails: absent or unreadable data is an empty list.
pub trait FavoritesStore: Send {
  fn load(&self) -> Vec<i64>;
  fn save(&self, ids: &[i64]) -> Result<()>;
}

/// Stores the IDs as a JSON array in `<dir>/<key>.json`.
pub struct JsonFileStore {
  path: PathBuf,
}

impl JsonFileStore {
  pub fn new(dir: &Path, key: &str) -> Self {
    Self { path: dir.join(format!("{}.json", key)) }
  }

  /// Store under the platform data directory, keyed by the configured favorites key.
  pub fn in_data_dir() -> Option<Self> {
    ProjectDirs::from("", "", "televe").map(|dirs| Self::new(dirs.data_dir(), &constants().favorites_key))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl FavoritesStore for JsonFileStore {
  fn load(&self) -> Vec<i64> {
    let Ok(content) = std::fs::read_to_string(&self.path) else {
      return Vec::new();
    };
    match serde_json::from_str(&content) {
      Ok(ids) => ids,
      Err(e) => {
        warn!(path = %self.path.display(), err = %e, "favorites: corrupt store, starting empty");
        Vec::new()
      }
    }
  }

  fn save(&self, ids: &[i64]) -> Result<()> {
    if let Some(dir) = self.path.parent() {
      std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let content = serde_json::to_string(ids).context("Failed to encode favorites")?;
    std::fs::write(&self.path, content).with_context(|| format!("Failed to write {}", self.path.display()))
  }
}

/// In-memory store. Clones share the same backing list.
#[derive(Clone, Default)]
pub struct MemoryStore {
  ids: Arc<StdMutex<Vec<i64>>>,
}

impl MemoryStore {
  pub fn with_ids(ids: &[i64]) -> Self {
    Self { ids: Arc::new(StdMutex::new(ids.to_vec())) }
  }

  pub fn snapshot(&self) -> Vec<i64> {
    self.ids.lock().map(|ids| ids.clone()).unwrap_or_default()
  }
}

impl FavoritesStore for MemoryStore {
  fn load(&self) -> Vec<i64> {
    self.snapshot()
  }

  fn save(&self, ids: &[i64]) -> Result<()> {
    if let Ok(mut stored) = self.ids.lock() {
      *stored = ids.to_vec();
    }
    Ok(())
  }
}

// --- Favorites Set ---

/// Favorite channel IDs in the order they were added, persisted on every toggle.
pub struct Favorites {
  ids: Vec<i64>,
  store: Box<dyn FavoritesStore>,
}

impl Favorites {
  pub fn load(store: Box<dyn FavoritesStore>) -> Self {
    let mut ids = Vec::new();
    for id in store.load() {
      if !ids.contains(&id) {
        ids.push(id);
      }
    }
    debug!(count = ids.len(), "favorites: loaded");
    Self { ids, store }
  }

  pub fn ids(&self) -> &[i64] {
    &self.ids
  }

  pub fn contains(&self, id: i64) -> bool {
    self.ids.contains(&id)
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  /// Add or remove `id`, then rewrite the store.
  ///
  /// Returns whether the channel is a favorite afterwards. The in-memory set
  /// is updated even if persisting fails; the error is returned for display.
  pub fn toggle(&mut self, id: i64) -> Result<bool> {
    let now_favorite = match self.ids.iter().position(|f| *f == id) {
      Some(pos) => {
        self.ids.remove(pos);
        false
      }
      None => {
        self.ids.push(id);
        true
      }
    };
    self.store.save(&self.ids).context("Failed to save favorites")?;
    Ok(now_favorite)
  }
}
