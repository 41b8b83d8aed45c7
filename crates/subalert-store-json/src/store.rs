//! [`JsonSnapshotStore`], the JSON-file implementation of [`SnapshotStore`].

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::Utc;
use serde_json::Value;
use subalert_core::{
  CacheIoError,
  snapshot::{Snapshot, SnapshotStore, SubjectKey},
};
use tokio::sync::Mutex;

use crate::encode::{
  CategoryFile, EXTENSION, category_path, read_category, write_category,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A snapshot store backed by one JSON file per subject category.
///
/// Cloning is cheap: the state is reference-counted.
#[derive(Clone)]
pub struct JsonSnapshotStore {
  inner: Arc<Inner>,
}

struct Inner {
  /// `None` for in-memory stores.
  dir:        Option<PathBuf>,
  categories: Mutex<HashMap<String, CategoryFile>>,
}

impl JsonSnapshotStore {
  /// Open the store rooted at `dir`, loading every category file in it.
  ///
  /// A missing directory is an empty store. Unreadable or corrupt files are
  /// logged and skipped: their subjects behave as if never observed.
  pub async fn open(dir: impl AsRef<Path>) -> Self {
    let dir = dir.as_ref().to_path_buf();
    let categories = load_categories(&dir).await;
    tracing::debug!(
      dir = %dir.display(),
      categories = categories.len(),
      "opened snapshot store"
    );
    Self::from_parts(Some(dir), categories)
  }

  /// A store that never touches the filesystem, for tests.
  pub fn in_memory() -> Self { Self::from_parts(None, HashMap::new()) }

  fn from_parts(
    dir: Option<PathBuf>,
    categories: HashMap<String, CategoryFile>,
  ) -> Self {
    Self {
      inner: Arc::new(Inner { dir, categories: Mutex::new(categories) }),
    }
  }

  /// The directory category files live in, if persistent.
  pub fn dir(&self) -> Option<&Path> { self.inner.dir.as_deref() }
}

async fn load_categories(dir: &Path) -> HashMap<String, CategoryFile> {
  let mut categories = HashMap::new();

  let mut entries = match tokio::fs::read_dir(dir).await {
    Ok(entries) => entries,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return categories,
    Err(e) => {
      tracing::warn!(dir = %dir.display(), "cannot list snapshot dir: {e}");
      return categories;
    }
  };

  loop {
    let entry = match entries.next_entry().await {
      Ok(Some(entry)) => entry,
      Ok(None) => break,
      Err(e) => {
        tracing::warn!(dir = %dir.display(), "cannot list snapshot dir: {e}");
        break;
      }
    };

    let path = entry.path();
    if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
      continue;
    }
    let Some(category) = path.file_stem().and_then(|s| s.to_str()) else {
      continue;
    };

    match read_category(&path).await {
      Ok(file) => {
        categories.insert(category.to_owned(), file);
      }
      Err(e) => {
        tracing::warn!("ignoring snapshot file, treating as empty: {e}");
      }
    }
  }

  categories
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for JsonSnapshotStore {
  async fn load(
    &self,
    key: &SubjectKey,
  ) -> Result<Option<Snapshot>, CacheIoError> {
    let categories = self.inner.categories.lock().await;
    Ok(
      categories
        .get(key.category())
        .and_then(|file| file.entries.get(&key.to_string()))
        .cloned(),
    )
  }

  async fn commit(
    &self,
    key: &SubjectKey,
    value: Value,
  ) -> Result<Snapshot, CacheIoError> {
    // Held across the write so commits to one store are serialised.
    let mut categories = self.inner.categories.lock().await;

    let mut file = categories
      .get(key.category())
      .cloned()
      .unwrap_or_default();

    let entry_key = key.to_string();
    let revision = file.entries.get(&entry_key).map_or(0, |s| s.revision) + 1;
    let snapshot = Snapshot { value, revision, updated_at: Utc::now() };
    file.entries.insert(entry_key, snapshot.clone());

    if let Some(dir) = &self.inner.dir {
      write_category(&category_path(dir, key.category()), &file).await?;
    }

    categories.insert(key.category().to_owned(), file);
    tracing::debug!(subject = %key, revision, "committed snapshot");
    Ok(snapshot)
  }
}
