//! On-disk layout of a category file and the read/write helpers around it.
//!
//! ```json
//! { "format": 1, "entries": { "identity:5Grw...": { "value": ..., "revision": 3, "updated_at": "..." } } }
//! ```

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use subalert_core::{CacheIoError, snapshot::Snapshot};

/// Current file layout version.
pub const FORMAT_VERSION: u32 = 1;

/// Extension of category files inside the cache directory.
pub const EXTENSION: &str = "json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFile {
  pub format:  u32,
  pub entries: BTreeMap<String, Snapshot>,
}

impl Default for CategoryFile {
  fn default() -> Self {
    Self { format: FORMAT_VERSION, entries: BTreeMap::new() }
  }
}

pub fn category_path(dir: &Path, category: &str) -> PathBuf {
  dir.join(format!("{category}.{EXTENSION}"))
}

/// Read and parse one category file.
pub async fn read_category(path: &Path) -> Result<CategoryFile, CacheIoError> {
  let raw = tokio::fs::read(path).await.map_err(|source| CacheIoError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  let file: CategoryFile =
    serde_json::from_slice(&raw).map_err(|source| CacheIoError::Corrupt {
      path: path.to_path_buf(),
      source,
    })?;
  if file.format != FORMAT_VERSION {
    return Err(CacheIoError::Read {
      path:   path.to_path_buf(),
      source: std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("unsupported snapshot format {}", file.format),
      ),
    });
  }
  Ok(file)
}

/// Write `file` to `path` via a sibling temp file and a rename, so readers
/// never observe a partial write.
pub async fn write_category(
  path: &Path,
  file: &CategoryFile,
) -> Result<(), CacheIoError> {
  let bytes = serde_json::to_vec_pretty(file)?;
  let write_err = |source| CacheIoError::Write { path: path.to_path_buf(), source };

  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
  }

  let mut tmp = path.as_os_str().to_owned();
  tmp.push(".tmp");
  let tmp = PathBuf::from(tmp);

  tokio::fs::write(&tmp, &bytes).await.map_err(write_err)?;
  tokio::fs::rename(&tmp, path).await.map_err(write_err)?;
  Ok(())
}
