//! Error types for `subalert-render`.

use std::path::PathBuf;

use thiserror::Error;

/// A font or image asset could not be loaded. Fatal at startup.
#[derive(Debug, Error)]
pub enum AssetLoadError {
  #[error("cannot read asset {path:?}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{path:?} is not a usable font")]
  Font { path: PathBuf },

  #[error("{path:?} is not a usable watermark image: {source}")]
  Watermark {
    path:   PathBuf,
    #[source]
    source: image::ImageError,
  },
}

/// Rendering a single card failed.
#[derive(Debug, Error)]
pub enum RenderError {
  #[error("cannot create card directory {path:?}: {source}")]
  OutputDir {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("cannot write card {path:?}: {source}")]
  Write {
    path:   PathBuf,
    #[source]
    source: image::ImageError,
  },
}
