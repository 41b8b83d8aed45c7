//! Daemon configuration, deserialised from `config.toml` and `SUBALERT__*`
//! environment variables.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use subalert_render::AssetPaths;

// ─── Top level ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
  pub chain:                ChainConfig,
  pub twitter:              TwitterConfig,
  #[serde(default)]
  pub github:               GithubConfig,
  #[serde(default)]
  pub identity:             IdentityConfig,
  #[serde(default)]
  pub assets:               AssetsConfig,
  /// Directory holding the snapshot files.
  #[serde(default = "default_cache_dir")]
  pub cache_dir:            PathBuf,
  #[serde(default = "default_poll_interval_secs")]
  pub poll_interval_secs:   u64,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
}

impl DaemonConfig {
  pub fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.poll_interval_secs.max(1))
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  /// Card asset locations, with the watermark defaulting to the hashtag's
  /// white logo.
  pub fn asset_paths(&self) -> AssetPaths {
    let watermark = self.assets.watermark.clone().unwrap_or_else(|| {
      PathBuf::from(format!("logos/{}_White.png", self.twitter.hashtag))
    });
    AssetPaths {
      regular_font: self.assets.regular_font.clone(),
      bold_font: self.assets.bold_font.clone(),
      watermark,
      output_dir: self.assets.output_dir.clone(),
    }
  }
}

fn default_cache_dir() -> PathBuf { PathBuf::from(".") }
fn default_poll_interval_secs() -> u64 { 300 }
fn default_request_timeout_secs() -> u64 { 60 }

// ─── Sections ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
  /// Base URL of the JSON storage gateway.
  pub gateway_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterConfig {
  #[serde(default = "default_twitter_api_url")]
  pub api_url:      String,
  #[serde(default = "default_twitter_upload_url")]
  pub upload_url:   String,
  /// OAuth 2.0 user-context access token with `tweet.write` and
  /// `media.write` scopes. Obtaining it is outside the daemon.
  pub access_token: String,
  /// Appended to every post, without the `#`.
  pub hashtag:      String,
}

fn default_twitter_api_url() -> String { "https://api.x.com/2".into() }
fn default_twitter_upload_url() -> String { "https://api.x.com/2".into() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubConfig {
  /// "Latest release" endpoint. The release watcher is off when unset.
  pub release_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
  #[serde(default)]
  pub addresses:      Vec<String>,
  /// JSON list of candidates whose `stash` addresses are watched too.
  pub candidates_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
  /// Post text-only alerts and skip loading assets when false.
  #[serde(default = "default_true")]
  pub enabled:      bool,
  #[serde(default = "default_regular_font")]
  pub regular_font: PathBuf,
  #[serde(default = "default_bold_font")]
  pub bold_font:    PathBuf,
  pub watermark:    Option<PathBuf>,
  #[serde(default = "default_output_dir")]
  pub output_dir:   PathBuf,
}

impl Default for AssetsConfig {
  fn default() -> Self {
    Self {
      enabled:      true,
      regular_font: default_regular_font(),
      bold_font:    default_bold_font(),
      watermark:    None,
      output_dir:   default_output_dir(),
    }
  }
}

fn default_true() -> bool { true }
fn default_regular_font() -> PathBuf {
  PathBuf::from("fonts/SourceCodePro-Regular.ttf")
}
fn default_bold_font() -> PathBuf { PathBuf::from("fonts/SourceCodePro-Bold.ttf") }
fn default_output_dir() -> PathBuf { PathBuf::from("logos/Imagify") }

#[cfg(test)]
mod tests {
  use config::{Config, File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> DaemonConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  const MINIMAL: &str = r#"
    [chain]
    gateway_url = "http://localhost:8080"

    [twitter]
    access_token = "secret"
    hashtag = "Kusama"
  "#;

  #[test]
  fn minimal_config_gets_defaults() {
    let cfg = parse(MINIMAL);

    assert_eq!(cfg.poll_interval(), Duration::from_secs(300));
    assert_eq!(cfg.request_timeout(), Duration::from_secs(60));
    assert_eq!(cfg.cache_dir, PathBuf::from("."));
    assert_eq!(cfg.twitter.api_url, "https://api.x.com/2");
    assert_eq!(cfg.twitter.access_token, "secret");
    assert!(cfg.github.release_url.is_none());
    assert!(cfg.identity.addresses.is_empty());
    assert!(cfg.assets.enabled);

    let paths = cfg.asset_paths();
    assert_eq!(paths.watermark, PathBuf::from("logos/Kusama_White.png"));
    assert_eq!(paths.output_dir, PathBuf::from("logos/Imagify"));
  }

  #[test]
  fn explicit_values_override_defaults() {
    let cfg = parse(&format!(
      r#"
      cache_dir = "/var/lib/subalert"
      poll_interval_secs = 30

      [identity]
      addresses = ["5Alice", "5Bob"]

      [assets]
      enabled = false
      watermark = "logo.png"
      {MINIMAL}
      "#
    ));

    assert_eq!(cfg.poll_interval(), Duration::from_secs(30));
    assert_eq!(cfg.identity.addresses, ["5Alice", "5Bob"]);
    assert!(!cfg.assets.enabled);
    assert_eq!(cfg.asset_paths().watermark, PathBuf::from("logo.png"));
  }

  #[test]
  fn zero_poll_interval_is_clamped() {
    let cfg = parse(&format!("poll_interval_secs = 0\n{MINIMAL}"));
    assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
  }
}
