//! [`Daemon`] runs one polling cycle at a time.

use std::{collections::HashSet, sync::Arc};

use anyhow::Context as _;
use subalert_core::{alert::AlertEvent, identity::Address};
use subalert_render::AlertRenderer;
use subalert_store_json::JsonSnapshotStore;
use subalert_watch::{
  ChangeDetector, Context, DrainReport, IdentityWatcher, NotificationDispatcher,
  Pipeline, ReleaseWatcher,
};

use crate::{
  config::DaemonConfig, feeds::FeedClient, gateway::GatewayClient,
  twitter::TwitterClient,
};

pub struct Daemon {
  feeds:          FeedClient,
  release_url:    Option<String>,
  candidates_url: Option<String>,
  addresses:      Vec<Address>,
  releases:       ReleaseWatcher<JsonSnapshotStore>,
  identities:     IdentityWatcher<GatewayClient, JsonSnapshotStore>,
  pipeline:       Pipeline<JsonSnapshotStore, TwitterClient, AlertRenderer>,
}

impl Daemon {
  /// Open the snapshot store, load card assets, and build the HTTP clients.
  ///
  /// Fails when an enabled asset cannot be loaded.
  pub async fn build(cfg: &DaemonConfig) -> anyhow::Result<Self> {
    let timeout = cfg.request_timeout();

    let renderer = if cfg.assets.enabled {
      let paths = cfg.asset_paths();
      let renderer = AlertRenderer::load(&paths)
        .context("failed to load alert card assets")?;
      Some(renderer)
    } else {
      tracing::info!("card rendering disabled, alerts will be text-only");
      None
    };

    let store = Arc::new(JsonSnapshotStore::open(&cfg.cache_dir).await);

    let ctx = Context::new(
      GatewayClient::new(&cfg.chain.gateway_url, timeout)?,
      TwitterClient::new(&cfg.twitter, timeout)?,
      &cfg.twitter.hashtag,
    )
    .with_request_timeout(timeout);

    let detector = ChangeDetector::new(Arc::clone(&store));

    Ok(Self {
      feeds:          FeedClient::new(timeout)?,
      release_url:    cfg.github.release_url.clone(),
      candidates_url: cfg.identity.candidates_url.clone(),
      addresses:      cfg.identity.addresses.iter().map(Address::new).collect(),
      releases:       ReleaseWatcher::with_detector(detector.clone()),
      identities:     IdentityWatcher::new(&ctx, Arc::clone(&store)),
      pipeline:       Pipeline::new(
        detector,
        NotificationDispatcher::new(&ctx),
        renderer,
      ),
    })
  }

  /// Run both watchers concurrently, then post whatever they found.
  pub async fn run_cycle(&mut self) -> DrainReport {
    let (releases, identities) =
      tokio::join!(self.watch_release(), self.watch_identities());

    self.pipeline.extend(releases);
    self.pipeline.extend(identities);

    let report = self.pipeline.drain().await;
    tracing::info!(
      posted = report.posted,
      duplicates = report.duplicates,
      failed = report.failed,
      commit_failures = report.commit_failures,
      "cycle complete"
    );
    report
  }

  async fn watch_release(&self) -> Option<AlertEvent> {
    let url = self.release_url.as_deref()?;

    let release = match self.feeds.latest_release(url).await {
      Ok(release) => release,
      Err(e) => {
        tracing::warn!("cannot fetch latest release: {e:#}");
        return None;
      }
    };

    self
      .releases
      .detect_change(&release)
      .await
      .inspect_err(|e| tracing::warn!("release check failed: {e}"))
      .ok()
      .flatten()
  }

  async fn watch_identities(&self) -> Vec<AlertEvent> {
    let addresses = self.watched_addresses().await;
    if addresses.is_empty() {
      return Vec::new();
    }

    self
      .identities
      .scan(&addresses)
      .await
      .inspect_err(|e| tracing::warn!("identity scan abandoned: {e}"))
      .unwrap_or_default()
  }

  /// Configured addresses followed by candidate stashes, without repeats.
  async fn watched_addresses(&self) -> Vec<Address> {
    let mut addresses = self.addresses.clone();

    if let Some(url) = self.candidates_url.as_deref() {
      match self.feeds.candidate_stashes(url).await {
        Ok(stashes) => addresses.extend(stashes),
        Err(e) => tracing::warn!("cannot fetch candidates: {e:#}"),
      }
    }

    let mut seen = HashSet::new();
    addresses.retain(|a| seen.insert(a.clone()));
    addresses
  }
}
