//! Plain JSON feeds: the GitHub latest release and the validator candidate
//! list.

use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use reqwest::Client;
use serde_json::Value;
use subalert_core::identity::Address;

#[derive(Clone)]
pub struct FeedClient {
  client: Client,
}

impl FeedClient {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(concat!("subalert/", env!("CARGO_PKG_VERSION")))
      .build()
      .context("failed to build feed HTTP client")?;
    Ok(Self { client })
  }

  async fn get_json(&self, url: &str) -> Result<Value> {
    let resp = self
      .client
      .get(url)
      .send()
      .await
      .with_context(|| format!("GET {url} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET {url} → {}", resp.status()));
    }
    resp.json().await.with_context(|| format!("decoding {url}"))
  }

  /// `GET` a GitHub "latest release" endpoint.
  pub async fn latest_release(&self, url: &str) -> Result<Value> {
    self.get_json(url).await
  }

  /// `GET` the candidate list and return each candidate's stash address.
  pub async fn candidate_stashes(&self, url: &str) -> Result<Vec<Address>> {
    let body = self.get_json(url).await?;
    stashes(&body).with_context(|| format!("reading candidates from {url}"))
  }
}

/// Extract `stash` from every candidate object. Candidates without one are
/// skipped.
fn stashes(body: &Value) -> Result<Vec<Address>> {
  let candidates = body
    .as_array()
    .ok_or_else(|| anyhow!("expected a JSON array of candidates"))?;

  Ok(
    candidates
      .iter()
      .filter_map(|c| c.get("stash").and_then(Value::as_str))
      .map(Address::new)
      .collect(),
  )
}
