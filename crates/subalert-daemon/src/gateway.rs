//! HTTP client for the JSON chain-storage gateway.
//!
//! `GET {base}/storage/{module}/{function}?params=<json array>` answers
//! `{"value": …}`; `GET {base}/storage/{module}/{function}/entries` answers
//! `{"entries": [[key, value], …]}`.

use std::time::Duration;

use anyhow::Context as _;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use subalert_core::{ChainQueryError, chain::ChainQuery};

#[derive(Clone)]
pub struct GatewayClient {
  client:   Client,
  base_url: String,
}

#[derive(Deserialize)]
struct ValueResponse {
  #[serde(default)]
  value: Option<Value>,
}

#[derive(Deserialize)]
struct EntriesResponse {
  entries: Vec<(Value, Value)>,
}

impl GatewayClient {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .context("failed to build gateway HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, module: &str, function: &str) -> String {
    format!(
      "{}/storage/{module}/{function}",
      self.base_url.trim_end_matches('/')
    )
  }

  async fn get(
    &self,
    url: &str,
    module: &str,
    function: &str,
    query: &[(&str, String)],
  ) -> Result<Response, ChainQueryError> {
    let resp = self
      .client
      .get(url)
      .query(query)
      .send()
      .await
      .map_err(|e| classify(e, module, function))?;

    if !resp.status().is_success() {
      return Err(ChainQueryError::Status(resp.status().as_u16()));
    }
    Ok(resp)
  }
}

fn classify(e: reqwest::Error, module: &str, function: &str) -> ChainQueryError {
  if e.is_timeout() {
    ChainQueryError::Timeout {
      module:   module.to_owned(),
      function: function.to_owned(),
    }
  } else {
    ChainQueryError::Transport(e.to_string())
  }
}

impl ChainQuery for GatewayClient {
  async fn query_storage(
    &self,
    module: &str,
    function: &str,
    params: &[Value],
  ) -> Result<Option<Value>, ChainQueryError> {
    let params = serde_json::to_string(params)
      .map_err(|e| ChainQueryError::decode("storage params", e.to_string()))?;
    let url = self.url(module, function);

    let body: ValueResponse = self
      .get(&url, module, function, &[("params", params)])
      .await?
      .json()
      .await
      .map_err(|e| ChainQueryError::decode("storage value", e.to_string()))?;

    Ok(body.value.filter(|v| !v.is_null()))
  }

  async fn query_storage_map(
    &self,
    module: &str,
    function: &str,
  ) -> Result<Vec<(Value, Value)>, ChainQueryError> {
    let url = format!("{}/entries", self.url(module, function));

    let body: EntriesResponse = self
      .get(&url, module, function, &[])
      .await?
      .json()
      .await
      .map_err(|e| ChainQueryError::decode("storage entries", e.to_string()))?;

    tracing::debug!(module, function, entries = body.entries.len(), "scanned storage map");
    Ok(body.entries)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn urls_ignore_trailing_slash() {
    let client =
      GatewayClient::new("http://gw.local/", Duration::from_secs(1)).unwrap();
    assert_eq!(
      client.url("Identity", "SuperOf"),
      "http://gw.local/storage/Identity/SuperOf"
    );
  }

  #[test]
  fn entries_decode_as_pairs() {
    let body: EntriesResponse = serde_json::from_str(
      r#"{"entries": [["5Alice", {"info": {}}], [["5Bob"], null]]}"#,
    )
    .unwrap();
    assert_eq!(body.entries.len(), 2);
    assert_eq!(body.entries[0].0, "5Alice");
  }

  #[test]
  fn missing_value_is_none() {
    let body: ValueResponse = serde_json::from_str("{}").unwrap();
    assert!(body.value.is_none());
  }
}
