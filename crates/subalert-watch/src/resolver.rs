//! [`IdentityResolver`]: address to human-readable label.
//!
//! Resolution follows at most one super-identity hop, then reads the
//! identity registered under the effective address. Chain failures are
//! propagated; they never masquerade as "no identity".

use std::{future::Future, sync::Arc, time::Duration};

use serde_json::Value;
use subalert_core::{
  ChainQueryError,
  chain::{ChainQuery, IDENTITY_MODULE, IDENTITY_OF, SUPER_OF},
  identity::{Address, IdentityRegistry, ResolvedIdentity, SuperLink},
};

use crate::Context;

pub struct IdentityResolver<C> {
  chain:   Arc<C>,
  timeout: Duration,
}

impl<C> Clone for IdentityResolver<C> {
  fn clone(&self) -> Self {
    Self { chain: Arc::clone(&self.chain), timeout: self.timeout }
  }
}

impl<C: ChainQuery> IdentityResolver<C> {
  pub fn new<P>(ctx: &Context<C, P>) -> Self {
    Self { chain: Arc::clone(&ctx.chain), timeout: ctx.request_timeout }
  }

  /// The super identity `address` is a sub-account of, if any.
  pub async fn super_of(
    &self,
    address: &Address,
  ) -> Result<Option<SuperLink>, ChainQueryError> {
    let params = [Value::String(address.to_string())];
    let value = self
      .bounded(
        SUPER_OF,
        self.chain.query_storage(IDENTITY_MODULE, SUPER_OF, &params),
      )
      .await?;

    value
      .filter(|v| !v.is_null())
      .map(|v| SuperLink::from_chain(&v))
      .transpose()
  }

  /// The address whose identity speaks for `address`: its super identity if
  /// it has one, otherwise itself. Only one hop is followed.
  pub async fn effective_address(
    &self,
    address: &Address,
  ) -> Result<Address, ChainQueryError> {
    Ok(match self.super_of(address).await? {
      Some(link) => {
        tracing::debug!(sub = %address, parent = %link.parent, "following super identity");
        link.parent
      }
      None => address.clone(),
    })
  }

  /// Fetch the whole identity registry. Do this once per cycle and pass the
  /// result to [`Self::resolve_in`] when resolving many addresses.
  pub async fn registry(&self) -> Result<IdentityRegistry, ChainQueryError> {
    let entries = self
      .bounded(
        IDENTITY_OF,
        self.chain.query_storage_map(IDENTITY_MODULE, IDENTITY_OF),
      )
      .await?;
    let registry = IdentityRegistry::from_entries(entries);
    for e in registry.undecodable() {
      tracing::warn!("skipping identity entry: {e}");
    }
    tracing::debug!(identities = registry.len(), "fetched identity registry");
    Ok(registry)
  }

  /// Resolve `address` against a freshly fetched registry.
  pub async fn resolve(
    &self,
    address: &Address,
  ) -> Result<ResolvedIdentity, ChainQueryError> {
    let effective = self.effective_address(address).await?;
    let registry = self.registry().await?;
    Ok(ResolvedIdentity::from_record(address, registry.get(&effective)))
  }

  /// Resolve `address` against an already fetched registry.
  pub async fn resolve_in(
    &self,
    registry: &IdentityRegistry,
    address: &Address,
  ) -> Result<ResolvedIdentity, ChainQueryError> {
    let effective = self.effective_address(address).await?;
    Ok(ResolvedIdentity::from_record(address, registry.get(&effective)))
  }

  async fn bounded<T>(
    &self,
    function: &str,
    query: impl Future<Output = Result<T, ChainQueryError>>,
  ) -> Result<T, ChainQueryError> {
    tokio::time::timeout(self.timeout, query)
      .await
      .map_err(|_| ChainQueryError::Timeout {
        module:   IDENTITY_MODULE.to_owned(),
        function: function.to_owned(),
      })?
  }
}
