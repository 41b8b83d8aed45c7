//! Watches the on-chain identities of a set of addresses.

use std::sync::Arc;

use subalert_core::{
  alert::AlertEvent,
  chain::ChainQuery,
  identity::{Address, IdentityRegistry, ResolvedIdentity},
  snapshot::{SnapshotStore, SubjectKey},
};

use crate::{ChangeDetector, Comparison, Context, Detection, IdentityResolver, Result};

pub struct IdentityWatcher<C, S> {
  resolver: IdentityResolver<C>,
  detector: ChangeDetector<S>,
}

impl<C: ChainQuery, S: SnapshotStore> IdentityWatcher<C, S> {
  pub fn new<P>(ctx: &Context<C, P>, store: Arc<S>) -> Self {
    Self::with_detector(IdentityResolver::new(ctx), ChangeDetector::new(store))
  }

  pub fn with_detector(
    resolver: IdentityResolver<C>,
    detector: ChangeDetector<S>,
  ) -> Self {
    Self { resolver, detector }
  }

  /// Check every address against one registry fetch.
  ///
  /// A chain failure abandons the whole scan. A snapshot write failure is
  /// logged and only skips that address.
  pub async fn scan(&self, addresses: &[Address]) -> Result<Vec<AlertEvent>> {
    let registry = self.resolver.registry().await?;
    let mut events = Vec::new();
    for address in addresses {
      match self.detect_change(&registry, address).await {
        Ok(Some(event)) => events.push(event),
        Ok(None) => {}
        Err(crate::Error::Cache(e)) => {
          tracing::error!(%address, "cannot persist identity snapshot: {e}");
        }
        Err(e) => return Err(e),
      }
    }
    tracing::info!(
      watched = addresses.len(),
      changed = events.len(),
      "identity scan complete"
    );
    Ok(events)
  }

  /// Compare the identity speaking for `address` against its snapshot.
  ///
  /// The snapshot holds the full record registered under the effective
  /// address; an address without a registration is an empty record.
  pub async fn detect_change(
    &self,
    registry: &IdentityRegistry,
    address: &Address,
  ) -> Result<Option<AlertEvent>> {
    let effective = self.resolver.effective_address(address).await?;
    let record = registry.get(&effective).cloned().unwrap_or_default();

    let key = SubjectKey::identity(address);
    let detection = self
      .detector
      .detect(&key, &record.to_value()?, &Comparison::Whole)
      .await?;

    let Detection::Changed { pending, .. } = detection else {
      return Ok(None);
    };

    let label = ResolvedIdentity::from_record(address, Some(&record));
    let body = if record.label().is_some() {
      format!("{label} updated their on-chain identity\n{address}")
    } else {
      format!("{address} no longer has a display identity")
    };
    Ok(Some(AlertEvent::new(key, "Identity Update", body, pending)))
  }
}
