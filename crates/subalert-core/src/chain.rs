//! The `ChainQuery` trait: read access to chain storage.
//!
//! Implemented by the daemon's HTTP storage gateway client and by in-memory
//! fakes in tests. Values are passed around as decoded JSON; typed decoding
//! happens in [`crate::identity`].

use std::future::Future;

use serde_json::Value;

use crate::ChainQueryError;

/// Pallet holding identity registrations.
pub const IDENTITY_MODULE: &str = "Identity";
/// `SuperOf(sub) -> (parent, name)`.
pub const SUPER_OF: &str = "SuperOf";
/// `IdentityOf(account) -> registration`.
pub const IDENTITY_OF: &str = "IdentityOf";

/// Read-only access to chain storage.
pub trait ChainQuery: Send + Sync {
  /// Read a single storage entry. `Ok(None)` means the entry is unset.
  fn query_storage<'a>(
    &'a self,
    module: &'a str,
    function: &'a str,
    params: &'a [Value],
  ) -> impl Future<Output = Result<Option<Value>, ChainQueryError>> + Send + 'a;

  /// Iterate every `(key, value)` entry of a storage map. Order is not
  /// significant.
  fn query_storage_map<'a>(
    &'a self,
    module: &'a str,
    function: &'a str,
  ) -> impl Future<Output = Result<Vec<(Value, Value)>, ChainQueryError>>
  + Send
  + 'a;
}
