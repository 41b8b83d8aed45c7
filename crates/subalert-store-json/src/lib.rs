//! JSON-file backend for the subalert snapshot store.
//!
//! One file per subject category (`release.json`, `identity.json`, ...) in a
//! cache directory. Files are loaded once when the store is opened and
//! rewritten atomically on every commit.

mod encode;
mod store;

pub use store::JsonSnapshotStore;
