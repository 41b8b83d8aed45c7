//! The identity-resolution and change-notification pipeline.
//!
//! Watchers turn freshly fetched chain and release data into [`AlertEvent`]s
//! by comparing it against committed snapshots. The [`Pipeline`] queues those
//! events, renders a card for each, posts them, and commits the snapshot once
//! the channel has the alert.
//!
//! [`AlertEvent`]: subalert_core::alert::AlertEvent

pub mod context;
pub mod detector;
pub mod dispatcher;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod queue;
pub mod release;
pub mod resolver;

pub use context::Context;
pub use detector::{ChangeDetector, CommitPolicy, Comparison, Detection, FirstObservation};
pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use error::{Error, Result};
pub use identity::IdentityWatcher;
pub use pipeline::{DrainReport, Pipeline};
pub use queue::AlertQueue;
pub use release::ReleaseWatcher;
pub use resolver::IdentityResolver;

#[cfg(test)]
mod testing;
