//! FIFO buffer of alerts awaiting dispatch.

use std::collections::VecDeque;

use subalert_core::alert::AlertEvent;

/// Unbounded first-in, first-out queue. Does no deduplication: that happens
/// upstream, in change detection.
#[derive(Debug, Default)]
pub struct AlertQueue {
  items: VecDeque<AlertEvent>,
}

impl AlertQueue {
  pub fn new() -> Self { Self::default() }

  pub fn enqueue(&mut self, event: AlertEvent) { self.items.push_back(event); }

  pub fn dequeue(&mut self) -> Option<AlertEvent> { self.items.pop_front() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  pub fn len(&self) -> usize { self.items.len() }
}

impl Extend<AlertEvent> for AlertQueue {
  fn extend<I: IntoIterator<Item = AlertEvent>>(&mut self, iter: I) {
    self.items.extend(iter);
  }
}
