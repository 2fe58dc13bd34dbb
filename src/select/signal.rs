// src/select/signal.rs

use parking_lot::{Condvar, Mutex};

/// The selector's level-triggered notification primitive.
///
/// Channels hold weak references to this signal and call [`notify`] on any
/// event that may unblock an intent (deposit or close). The flag is sticky:
/// a notification delivered while the selector is polling, rather than
/// waiting, is observed by the next [`wait`] instead of being lost.
///
/// Lock ordering: a channel always releases its own lock before calling
/// [`notify`], and the selector holds no channel lock while inside [`wait`],
/// so no cycle between channel locks and this mutex can form.
///
/// [`notify`]: SelectSignal::notify
/// [`wait`]: SelectSignal::wait
#[derive(Debug, Default)]
pub(crate) struct SelectSignal {
  notified: Mutex<bool>,
  cond: Condvar,
}

impl SelectSignal {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Sets the flag and wakes the selector if it is blocked in [`wait`].
  ///
  /// [`wait`]: SelectSignal::wait
  pub(crate) fn notify(&self) {
    let mut notified = self.notified.lock();
    *notified = true;
    self.cond.notify_all();
  }

  /// Blocks until the flag is set, then consumes it.
  pub(crate) fn wait(&self) {
    let mut notified = self.notified.lock();
    while !*notified {
      self.cond.wait(&mut notified);
    }
    *notified = false;
  }
}
