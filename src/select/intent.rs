// src/select/intent.rs

use super::signal::SelectSignal;
use crate::channel::core::PollTake;
use crate::channel::Channel;

use std::sync::Arc;

/// Outcome of polling one intent.
pub(crate) enum IntentPoll {
  /// A value was delivered through the callback.
  Fired,
  /// Nothing available; the intent stays armed.
  NotReady,
  /// The channel is closed and drained; the intent is done for good.
  Retired,
}

/// A type-erased receive intent. The selector keeps a homogeneous list of
/// these over channels of arbitrary element types.
pub(crate) trait Pollable: Send {
  fn poll(&mut self) -> IntentPoll;
}

/// The one concrete intent: receive from `channel`, hand the value to
/// `callback`. Holds a clone of the channel handle, so the channel outlives
/// the intent by construction.
pub(crate) struct ReceiveIntent<T: Send> {
  channel: Channel<T>,
  signal: Arc<SelectSignal>,
  callback: Box<dyn FnMut(T) + Send>,
}

impl<T: Send> ReceiveIntent<T> {
  pub(crate) fn new(
    channel: Channel<T>,
    signal: Arc<SelectSignal>,
    callback: Box<dyn FnMut(T) + Send>,
  ) -> Self {
    Self {
      channel,
      signal,
      callback,
    }
  }
}

impl<T: Send> Pollable for ReceiveIntent<T> {
  fn poll(&mut self) -> IntentPoll {
    // Value-or-drained is observed under a single channel lock acquisition,
    // so a deposit racing with close cannot be skipped at retire time.
    match self.channel.shared.poll_take() {
      PollTake::Value(value) => {
        (self.callback)(value);
        IntentPoll::Fired
      }
      PollTake::Empty => IntentPoll::NotReady,
      PollTake::Drained => IntentPoll::Retired,
    }
  }
}

impl<T: Send> Drop for ReceiveIntent<T> {
  fn drop(&mut self) {
    // Covers both retirement and selector teardown; unregistering an already
    // unregistered signal is a no-op.
    self.channel.shared.unregister_selector(&self.signal);
  }
}
