// src/channel/mod.rs

//! A typed FIFO channel for communication between threads.
//!
//! A [`Channel`] is a single clonable handle: every clone refers to the same
//! underlying queue, and any holder may send, receive or close. Capacity is
//! fixed at construction; zero capacity selects rendezvous mode, in which a
//! sender and a receiver synchronize on each handoff.

mod async_impl;
mod backoff;
pub(crate) mod core;
mod sync_impl;

pub use async_impl::{RecvFuture, RecvStream, SendFuture};

use self::core::{Shared, UNBOUNDED};
use crate::error::{SendError, TrySendError};

use std::fmt;
use std::sync::Arc;

/// A typed FIFO channel between parallel executors.
///
/// # Examples
///
/// ```
/// use weft::Channel;
///
/// let ch = Channel::new(2);
/// ch.send(1).unwrap();
/// ch.send(2).unwrap();
/// assert_eq!(ch.recv(), Some(1));
/// assert_eq!(ch.recv(), Some(2));
/// ```
pub struct Channel<T> {
  pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Clone for Channel<T> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T: Send> Channel<T> {
  /// Creates a channel with the given capacity.
  ///
  /// A capacity of `0` creates a rendezvous channel: `send` blocks until a
  /// receiver is waiting, and the handoff is synchronized. A positive
  /// capacity creates a buffered channel that decouples senders and
  /// receivers up to `capacity` values.
  pub fn new(capacity: usize) -> Self {
    Self {
      shared: Arc::new(Shared::new(capacity)),
    }
  }

  /// Creates a channel without a capacity bound. `send` on an unbounded
  /// channel never blocks and never fails with `Full`.
  pub fn unbounded() -> Self {
    Self {
      shared: Arc::new(Shared::new(UNBOUNDED)),
    }
  }

  /// Sends a value, blocking until the channel can accept it.
  ///
  /// On a buffered channel this blocks while the buffer is full; on a
  /// rendezvous channel it blocks until a receiver is waiting. Fails with
  /// [`SendError`] (returning the value) if the channel is closed or becomes
  /// closed while waiting.
  pub fn send(&self, value: T) -> Result<(), SendError<T>> {
    sync_impl::send_sync(&self.shared, value)
  }

  /// Attempts to send a value without blocking.
  ///
  /// Fails with [`TrySendError::Full`] when the buffer is full, or, on a
  /// rendezvous channel, whenever no receiver is currently waiting. Fails
  /// with [`TrySendError::Closed`] after [`close`](Channel::close).
  ///
  /// ```
  /// use weft::{Channel, TrySendError};
  ///
  /// let ch = Channel::new(1);
  /// assert!(ch.try_send(1).is_ok());
  /// assert!(matches!(ch.try_send(2), Err(TrySendError::Full(2))));
  /// ```
  pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
    self.shared.try_send_core(value)
  }

  /// Sends a value asynchronously.
  ///
  /// The returned future resolves exactly when the equivalent blocking
  /// [`send`](Channel::send) would return.
  pub fn async_send(&self, value: T) -> SendFuture<'_, T> {
    SendFuture::new(self, value)
  }

  /// Receives a value, blocking while the channel is empty.
  ///
  /// Returns `None` only once the channel is closed and every buffered value
  /// has been drained; end-of-stream is an ordinary return, not an error.
  pub fn recv(&self) -> Option<T> {
    sync_impl::recv_sync(&self.shared)
  }

  /// Attempts to receive a value without blocking.
  ///
  /// Returns `None` when nothing is buffered, whether or not the channel is
  /// closed; combine with [`is_closed`](Channel::is_closed) when the
  /// distinction matters.
  pub fn try_recv(&self) -> Option<T> {
    self.shared.try_recv_core()
  }

  /// Receives a value asynchronously.
  ///
  /// The returned future resolves exactly when the equivalent blocking
  /// [`recv`](Channel::recv) would return.
  pub fn async_recv(&self) -> RecvFuture<'_, T> {
    RecvFuture::new(self)
  }

  /// Returns a [`Stream`](futures_core::Stream) of received values that
  /// terminates once the channel is closed and drained.
  pub fn recv_stream(&self) -> RecvStream<T> {
    RecvStream::new(self.clone())
  }

  /// Closes the channel.
  ///
  /// Every waiting sender fails with [`SendError`], every waiting receiver
  /// drains the remaining buffered values and then observes end-of-stream,
  /// and every registered selector is notified. Closing an already-closed
  /// channel is permitted and has no further effect.
  pub fn close(&self) {
    self.shared.close_core();
  }

  /// Returns `true` if the channel has been closed. Monotonic: once `true`,
  /// always `true`.
  pub fn is_closed(&self) -> bool {
    self.shared.state.lock().closed
  }

  /// Returns `true` if no values are currently buffered.
  pub fn is_empty(&self) -> bool {
    self.shared.state.lock().queue.is_empty()
  }

  /// Returns the number of currently buffered values.
  pub fn len(&self) -> usize {
    self.shared.state.lock().queue.len()
  }
}

impl<T: Send> Default for Channel<T> {
  /// Equivalent to `Channel::new(0)`: a rendezvous channel.
  fn default() -> Self {
    Self::new(0)
  }
}

impl<T> fmt::Debug for Channel<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.shared.state.lock();
    f.debug_struct("Channel")
      .field("capacity", &self.shared.capacity)
      .field("len", &state.queue.len())
      .field("closed", &state.closed)
      .finish()
  }
}
