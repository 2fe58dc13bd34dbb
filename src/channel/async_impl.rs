// src/channel/async_impl.rs

//! The `Future`-based send and receive variants.
//!
//! The futures park a `Waker` inside the channel and resolve exactly when the
//! equivalent blocking operation would return. Whatever executor polls them
//! (tokio in this crate's tests) plays the external-executor role; the channel
//! itself never spawns tasks. A future dropped while its waker is queued
//! leaves only a stale waker behind, which costs a spurious wake-up and
//! nothing else.

use super::core::Shared;
use super::Channel;
use crate::error::{SendError, TrySendError};

use core::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

// --- SendFuture ---

/// A future that completes when the value has been deposited into the channel.
///
/// Resolves with `Err(SendError)` if the channel is or becomes closed first;
/// the value is handed back inside the error.
#[must_use = "futures do nothing unless you .await or poll them"]
pub struct SendFuture<'a, T: Send> {
  channel: &'a Channel<T>,
  // Wrapped in an Option so it can be taken during the poll.
  item: Option<T>,
}

impl<'a, T: Send> SendFuture<'a, T> {
  pub(super) fn new(channel: &'a Channel<T>, item: T) -> Self {
    Self {
      channel,
      item: Some(item),
    }
  }
}

// The futures never pin-project their fields, so they are freely movable.
impl<'a, T: Send> Unpin for SendFuture<'a, T> {}

impl<'a, T: Send> fmt::Debug for SendFuture<'a, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SendFuture")
      .field("sent", &self.item.is_none())
      .finish()
  }
}

impl<'a, T: Send> Future for SendFuture<'a, T> {
  type Output = Result<(), SendError<T>>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    loop {
      // A completed future that gets polled again stays completed.
      let Some(item) = this.item.take() else {
        return Poll::Ready(Ok(()));
      };

      // --- Phase 1: Attempt a non-blocking deposit ---
      match this.channel.shared.try_send_core(item) {
        Ok(()) => return Poll::Ready(Ok(())),
        Err(TrySendError::Closed(returned)) => return Poll::Ready(Err(SendError(returned))),
        Err(TrySendError::Full(returned)) => {
          this.item = Some(returned);
        }
      }

      // --- Phase 2: Lock, re-check, and commit to parking ---
      let mut state = this.channel.shared.state.lock();
      if state.closed {
        let returned = this.item.take().expect("item still owned after failed deposit");
        return Poll::Ready(Err(SendError(returned)));
      }
      if this.channel.shared.can_accept(&state) {
        drop(state);
        continue;
      }
      state.park_async_sender(cx.waker().clone());
      return Poll::Pending;
    }
  }
}

// --- RecvFuture ---

/// A future that completes with `Some(value)` on delivery, or `None` once the
/// channel is closed and drained.
#[must_use = "futures do nothing unless you .await or poll them"]
pub struct RecvFuture<'a, T: Send> {
  channel: &'a Channel<T>,
  // Whether this future currently counts in `waiting_receivers`.
  announced: bool,
}

impl<'a, T: Send> RecvFuture<'a, T> {
  pub(super) fn new(channel: &'a Channel<T>) -> Self {
    Self {
      channel,
      announced: false,
    }
  }
}

impl<'a, T: Send> Unpin for RecvFuture<'a, T> {}

impl<'a, T: Send> fmt::Debug for RecvFuture<'a, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RecvFuture")
      .field("announced", &self.announced)
      .finish()
  }
}

impl<'a, T: Send> Future for RecvFuture<'a, T> {
  type Output = Option<T>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    poll_recv(&this.channel.shared, &mut this.announced, cx)
  }
}

impl<'a, T: Send> Drop for RecvFuture<'a, T> {
  fn drop(&mut self) {
    // A cancelled rendezvous receiver must retract its announcement or
    // senders would rendezvous with a ghost.
    if self.announced {
      let mut state = self.channel.shared.state.lock();
      state.waiting_receivers -= 1;
    }
  }
}

// --- RecvStream ---

/// A [`Stream`](futures_core::Stream) of received values; terminates once the
/// channel is closed and drained.
#[must_use = "streams do nothing unless polled"]
pub struct RecvStream<T: Send> {
  channel: Channel<T>,
  announced: bool,
}

impl<T: Send> RecvStream<T> {
  pub(super) fn new(channel: Channel<T>) -> Self {
    Self {
      channel,
      announced: false,
    }
  }
}

impl<T: Send> Unpin for RecvStream<T> {}

impl<T: Send> fmt::Debug for RecvStream<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RecvStream")
      .field("announced", &self.announced)
      .finish()
  }
}

impl<T: Send> futures_core::Stream for RecvStream<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
    let this = self.get_mut();
    poll_recv(&this.channel.shared, &mut this.announced, cx)
  }
}

impl<T: Send> Drop for RecvStream<T> {
  fn drop(&mut self) {
    if self.announced {
      let mut state = self.channel.shared.state.lock();
      state.waiting_receivers -= 1;
    }
  }
}

/// The single-lock receive poll shared by `RecvFuture` and `RecvStream`.
///
/// Checking the queue, observing closure and committing to the waker queue all
/// happen under one lock acquisition, so a deposit between the check and the
/// park is impossible.
fn poll_recv<T: Send>(
  shared: &Shared<T>,
  announced: &mut bool,
  cx: &mut Context<'_>,
) -> Poll<Option<T>> {
  let rendezvous = shared.capacity == 0;
  let mut state = shared.state.lock();

  if let Some(item) = state.queue.pop_front() {
    if *announced {
      state.waiting_receivers -= 1;
      *announced = false;
    }
    state.wake_senders();
    return Poll::Ready(Some(item));
  }
  if state.closed {
    if *announced {
      state.waiting_receivers -= 1;
      *announced = false;
    }
    return Poll::Ready(None);
  }

  if rendezvous && !*announced {
    state.waiting_receivers += 1;
    *announced = true;
    state.wake_senders();
  }

  state.park_async_receiver(cx.waker().clone());
  Poll::Pending
}
