// src/channel/sync_impl.rs

//! The synchronous, blocking send and receive loops.

use super::backoff;
use super::core::{Shared, SyncWaiter};
use crate::error::{SendError, TrySendError};
use crate::telemetry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const LOC_SEND: &str = "channel::send_sync";
const LOC_RECV: &str = "channel::recv_sync";
const CTR_PARKS: &str = "parks";

/// The blocking send operation.
///
/// Attempts a non-blocking deposit first; when the channel cannot accept the
/// value the calling thread parks until space frees up (buffered), a receiver
/// announces itself (rendezvous), or the channel closes.
pub(crate) fn send_sync<T: Send>(shared: &Shared<T>, item: T) -> Result<(), SendError<T>> {
  // Ownership of the item travels through an Option across loop iterations.
  let mut item_slot = Some(item);

  loop {
    let item_to_send = item_slot
      .take()
      .expect("item must be present at the top of the send loop");

    // --- Phase 1: Attempt a non-blocking deposit ---
    match shared.try_send_core(item_to_send) {
      Ok(()) => return Ok(()),
      Err(TrySendError::Closed(returned)) => return Err(SendError(returned)),
      Err(TrySendError::Full(returned)) => {
        item_slot = Some(returned);
      }
    }

    // --- Phase 2: Lock, re-check, and commit to parking ---
    let woken = Arc::new(AtomicBool::new(false));
    {
      let mut state = shared.state.lock();

      // Closure and acceptance are re-checked under the lock so a wake-up
      // between Phase 1 and the park cannot be lost.
      if state.closed {
        return Err(SendError(item_slot.take().expect("item still owned")));
      }
      if shared.can_accept(&state) {
        continue;
      }

      state.park_sync_sender(SyncWaiter::new(thread::current(), woken.clone()));
    }

    // --- Phase 3: Wait ---
    telemetry::increment_counter(LOC_SEND, CTR_PARKS);
    backoff::adaptive_wait(|| woken.load(Ordering::Acquire));
  }
}

/// The blocking receive operation.
///
/// Returns `Some(value)` on delivery and `None` only once the channel is
/// closed and drained. On a rendezvous channel the receiver announces itself
/// (bumping `waiting_receivers`) before parking, so a blocked sender may
/// deposit; the announcement is retracted on every exit path.
pub(crate) fn recv_sync<T: Send>(shared: &Shared<T>) -> Option<T> {
  let rendezvous = shared.capacity == 0;
  let mut announced = false;

  loop {
    let woken = Arc::new(AtomicBool::new(false));
    {
      let mut state = shared.state.lock();

      if let Some(item) = state.queue.pop_front() {
        if announced {
          state.waiting_receivers -= 1;
        }
        state.wake_senders();
        return Some(item);
      }
      if state.closed {
        if announced {
          state.waiting_receivers -= 1;
        }
        return None;
      }

      if rendezvous && !announced {
        state.waiting_receivers += 1;
        announced = true;
        // A sender may already be parked waiting for a receiver to appear.
        state.wake_senders();
      }

      state.park_sync_receiver(SyncWaiter::new(thread::current(), woken.clone()));
    }

    // --- Wait ---
    telemetry::increment_counter(LOC_RECV, CTR_PARKS);
    backoff::adaptive_wait(|| woken.load(Ordering::Acquire));
  }
}
